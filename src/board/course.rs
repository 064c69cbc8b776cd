//! Course sources: where immutable boards come from.
//!
//! The engine never authors board data. It asks a `CourseSource` for a board by
//! id. Two sources are provided: a directory of JSON files and the built-in
//! practice course used by the CLI, self-play, and benches.

use std::path::PathBuf;

use super::geometry::{Direction, Pos, Rotation};
use super::layout::{Board, BoardError};
use super::tile::{Tile, TileKind};

/// Supplies immutable boards by course id.
pub trait CourseSource {
    fn load_course(&self, id: &str) -> Result<Board, BoardError>;
}

/// Loads `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonCourseDir {
    root: PathBuf,
}

impl JsonCourseDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonCourseDir { root: root.into() }
    }
}

impl CourseSource for JsonCourseDir {
    fn load_course(&self, id: &str) -> Result<Board, BoardError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BoardError::UnknownCourse(id.to_string()));
        }
        let path = self.root.join(format!("{}.json", id));
        if !path.is_file() {
            return Err(BoardError::UnknownCourse(id.to_string()));
        }
        Board::load(&path)
    }
}

/// Courses compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCourses;

impl CourseSource for BuiltinCourses {
    fn load_course(&self, id: &str) -> Result<Board, BoardError> {
        match id {
            PRACTICE_COURSE => Ok(practice_course()),
            other => Err(BoardError::UnknownCourse(other.to_string())),
        }
    }
}

/// Id of the built-in practice course.
pub const PRACTICE_COURSE: &str = "practice";

/// A 12x12 course exercising every board element, with eight docks along the
/// bottom row and three checkpoints.
pub fn practice_course() -> Board {
    let mut board = Board::new(PRACTICE_COURSE, 12, 12);

    // Express belt along row 3 turning down at column 9.
    for x in 2..9 {
        board.place(Pos::new(x, 3), Tile::conveyor(Direction::Right, true));
    }
    board.place(
        Pos::new(9, 3),
        Tile::conveyor(Direction::Down, true).with_rotation(Rotation::Clockwise),
    );
    for y in 4..6 {
        board.place(Pos::new(9, y), Tile::conveyor(Direction::Down, true));
    }

    // Normal belt running up column 2.
    for y in 5..10 {
        board.place(Pos::new(2, y), Tile::conveyor(Direction::Up, false));
    }

    board.place(Pos::new(6, 6), Tile::new(TileKind::GearCw));
    board.place(Pos::new(4, 8), Tile::new(TileKind::GearCcw));
    board.place(Pos::new(7, 7), Tile::new(TileKind::Pit));
    board.place(Pos::new(3, 1), Tile::new(TileKind::Pit));
    board.place(Pos::new(10, 8), Tile::pusher(Direction::Left, &[1, 3, 5]));
    board.place(Pos::new(0, 6), Tile::pusher(Direction::Right, &[2, 4]));
    board.place(Pos::new(1, 1), Tile::new(TileKind::Repair));
    board.place(Pos::new(10, 10), Tile::new(TileKind::Repair));
    board.place(Pos::new(6, 9), Tile::new(TileKind::Option));

    board.add_wall(Pos::new(4, 5), Direction::Right);
    board.add_wall(Pos::new(8, 9), Direction::Up);
    board.add_wall(Pos::new(5, 1), Direction::Down);
    board.add_wall(Pos::new(11, 5), Direction::Right);
    board.add_wall(Pos::new(5, 0), Direction::Up);

    board.add_laser(Pos::new(11, 5), Direction::Left, 1);
    board.add_laser(Pos::new(5, 0), Direction::Down, 1);

    board.add_checkpoint(Pos::new(8, 2));
    board.add_checkpoint(Pos::new(2, 1));
    board.add_checkpoint(Pos::new(10, 6));

    for x in 2..10 {
        board.add_dock(Pos::new(x, 11));
    }
    board
}
