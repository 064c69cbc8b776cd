//! The static board: tile grid, laser emitters, checkpoints, and docks.
//!
//! Boards are loaded once (from JSON or built in code) and are immutable for
//! the rest of a game. Lookups outside the grid return `None` rather than
//! failing.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::geometry::{Direction, Pos};
use super::tile::Tile;

/// Errors that can occur while loading or validating a board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("failed to read board file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed board json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("{what} at {pos} is outside the board")]
    OutOfBounds { what: &'static str, pos: Pos },

    #[error("tile at {0} is defined twice")]
    DuplicateTile(Pos),

    #[error("two checkpoints share {0}")]
    DuplicateCheckpoint(Pos),

    #[error("two docks share {0}")]
    DuplicateDock(Pos),

    #[error("checkpoints must be numbered 1..=n in order, found {found} at position {index}")]
    CheckpointOrder { index: usize, found: u8 },

    #[error("board has no checkpoints")]
    NoCheckpoints,

    #[error("board has no starting docks")]
    NoDocks,

    #[error("unknown course '{0}'")]
    UnknownCourse(String),
}

/// Largest grid a board file may declare.
pub const MAX_BOARD_CELLS: usize = 1 << 20;

fn default_strength() -> u8 {
    1
}

/// A fixed wall-mounted laser. The beam starts on the emitter's own tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserEmitter {
    #[serde(flatten)]
    pub pos: Pos,
    pub direction: Direction,
    /// Damage dealt per hit.
    #[serde(default = "default_strength")]
    pub strength: u8,
}

/// A numbered checkpoint that robots must touch in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub number: u8,
    #[serde(flatten)]
    pub pos: Pos,
}

/// A tile placed at a coordinate in a board file.
#[derive(Debug, Clone, Deserialize)]
struct PlacedTile {
    x: i32,
    y: i32,
    #[serde(flatten)]
    tile: Tile,
}

/// On-disk board representation. Tiles are sparse: omitted cells are empty.
#[derive(Debug, Clone, Deserialize)]
struct BoardFile {
    name: String,
    width: i32,
    height: i32,
    #[serde(default)]
    tiles: Vec<PlacedTile>,
    #[serde(default)]
    lasers: Vec<LaserEmitter>,
    #[serde(default)]
    checkpoints: Vec<Checkpoint>,
    #[serde(default)]
    docks: Vec<Pos>,
}

/// The complete static board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// Row-major tile grid.
    tiles: Vec<Tile>,
    pub lasers: Vec<LaserEmitter>,
    /// Checkpoints sorted by number.
    pub checkpoints: Vec<Checkpoint>,
    /// Starting positions, assigned to robots in join order.
    pub docks: Vec<Pos>,
}

impl Board {
    /// Creates an all-empty board with no elements. Dimensions past
    /// `MAX_BOARD_CELLS` get no tile storage, so every lookup is `None`.
    pub fn new(name: &str, width: i32, height: i32) -> Self {
        let cells = cell_count(width, height)
            .filter(|&n| n <= MAX_BOARD_CELLS)
            .unwrap_or(0);
        Board {
            name: name.to_string(),
            width,
            height,
            tiles: vec![Tile::default(); cells],
            lasers: Vec::new(),
            checkpoints: Vec::new(),
            docks: Vec::new(),
        }
    }

    /// Parses and validates a board from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let file: BoardFile = serde_json::from_str(json)?;
        let cells = cell_count(file.width, file.height).unwrap_or(0);
        if file.width <= 0 || file.height <= 0 || cells > MAX_BOARD_CELLS {
            return Err(BoardError::InvalidDimensions {
                width: file.width,
                height: file.height,
            });
        }

        let mut board = Board::new(&file.name, file.width, file.height);
        let mut seen = vec![false; board.tiles.len()];
        for placed in file.tiles {
            let pos = Pos::new(placed.x, placed.y);
            let idx = board
                .index(pos)
                .ok_or(BoardError::OutOfBounds { what: "tile", pos })?;
            if seen[idx] {
                return Err(BoardError::DuplicateTile(pos));
            }
            seen[idx] = true;
            board.tiles[idx] = placed.tile;
        }
        board.lasers = file.lasers;
        board.checkpoints = file.checkpoints;
        board.docks = file.docks;
        board.validate()?;
        Ok(board)
    }

    /// Reads a board from a JSON file.
    pub fn load(path: &Path) -> Result<Self, BoardError> {
        let json = std::fs::read_to_string(path)?;
        Board::from_json(&json)
    }

    /// Checks element placement and checkpoint numbering.
    pub fn validate(&self) -> Result<(), BoardError> {
        for laser in &self.lasers {
            if !self.in_bounds(laser.pos) {
                return Err(BoardError::OutOfBounds {
                    what: "laser",
                    pos: laser.pos,
                });
            }
        }
        if self.checkpoints.is_empty() {
            return Err(BoardError::NoCheckpoints);
        }
        for (i, cp) in self.checkpoints.iter().enumerate() {
            if cp.number as usize != i + 1 {
                return Err(BoardError::CheckpointOrder {
                    index: i,
                    found: cp.number,
                });
            }
            if !self.in_bounds(cp.pos) {
                return Err(BoardError::OutOfBounds {
                    what: "checkpoint",
                    pos: cp.pos,
                });
            }
        }
        let mut taken = HashSet::new();
        for cp in &self.checkpoints {
            if !taken.insert(cp.pos) {
                return Err(BoardError::DuplicateCheckpoint(cp.pos));
            }
        }
        if self.docks.is_empty() {
            return Err(BoardError::NoDocks);
        }
        taken.clear();
        for &dock in &self.docks {
            if !self.in_bounds(dock) {
                return Err(BoardError::OutOfBounds {
                    what: "dock",
                    pos: dock,
                });
            }
            if !taken.insert(dock) {
                return Err(BoardError::DuplicateDock(dock));
            }
        }
        Ok(())
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = pos.y as usize * self.width as usize + pos.x as usize;
        (idx < self.tiles.len()).then_some(idx)
    }

    /// Returns true if `pos` lies on the grid.
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Returns the tile at `pos`, or `None` off the board.
    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    /// Returns a mutable tile reference for board construction.
    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// Replaces the tile at `pos`, keeping its walls. Returns false off the board.
    pub fn place(&mut self, pos: Pos, tile: Tile) -> bool {
        match self.tile_mut(pos) {
            Some(slot) => {
                let mut walls = slot.walls;
                for side in Vec::<Direction>::from(tile.walls) {
                    walls.insert(side);
                }
                *slot = Tile { walls, ..tile };
                true
            }
            None => false,
        }
    }

    /// Adds a wall on the `side` edge of the tile at `pos`. Returns false off the board.
    pub fn add_wall(&mut self, pos: Pos, side: Direction) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.walls.insert(side);
                true
            }
            None => false,
        }
    }

    pub fn add_laser(&mut self, pos: Pos, direction: Direction, strength: u8) {
        self.lasers.push(LaserEmitter {
            pos,
            direction,
            strength,
        });
    }

    /// Appends the next checkpoint; numbers are assigned 1, 2, 3... in call order.
    pub fn add_checkpoint(&mut self, pos: Pos) -> u8 {
        let number = self.checkpoints.len() as u8 + 1;
        self.checkpoints.push(Checkpoint { number, pos });
        number
    }

    pub fn add_dock(&mut self, pos: Pos) {
        self.docks.push(pos);
    }

    /// Returns the checkpoint number at `pos`, if any.
    pub fn checkpoint_at(&self, pos: Pos) -> Option<u8> {
        self.checkpoints
            .iter()
            .find(|cp| cp.pos == pos)
            .map(|cp| cp.number)
    }

    /// Total number of checkpoints on the course.
    pub fn checkpoint_count(&self) -> u8 {
        self.checkpoints.len() as u8
    }
}

/// Grid area, or `None` for negative sizes or overflow.
fn cell_count(width: i32, height: i32) -> Option<usize> {
    let width = usize::try_from(width).ok()?;
    let height = usize::try_from(height).ok()?;
    width.checked_mul(height)
}
