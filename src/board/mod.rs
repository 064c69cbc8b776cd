//! Board representation and game-piece types.
//!
//! Contains the static board (tiles, walls, lasers, checkpoints, docks), the
//! program and capability cards, and per-robot state.

pub mod card;
pub mod course;
pub mod geometry;
pub mod layout;
pub mod option;
pub mod robot;
pub mod tile;
pub mod walls;

pub use card::{standard_deck, CardAction, Deck, ProgramCard, DECK_SIZE};
pub use course::{practice_course, BuiltinCourses, CourseSource, JsonCourseDir, PRACTICE_COURSE};
pub use geometry::{Direction, Pos, Rotation, ALL_DIRECTIONS};
pub use layout::{Board, BoardError, Checkpoint, LaserEmitter};
pub use option::{
    option_deck, DamageBlocker, HandModifier, LaserModifier, MovementModifier, OptionCard,
    OptionKind, ReachModifier, RespawnModifier, ABLATIVE_BUDGET, ALL_OPTIONS,
};
pub use robot::{
    PowerState, Robot, RobotId, BASE_HAND_SIZE, MAX_DAMAGE, REGISTER_COUNT, RESPAWN_DAMAGE,
};
pub use tile::{Tile, TileKind, Walls};
pub use walls::{is_off_board, reachable_adjacent, wall_between};
