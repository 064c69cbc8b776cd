//! Grid coordinates, compass directions, and rotations.
//!
//! The board uses screen coordinates: `x` grows to the right and `y` grows
//! downward, so moving `Up` decrements `y`.

use serde::{Deserialize, Serialize};

/// A compass direction. The discriminant doubles as the facing index (0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

/// All directions in facing-index order.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

impl Direction {
    /// Converts a facing index (taken modulo 4) into a direction.
    pub const fn from_index(index: u8) -> Direction {
        match index % 4 {
            0 => Direction::Up,
            1 => Direction::Right,
            2 => Direction::Down,
            _ => Direction::Left,
        }
    }

    /// Returns the facing index (0-3).
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the direction rotated 90 degrees clockwise.
    pub const fn clockwise(self) -> Direction {
        Direction::from_index(self as u8 + 1)
    }

    /// Returns the direction rotated 90 degrees counter-clockwise.
    pub const fn counter_clockwise(self) -> Direction {
        Direction::from_index(self as u8 + 3)
    }

    /// Returns the opposite direction.
    pub const fn opposite(self) -> Direction {
        Direction::from_index(self as u8 + 2)
    }

    /// Applies a rotation to this direction.
    pub const fn rotated(self, rotation: Rotation) -> Direction {
        match rotation {
            Rotation::Clockwise => self.clockwise(),
            Rotation::CounterClockwise => self.counter_clockwise(),
        }
    }

    /// Returns the `(dx, dy)` unit offset for one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// A quarter-turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[serde(rename = "cw")]
    Clockwise,
    #[serde(rename = "ccw")]
    CounterClockwise,
}

/// A cell coordinate. Signed so that off-board neighbours are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// Returns the neighbouring cell one step in `dir`.
    pub const fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.offset();
        Pos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns the cell offset by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chebyshev distance: the number of king moves between two cells.
    pub fn chebyshev(self, other: Pos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
