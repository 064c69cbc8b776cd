//! Tile types and per-tile metadata.
//!
//! A tile carries its element type, an optional exit direction (belts and
//! pushers), an optional corner-rotation tag (belts), the registers a pusher
//! fires on, and the set of its sides blocked by walls.

use serde::{Deserialize, Serialize};

use super::geometry::{Direction, Rotation, ALL_DIRECTIONS};

/// The board element on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    #[default]
    Empty,
    Pit,
    Repair,
    Option,
    Conveyor,
    ExpressConveyor,
    GearCw,
    GearCcw,
    Pusher,
}

impl TileKind {
    /// Returns true for both normal and express belts.
    pub const fn is_conveyor(self) -> bool {
        matches!(self, TileKind::Conveyor | TileKind::ExpressConveyor)
    }

    /// Returns true for tiles that repair at end of turn.
    pub const fn is_repair_site(self) -> bool {
        matches!(self, TileKind::Repair | TileKind::Option)
    }
}

/// The set of blocked sides of a tile, stored as a 4-bit mask indexed by
/// `Direction::index()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Direction>", into = "Vec<Direction>")]
pub struct Walls(u8);

impl Walls {
    pub const NONE: Walls = Walls(0);

    /// Builds a wall set from a list of blocked sides.
    pub fn of(sides: &[Direction]) -> Self {
        let mut walls = Walls::NONE;
        for &side in sides {
            walls.insert(side);
        }
        walls
    }

    pub fn insert(&mut self, side: Direction) {
        self.0 |= 1 << side.index();
    }

    pub const fn contains(self, side: Direction) -> bool {
        self.0 & (1 << side as u8) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of blocked sides (0-4).
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl From<Vec<Direction>> for Walls {
    fn from(sides: Vec<Direction>) -> Self {
        Walls::of(&sides)
    }
}

impl From<Walls> for Vec<Direction> {
    fn from(walls: Walls) -> Self {
        ALL_DIRECTIONS
            .iter()
            .copied()
            .filter(|d| walls.contains(*d))
            .collect()
    }
}

/// A single board tile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default)]
    pub kind: TileKind,
    /// Belt exit direction, or the push direction of a pusher.
    #[serde(default)]
    pub exit: Option<Direction>,
    /// Corner-rotation tag applied to robots arriving from another belt.
    #[serde(default)]
    pub rotate: Option<Rotation>,
    /// 1-indexed registers on which a pusher fires.
    #[serde(default)]
    pub registers: Vec<u8>,
    #[serde(default)]
    pub walls: Walls,
}

impl Tile {
    /// Creates a tile of the given kind with no metadata.
    pub fn new(kind: TileKind) -> Self {
        Tile {
            kind,
            ..Tile::default()
        }
    }

    /// Creates a belt tile leading towards `exit`.
    pub fn conveyor(exit: Direction, express: bool) -> Self {
        Tile {
            kind: if express {
                TileKind::ExpressConveyor
            } else {
                TileKind::Conveyor
            },
            exit: Some(exit),
            ..Tile::default()
        }
    }

    /// Creates a pusher tile pushing towards `dir` on the given registers.
    pub fn pusher(dir: Direction, registers: &[u8]) -> Self {
        Tile {
            kind: TileKind::Pusher,
            exit: Some(dir),
            registers: registers.to_vec(),
            ..Tile::default()
        }
    }

    /// Adds a corner-rotation tag.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotate = Some(rotation);
        self
    }

    /// Returns true if this pusher fires on the given 1-indexed register.
    pub fn pusher_active(&self, register_number: u8) -> bool {
        self.kind == TileKind::Pusher && self.registers.contains(&register_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_mask() {
        let walls = Walls::of(&[Direction::Up, Direction::Left]);
        assert!(walls.contains(Direction::Up));
        assert!(walls.contains(Direction::Left));
        assert!(!walls.contains(Direction::Down));
        assert_eq!(walls.count(), 2);
        assert!(Walls::NONE.is_empty());
    }

    #[test]
    fn tile_deserializes_with_defaults() {
        let tile: Tile = serde_json::from_str(r#"{"kind":"express_conveyor","exit":"down","rotate":"cw"}"#)
            .unwrap();
        assert_eq!(tile.kind, TileKind::ExpressConveyor);
        assert_eq!(tile.exit, Some(Direction::Down));
        assert_eq!(tile.rotate, Some(Rotation::Clockwise));
        assert!(tile.walls.is_empty());

        let bare: Tile = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.kind, TileKind::Empty);
    }

    #[test]
    fn walls_serialize_as_direction_list() {
        let tile = Tile {
            walls: Walls::of(&[Direction::Right]),
            ..Tile::default()
        };
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["walls"], serde_json::json!(["right"]));
    }

    #[test]
    fn pusher_registers_are_one_indexed() {
        let tile = Tile::pusher(Direction::Left, &[1, 3, 5]);
        assert!(tile.pusher_active(1));
        assert!(!tile.pusher_active(2));
        assert!(tile.pusher_active(5));
        assert!(!Tile::new(TileKind::Empty).pusher_active(1));
    }
}
