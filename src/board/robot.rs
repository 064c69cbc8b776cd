//! Robot state.
//!
//! A robot is either on the board (`pos` is `Some`), destroyed and waiting to
//! respawn (`dead`), or permanently out of the game (`eliminated`).

use serde::{Deserialize, Serialize};

use super::card::ProgramCard;
use super::geometry::{Direction, Pos};
use super::option::{
    HandModifier, LaserModifier, MovementModifier, OptionCard, OptionKind, ReachModifier,
    RespawnModifier,
};

/// Damage at which a robot is destroyed.
pub const MAX_DAMAGE: u8 = 10;

/// Number of program registers per robot.
pub const REGISTER_COUNT: usize = 5;

/// Cards dealt to an undamaged robot.
pub const BASE_HAND_SIZE: usize = 9;

/// Damage above which registers start locking.
pub const LOCK_THRESHOLD: u8 = 4;

/// Damage a robot re-enters play with after destruction.
pub const RESPAWN_DAMAGE: u8 = 2;

/// Index of a robot within its game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RobotId(pub usize);

impl std::fmt::Display for RobotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "robot#{}", self.0)
    }
}

/// Power-down lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    On,
    /// Will power down at the next deal.
    Announcing,
    Off,
}

/// A robot and everything its player owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
    pub id: RobotId,
    pub name: String,
    pub pos: Option<Pos>,
    pub facing: Direction,
    pub damage: u8,
    pub lives: u8,
    /// Respawn point.
    pub archive: Pos,
    /// Highest checkpoint touched so far.
    pub checkpoint: u8,
    pub power: PowerState,
    pub hand: Vec<ProgramCard>,
    pub registers: [Option<ProgramCard>; REGISTER_COUNT],
    pub options: Vec<OptionCard>,
    pub submitted: bool,
    /// Destroyed this turn and off the board until the respawn phase.
    pub dead: bool,
    pub eliminated: bool,
}

impl Robot {
    /// Creates a robot standing on its dock, facing up.
    pub fn new(id: RobotId, name: &str, dock: Pos, lives: u8) -> Self {
        Robot {
            id,
            name: name.to_string(),
            pos: Some(dock),
            facing: Direction::Up,
            damage: 0,
            lives,
            archive: dock,
            checkpoint: 0,
            power: PowerState::On,
            hand: Vec::new(),
            registers: [None; REGISTER_COUNT],
            options: Vec::new(),
            submitted: false,
            dead: false,
            eliminated: false,
        }
    }

    /// On the board and still in the game.
    pub fn is_alive(&self) -> bool {
        !self.dead && !self.eliminated && self.pos.is_some()
    }

    /// Alive and not powered down: takes part in programming.
    pub fn is_active(&self) -> bool {
        self.is_alive() && self.power != PowerState::Off
    }

    /// Number of registers locked by damage: `max(0, damage - 4)`, capped at 5.
    pub fn locked_registers(&self) -> usize {
        (self.damage.saturating_sub(LOCK_THRESHOLD) as usize).min(REGISTER_COUNT)
    }

    /// Index of the first locked register. Locks fill from the last register backwards.
    pub fn first_locked_register(&self) -> usize {
        REGISTER_COUNT - self.locked_registers()
    }

    pub fn is_register_locked(&self, register: usize) -> bool {
        register >= self.first_locked_register()
    }

    /// Number of program cards to deal this turn.
    pub fn hand_size(&self) -> usize {
        let base = BASE_HAND_SIZE.saturating_sub(self.damage as usize);
        if self.has_hand_modifier(HandModifier::ExtraCard) {
            base + 1
        } else {
            base
        }
    }

    pub fn has_option(&self, kind: OptionKind) -> bool {
        self.options.iter().any(|o| o.kind == kind)
    }

    pub fn has_laser_modifier(&self, modifier: LaserModifier) -> bool {
        self.options
            .iter()
            .any(|o| o.kind.laser_modifier() == Some(modifier))
    }

    pub fn has_movement_modifier(&self, modifier: MovementModifier) -> bool {
        self.options
            .iter()
            .any(|o| o.kind.movement_modifier() == Some(modifier))
    }

    pub fn has_respawn_modifier(&self, modifier: RespawnModifier) -> bool {
        self.options
            .iter()
            .any(|o| o.kind.respawn_modifier() == Some(modifier))
    }

    pub fn has_reach_modifier(&self, modifier: ReachModifier) -> bool {
        self.options
            .iter()
            .any(|o| o.kind.reach_modifier() == Some(modifier))
    }

    pub fn has_hand_modifier(&self, modifier: HandModifier) -> bool {
        self.options
            .iter()
            .any(|o| o.kind.hand_modifier() == Some(modifier))
    }

    /// Number of held cards that may be discarded to prevent damage.
    pub fn discardable_options(&self) -> usize {
        self.options
            .iter()
            .filter(|o| o.kind.is_discardable())
            .count()
    }

    /// Priorities of cards held in locked registers.
    pub fn locked_cards(&self) -> Vec<u16> {
        let first = self.first_locked_register();
        self.registers[first..]
            .iter()
            .flatten()
            .map(|c| c.priority)
            .collect()
    }

    /// Empties every unlocked register.
    pub fn clear_unlocked_registers(&mut self) {
        let first = self.first_locked_register();
        for slot in self.registers[..first].iter_mut() {
            *slot = None;
        }
    }

    /// Empties every register and the hand.
    pub fn clear_program(&mut self) {
        self.registers = [None; REGISTER_COUNT];
        self.hand.clear();
    }
}
