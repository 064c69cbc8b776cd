//! Capability (option) cards.
//!
//! Each card is a tagged variant. Resolvers never match on the full variant
//! list; they ask a card for the one narrow behaviour they care about
//! (`laser_modifier`, `damage_blocker`, ...) and ignore cards that answer
//! `None`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Direction;

/// Lifetime damage budget of the absorbing coat.
pub const ABLATIVE_BUDGET: u8 = 3;

/// The capability a card grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    DoubleBarreledLaser,
    RearFiringLaser,
    HighPowerLaser,
    RammingGear,
    Shield,
    PowerDownShield,
    AblativeCoat,
    SuperiorArchive,
    MechanicalArm,
    ExtraMemory,
}

/// All capability kinds; the option deck holds one of each.
pub const ALL_OPTIONS: [OptionKind; 10] = [
    OptionKind::DoubleBarreledLaser,
    OptionKind::RearFiringLaser,
    OptionKind::HighPowerLaser,
    OptionKind::RammingGear,
    OptionKind::Shield,
    OptionKind::PowerDownShield,
    OptionKind::AblativeCoat,
    OptionKind::SuperiorArchive,
    OptionKind::MechanicalArm,
    OptionKind::ExtraMemory,
];

/// How a card changes the robot's own laser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserModifier {
    /// Fire a second shot along the same path.
    ExtraShot,
    /// Fire an independent single shot backwards.
    RearShot,
    /// The beam passes through one wall or robot.
    PassThrough,
}

/// How a card reduces incoming damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageBlocker {
    /// Blocks the first robot-laser hit from the front each register.
    FrontShield,
    /// While powered down, blocks 1 damage per compass direction each register.
    PowerDownShield,
    /// Soaks damage until a lifetime budget is spent.
    Absorb { budget: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementModifier {
    /// Robots pushed by the holder's card movement take 1 damage.
    Ramming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnModifier {
    /// Re-enter play with 0 damage instead of 2.
    NoDamagePenalty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachModifier {
    /// Checkpoints and repair sites count when one king move away.
    AdjacentTiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandModifier {
    ExtraCard,
}

impl OptionKind {
    pub const fn laser_modifier(self) -> Option<LaserModifier> {
        match self {
            OptionKind::DoubleBarreledLaser => Some(LaserModifier::ExtraShot),
            OptionKind::RearFiringLaser => Some(LaserModifier::RearShot),
            OptionKind::HighPowerLaser => Some(LaserModifier::PassThrough),
            _ => None,
        }
    }

    pub const fn damage_blocker(self) -> Option<DamageBlocker> {
        match self {
            OptionKind::Shield => Some(DamageBlocker::FrontShield),
            OptionKind::PowerDownShield => Some(DamageBlocker::PowerDownShield),
            OptionKind::AblativeCoat => Some(DamageBlocker::Absorb {
                budget: ABLATIVE_BUDGET,
            }),
            _ => None,
        }
    }

    pub const fn movement_modifier(self) -> Option<MovementModifier> {
        match self {
            OptionKind::RammingGear => Some(MovementModifier::Ramming),
            _ => None,
        }
    }

    pub const fn respawn_modifier(self) -> Option<RespawnModifier> {
        match self {
            OptionKind::SuperiorArchive => Some(RespawnModifier::NoDamagePenalty),
            _ => None,
        }
    }

    pub const fn reach_modifier(self) -> Option<ReachModifier> {
        match self {
            OptionKind::MechanicalArm => Some(ReachModifier::AdjacentTiles),
            _ => None,
        }
    }

    pub const fn hand_modifier(self) -> Option<HandModifier> {
        match self {
            OptionKind::ExtraMemory => Some(HandModifier::ExtraCard),
            _ => None,
        }
    }

    /// Whether the card may be thrown away to cancel 1 damage. The absorbing
    /// coat manages its own budget and is never offered.
    pub const fn is_discardable(self) -> bool {
        !matches!(self, OptionKind::AblativeCoat)
    }
}

/// A held capability card with its transient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCard {
    pub kind: OptionKind,
    /// Set once a once-per-register blocker has fired.
    #[serde(skip)]
    pub used_this_register: bool,
    /// Compass sides (bit per `Direction::index`) already blocked this register.
    #[serde(skip)]
    pub blocked_sides: u8,
    /// Damage absorbed over the card's lifetime.
    pub absorbed: u8,
}

impl OptionCard {
    pub const fn new(kind: OptionKind) -> Self {
        OptionCard {
            kind,
            used_this_register: false,
            blocked_sides: 0,
            absorbed: 0,
        }
    }

    /// Clears per-register usage flags.
    pub fn reset_register(&mut self) {
        self.used_this_register = false;
        self.blocked_sides = 0;
    }

    pub const fn side_blocked(&self, side: Direction) -> bool {
        self.blocked_sides & (1 << side as u8) != 0
    }

    pub fn mark_side(&mut self, side: Direction) {
        self.blocked_sides |= 1 << side.index();
    }
}

/// Returns a freshly shuffled option deck holding one card of each kind.
pub fn option_deck<R: Rng>(rng: &mut R) -> Vec<OptionKind> {
    let mut deck = ALL_OPTIONS.to_vec();
    deck.shuffle(rng);
    deck
}
