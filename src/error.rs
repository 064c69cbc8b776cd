//! Errors returned to callers that ask the game for something it cannot do.
//!
//! A rejected command never mutates game state.

use crate::board::{PowerState, RobotId};
use crate::engine::Phase;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("not allowed during {0:?}")]
    WrongPhase(Phase),

    #[error("unknown {0}")]
    UnknownRobot(RobotId),

    #[error("{0} has been eliminated")]
    Eliminated(RobotId),

    #[error("{0} already submitted its program")]
    AlreadySubmitted(RobotId),

    #[error("{0} is destroyed or powered down and cannot program")]
    NotActive(RobotId),

    #[error("card {priority} is not in the hand of {robot}")]
    CardNotInHand { robot: RobotId, priority: u16 },

    #[error("card {0} appears in more than one register")]
    DuplicateCard(u16),

    #[error("register {register} of {robot} is locked")]
    LockedRegister { robot: RobotId, register: usize },

    #[error("{0} has no pending decision of that kind")]
    NoPendingDecision(RobotId),

    #[error("{robot} holds no option card at index {index}")]
    NoSuchOption { robot: RobotId, index: usize },

    #[error("option card at index {index} of {robot} cannot be discarded")]
    NotDiscardable { robot: RobotId, index: usize },

    #[error("cannot change power of {robot} while {from:?}")]
    InvalidPowerChange { robot: RobotId, from: PowerState },

    #[error("game is full ({0} robots)")]
    GameFull(usize),

    #[error("at least one robot is needed to start")]
    NoRobots,
}
