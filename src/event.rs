//! Events produced by the engine for external delivery.
//!
//! The engine appends events to its outbox as it resolves each step; the room
//! driver drains and broadcasts them. Every event serializes to a flat JSON
//! object tagged by `event`.

use serde::Serialize;

use crate::board::{Direction, OptionKind, Pos, PowerState, ProgramCard, RobotId};
use crate::engine::Phase;

/// Why a robot moved or turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCause {
    Card,
    Push,
    Conveyor,
    Pusher,
    Gear,
}

/// Why a robot was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyCause {
    FellOffBoard,
    Pit,
    Damage,
}

/// Where a laser beam came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaserSource {
    /// A fixed emitter, by index into the board's laser list.
    Board { index: usize },
    Robot { robot: RobotId, rear: bool },
}

/// Final placing of one robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub robot: RobotId,
    pub name: String,
    pub checkpoints: u8,
    pub lives: u8,
    pub damage: u8,
    pub eliminated: bool,
}

/// A single observable step of the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged {
        phase: Phase,
    },
    TurnStarted {
        turn: u32,
    },
    CardsDealt {
        robot: RobotId,
        cards: Vec<ProgramCard>,
    },
    ProgramSubmitted {
        robot: RobotId,
        auto: bool,
    },
    CardExecuted {
        robot: RobotId,
        register: usize,
        card: ProgramCard,
    },
    RobotMoved {
        robot: RobotId,
        from: Pos,
        to: Pos,
        cause: MoveCause,
    },
    RobotRotated {
        robot: RobotId,
        facing: Direction,
        cause: MoveCause,
    },
    LaserFired {
        source: LaserSource,
        path: Vec<Pos>,
        hits: Vec<RobotId>,
    },
    DamageChoiceRequested {
        robot: RobotId,
        amount: u8,
        deadline_ms: u64,
    },
    OptionDiscarded {
        robot: RobotId,
        kind: OptionKind,
    },
    DamageApplied {
        robot: RobotId,
        requested: u8,
        prevented: u8,
        damage: u8,
    },
    RobotDestroyed {
        robot: RobotId,
        cause: DestroyCause,
        lives: u8,
    },
    RobotEliminated {
        robot: RobotId,
    },
    CheckpointReached {
        robot: RobotId,
        number: u8,
    },
    ArchiveUpdated {
        robot: RobotId,
        pos: Pos,
    },
    Repaired {
        robot: RobotId,
        damage: u8,
    },
    OptionDrawn {
        robot: RobotId,
        kind: OptionKind,
    },
    PowerChanged {
        robot: RobotId,
        power: PowerState,
    },
    PowerDownDecisionRequested {
        robot: RobotId,
        deadline_ms: u64,
    },
    RespawnRequested {
        robot: RobotId,
        deadline_ms: u64,
    },
    RobotRespawned {
        robot: RobotId,
        pos: Pos,
        facing: Direction,
    },
    TimerStarted {
        duration_ms: u64,
    },
    TimerTick {
        remaining_secs: u64,
    },
    TimerExpired,
    GameOver {
        winner: Option<RobotId>,
        standings: Vec<Standing>,
    },
}
