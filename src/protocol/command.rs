//! JSON-lines command parser.
//!
//! Each input line is one JSON object tagged by `cmd`, for example
//! `{"cmd":"program","robot":0,"cards":[490,80,null,null,null]}`.

use serde::Deserialize;

use crate::board::{Direction, RobotId, REGISTER_COUNT};
use crate::error::GameError;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Seat a robot on the next free dock.
    Join { name: String },

    /// Leave the waiting room and deal the first turn.
    Start,

    /// Submit a program: one card priority (or null) per register.
    Program {
        robot: RobotId,
        cards: [Option<u16>; REGISTER_COUNT],
    },

    /// Discard the option at `option` to cancel 1 pending damage.
    Discard { robot: RobotId, option: usize },

    /// Accept the remaining pending damage.
    KeepDamage { robot: RobotId },

    /// Choose respawn facing and whether to power down next turn.
    Respawn {
        robot: RobotId,
        facing: Direction,
        #[serde(default)]
        power_down: bool,
    },

    /// Announce a power-down for the next turn.
    PowerDown { robot: RobotId },

    /// Withdraw a power-down announcement.
    CancelPowerDown { robot: RobotId },

    /// Answer whether a powered-down robot stays down this turn.
    StayDown { robot: RobotId, stay: bool },

    /// Request a snapshot of the game.
    State,

    /// Advance the driver's clock. Only meaningful to drivers with a virtual clock.
    Advance { ms: u64 },

    /// End the session.
    Quit,
}

/// Errors from parsing or applying a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("malformed command: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("'{0}' is handled by the driver")]
    DriverOnly(&'static str),
}

/// Parses a single line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}
