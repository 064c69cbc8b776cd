//! Client protocol.
//!
//! Commands arrive as JSON lines, are applied to a `Game` by `dispatch`, and
//! answered with a `Reply`. Events are written separately by the driver.

pub mod command;
pub mod snapshot;

pub use command::{parse_command, Command, CommandError};
pub use snapshot::{GameSnapshot, RobotView};

use serde::Serialize;

use crate::board::RobotId;
use crate::engine::Game;

/// Direct answer to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Ok,
    Joined { robot: RobotId },
    State(GameSnapshot),
    Error { message: String },
}

impl Reply {
    pub fn error(err: &CommandError) -> Self {
        Reply::Error {
            message: err.to_string(),
        }
    }
}

/// Applies one command to the game at time `now_ms`.
pub fn dispatch(game: &mut Game, command: Command, now_ms: u64) -> Result<Reply, CommandError> {
    match command {
        Command::Join { name } => {
            let robot = game.add_robot(&name)?;
            return Ok(Reply::Joined { robot });
        }
        Command::Start => game.start(now_ms)?,
        Command::Program { robot, cards } => game.submit_program(robot, cards, now_ms)?,
        Command::Discard { robot, option } => game.discard_option(robot, option, now_ms)?,
        Command::KeepDamage { robot } => game.finish_damage_choice(robot, now_ms)?,
        Command::Respawn {
            robot,
            facing,
            power_down,
        } => game.choose_respawn(robot, facing, power_down, now_ms)?,
        Command::PowerDown { robot } => game.announce_power_down(robot)?,
        Command::CancelPowerDown { robot } => game.cancel_power_down(robot)?,
        Command::StayDown { robot, stay } => game.decide_power_down(robot, stay, now_ms)?,
        Command::State => return Ok(Reply::State(GameSnapshot::of(game))),
        Command::Advance { .. } => return Err(CommandError::DriverOnly("advance")),
        Command::Quit => return Err(CommandError::DriverOnly("quit")),
    }
    Ok(Reply::Ok)
}
