//! Serializable views of a running game.

use serde::Serialize;

use crate::board::{
    Direction, OptionKind, Pos, PowerState, ProgramCard, Robot, RobotId, REGISTER_COUNT,
};
use crate::engine::{Game, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotView {
    pub id: RobotId,
    pub name: String,
    pub pos: Option<Pos>,
    pub facing: Direction,
    pub damage: u8,
    pub lives: u8,
    pub checkpoint: u8,
    pub archive: Pos,
    pub power: PowerState,
    pub hand: Vec<ProgramCard>,
    pub registers: [Option<ProgramCard>; REGISTER_COUNT],
    pub locked: usize,
    pub options: Vec<OptionKind>,
    pub submitted: bool,
    pub dead: bool,
    pub eliminated: bool,
}

impl From<&Robot> for RobotView {
    fn from(robot: &Robot) -> Self {
        RobotView {
            id: robot.id,
            name: robot.name.clone(),
            pos: robot.pos,
            facing: robot.facing,
            damage: robot.damage,
            lives: robot.lives,
            checkpoint: robot.checkpoint,
            archive: robot.archive,
            power: robot.power,
            hand: robot.hand.clone(),
            registers: robot.registers,
            locked: robot.locked_registers(),
            options: robot.options.iter().map(|o| o.kind).collect(),
            submitted: robot.submitted,
            dead: robot.dead,
            eliminated: robot.eliminated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub board: String,
    pub turn: u32,
    pub phase: Phase,
    pub robots: Vec<RobotView>,
    /// Robots the game is waiting on for a decision.
    pub pending: Vec<RobotId>,
    pub timer_deadline_ms: Option<u64>,
    pub winner: Option<RobotId>,
}

impl GameSnapshot {
    pub fn of(game: &Game) -> Self {
        let pending = match game.awaiting() {
            Some(awaiting) => game
                .robots()
                .iter()
                .map(|r| r.id)
                .filter(|id| awaiting.is_pending(*id))
                .collect(),
            None => Vec::new(),
        };
        GameSnapshot {
            board: game.board().name.clone(),
            turn: game.turn(),
            phase: game.phase(),
            robots: game.robots().iter().map(RobotView::from).collect(),
            pending,
            timer_deadline_ms: game.timer_deadline_ms(),
            winner: game.winner(),
        }
    }
}
