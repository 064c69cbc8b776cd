//! Pushers, gears and pits.

use crate::board::{Board, Direction, Pos, Robot, TileKind};
use crate::event::{DestroyCause, GameEvent, MoveCause};

use super::lifecycle::destroy;
use super::movement::step_robot;

/// Fires every pusher active on `register` (0-based). Pushers push one cell
/// with normal push-chain rules.
pub fn run_pushers(board: &Board, robots: &mut [Robot], register: usize, events: &mut Vec<GameEvent>) {
    let number = register as u8 + 1;
    let mut armed: Vec<(usize, Pos, Direction)> = Vec::new();
    for (idx, robot) in robots.iter().enumerate() {
        let Some(pos) = robot.pos else { continue };
        let Some(tile) = board.tile(pos) else { continue };
        if !tile.pusher_active(number) {
            continue;
        }
        match tile.exit {
            Some(dir) => armed.push((idx, pos, dir)),
            None => tracing::warn!(%pos, "pusher without a push direction"),
        }
    }
    for (idx, pos, dir) in armed {
        // An earlier pusher may already have shoved this robot off its tile.
        if robots[idx].pos != Some(pos) {
            continue;
        }
        step_robot(board, robots, idx, dir, MoveCause::Pusher, events);
    }
}

/// Rotates every robot standing on a gear.
pub fn run_gears(board: &Board, robots: &mut [Robot], events: &mut Vec<GameEvent>) {
    for robot in robots.iter_mut() {
        let Some(pos) = robot.pos else { continue };
        let turned = match board.tile(pos).map(|t| t.kind) {
            Some(TileKind::GearCw) => robot.facing.clockwise(),
            Some(TileKind::GearCcw) => robot.facing.counter_clockwise(),
            _ => continue,
        };
        robot.facing = turned;
        events.push(GameEvent::RobotRotated {
            robot: robot.id,
            facing: turned,
            cause: MoveCause::Gear,
        });
    }
}

/// Destroys every robot left standing on a pit.
pub fn run_pits(board: &Board, robots: &mut [Robot], events: &mut Vec<GameEvent>) {
    for robot in robots.iter_mut() {
        let Some(pos) = robot.pos else { continue };
        if board.tile(pos).is_some_and(|t| t.kind == TileKind::Pit) {
            destroy(robot, DestroyCause::Pit, events);
        }
    }
}
