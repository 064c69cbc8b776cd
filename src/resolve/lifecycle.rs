//! Power-down and destroy/respawn lifecycle.
//!
//! Power: ON -> ANNOUNCING (voluntary) -> OFF (at the next deal) -> ON (when
//! the player declines to stay down). Destruction removes the robot from the
//! board until the respawn phase; the last life lost eliminates it.

use crate::board::{
    Board, Direction, Pos, PowerState, RespawnModifier, Robot, TileKind, RESPAWN_DAMAGE,
};
use crate::error::GameError;
use crate::event::{DestroyCause, GameEvent};

use super::robot_at;

/// Destroys a robot on the board.
///
/// Costs one life, resets damage to 2 (0 with a superior archive), clears the
/// program, and removes the robot until respawn. Robots already off the board
/// are left untouched, so a robot is destroyed at most once per death.
pub fn destroy(robot: &mut Robot, cause: DestroyCause, events: &mut Vec<GameEvent>) {
    if !robot.is_alive() {
        return;
    }
    robot.pos = None;
    robot.dead = true;
    robot.lives = robot.lives.saturating_sub(1);
    robot.damage = if robot.has_respawn_modifier(RespawnModifier::NoDamagePenalty) {
        0
    } else {
        RESPAWN_DAMAGE
    };
    robot.clear_program();
    tracing::info!(robot = %robot.id, ?cause, lives = robot.lives, "robot destroyed");
    events.push(GameEvent::RobotDestroyed {
        robot: robot.id,
        cause,
        lives: robot.lives,
    });
    if robot.lives == 0 {
        eliminate(robot, events);
    }
}

/// Removes a robot from the game for good.
pub fn eliminate(robot: &mut Robot, events: &mut Vec<GameEvent>) {
    robot.pos = None;
    robot.dead = false;
    robot.eliminated = true;
    robot.clear_program();
    robot.submitted = true;
    tracing::info!(robot = %robot.id, "robot eliminated");
    events.push(GameEvent::RobotEliminated { robot: robot.id });
}

/// ON -> ANNOUNCING.
pub fn announce_power_down(robot: &mut Robot, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    if robot.power != PowerState::On {
        return Err(GameError::InvalidPowerChange {
            robot: robot.id,
            from: robot.power,
        });
    }
    robot.power = PowerState::Announcing;
    events.push(GameEvent::PowerChanged {
        robot: robot.id,
        power: robot.power,
    });
    Ok(())
}

/// ANNOUNCING -> ON.
pub fn cancel_power_down(robot: &mut Robot, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    if robot.power != PowerState::Announcing {
        return Err(GameError::InvalidPowerChange {
            robot: robot.id,
            from: robot.power,
        });
    }
    robot.power = PowerState::On;
    events.push(GameEvent::PowerChanged {
        robot: robot.id,
        power: robot.power,
    });
    Ok(())
}

/// Enters OFF: damage and every register are wiped and the robot sits out
/// programming.
pub fn enter_power_down(robot: &mut Robot, events: &mut Vec<GameEvent>) {
    robot.power = PowerState::Off;
    robot.damage = 0;
    robot.clear_program();
    robot.submitted = true;
    events.push(GameEvent::PowerChanged {
        robot: robot.id,
        power: robot.power,
    });
}

/// OFF -> ON.
pub fn power_up(robot: &mut Robot, events: &mut Vec<GameEvent>) {
    robot.power = PowerState::On;
    events.push(GameEvent::PowerChanged {
        robot: robot.id,
        power: robot.power,
    });
}

fn safe_cell(board: &Board, robots: &[Robot], pos: Pos) -> bool {
    match board.tile(pos) {
        Some(tile) => tile.kind != TileKind::Pit && robot_at(robots, pos).is_none(),
        None => false,
    }
}

/// Picks where a destroyed robot re-enters: its archive marker if free,
/// otherwise the nearest free non-pit cell by king-move distance, scanning
/// each ring row by row.
pub fn respawn_position(board: &Board, robots: &[Robot], archive: Pos) -> Option<Pos> {
    if safe_cell(board, robots, archive) {
        return Some(archive);
    }
    let max_radius = board.width.max(board.height);
    for radius in 1..=max_radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let pos = archive.offset(dx, dy);
                if safe_cell(board, robots, pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}

/// Returns a dead robot to the board. Returns false if no free cell exists.
pub fn respawn(
    board: &Board,
    robots: &mut [Robot],
    idx: usize,
    facing: Direction,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !robots[idx].dead || robots[idx].eliminated {
        return false;
    }
    let pos = match respawn_position(board, robots, robots[idx].archive) {
        Some(p) => p,
        None => {
            tracing::warn!(robot = %robots[idx].id, "no free cell to respawn on");
            return false;
        }
    };
    let robot = &mut robots[idx];
    robot.pos = Some(pos);
    robot.dead = false;
    robot.facing = facing;
    tracing::debug!(robot = %robot.id, %pos, "robot respawned");
    events.push(GameEvent::RobotRespawned {
        robot: robot.id,
        pos,
        facing,
    });
    true
}
