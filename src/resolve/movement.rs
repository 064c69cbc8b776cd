//! Card movement and pushing.
//!
//! A step walks the line of robots ahead of the mover iteratively; if any
//! member of the chain is stopped by a wall, nobody moves. Members pushed
//! past the edge fall off. Moves are applied from the far end back so two
//! robots never share a cell.

use crate::board::{
    wall_between, Board, CardAction, Direction, MovementModifier, ProgramCard, Robot, TileKind,
};
use crate::event::{DestroyCause, GameEvent, MoveCause};

use super::damage::apply_damage;
use super::lifecycle::destroy;
use super::robot_at;

/// Result of a single movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Blocked,
    Destroyed,
}

/// Collects the mover and every robot it would push, in order. `None` if a
/// wall stops any member.
fn push_chain(board: &Board, robots: &[Robot], mover: usize, dir: Direction) -> Option<Vec<usize>> {
    let mut cur = robots[mover].pos?;
    let mut chain = vec![mover];
    loop {
        if wall_between(board, cur, dir) {
            return None;
        }
        let next = cur.step(dir);
        if !board.in_bounds(next) {
            return Some(chain);
        }
        match robot_at(robots, next) {
            Some(idx) => {
                chain.push(idx);
                cur = next;
            }
            None => return Some(chain),
        }
    }
}

/// Moves a robot one cell, pushing whatever stands in the way.
///
/// `cause` is recorded for the mover; pushed robots record `Push`. Ramming
/// damage applies only to the robot directly ahead of a card-driven mover.
pub fn step_robot(
    board: &Board,
    robots: &mut [Robot],
    mover: usize,
    dir: Direction,
    cause: MoveCause,
    events: &mut Vec<GameEvent>,
) -> StepOutcome {
    if !robots[mover].is_alive() {
        return StepOutcome::Destroyed;
    }
    let chain = match push_chain(board, robots, mover, dir) {
        Some(chain) => chain,
        None => return StepOutcome::Blocked,
    };

    for (k, &idx) in chain.iter().enumerate().rev() {
        let robot = &mut robots[idx];
        let Some(from) = robot.pos else { continue };
        let to = from.step(dir);
        if !board.in_bounds(to) {
            destroy(robot, DestroyCause::FellOffBoard, events);
            continue;
        }
        robot.pos = Some(to);
        events.push(GameEvent::RobotMoved {
            robot: robot.id,
            from,
            to,
            cause: if k == 0 { cause } else { MoveCause::Push },
        });
    }

    if cause == MoveCause::Card
        && chain.len() > 1
        && robots[mover].has_movement_modifier(MovementModifier::Ramming)
    {
        let rammed = &mut robots[chain[1]];
        if rammed.is_alive() {
            apply_damage(rammed, 1, 0, events);
        }
    }

    if robots[mover].is_alive() {
        StepOutcome::Moved
    } else {
        StepOutcome::Destroyed
    }
}

/// Moves a robot up to `steps` cells. Stops early when blocked or destroyed.
/// A card-driven mover that enters a pit falls in immediately.
pub fn move_robot(
    board: &Board,
    robots: &mut [Robot],
    mover: usize,
    dir: Direction,
    steps: u8,
    cause: MoveCause,
    events: &mut Vec<GameEvent>,
) -> StepOutcome {
    let mut outcome = StepOutcome::Blocked;
    for _ in 0..steps {
        outcome = step_robot(board, robots, mover, dir, cause, events);
        if outcome != StepOutcome::Moved {
            break;
        }
        if cause == MoveCause::Card {
            let in_pit = robots[mover]
                .pos
                .and_then(|p| board.tile(p))
                .is_some_and(|t| t.kind == TileKind::Pit);
            if in_pit {
                destroy(&mut robots[mover], DestroyCause::Pit, events);
                return StepOutcome::Destroyed;
            }
        }
    }
    outcome
}

/// Executes one program card for one robot.
pub fn execute_card(
    board: &Board,
    robots: &mut [Robot],
    idx: usize,
    card: ProgramCard,
    register: usize,
    events: &mut Vec<GameEvent>,
) {
    if !robots[idx].is_alive() {
        return;
    }
    events.push(GameEvent::CardExecuted {
        robot: robots[idx].id,
        register,
        card,
    });
    match card.action {
        CardAction::UTurn | CardAction::RotateLeft | CardAction::RotateRight => {
            let robot = &mut robots[idx];
            let mut facing = robot.facing;
            for _ in 0..card.action.quarter_turns() {
                facing = facing.clockwise();
            }
            robot.facing = facing;
            events.push(GameEvent::RobotRotated {
                robot: robot.id,
                facing,
                cause: MoveCause::Card,
            });
        }
        CardAction::BackUp => {
            let dir = robots[idx].facing.opposite();
            move_robot(board, robots, idx, dir, 1, MoveCause::Card, events);
        }
        CardAction::Move1 | CardAction::Move2 | CardAction::Move3 => {
            let dir = robots[idx].facing;
            let steps = card.action.forward_steps();
            move_robot(board, robots, idx, dir, steps, MoveCause::Card, events);
        }
    }
}
