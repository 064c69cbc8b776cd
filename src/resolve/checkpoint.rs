//! Checkpoints, archive markers and end-of-turn repairs.

use crate::board::{
    reachable_adjacent, Board, OptionCard, OptionKind, Pos, ReachModifier, Robot, TileKind,
};
use crate::event::GameEvent;

/// Cells a robot counts as standing on: its own, plus every wall-free king
/// move away when it holds a mechanical arm.
fn touched_cells(board: &Board, robot: &Robot) -> Vec<Pos> {
    let Some(pos) = robot.pos else {
        return Vec::new();
    };
    let mut cells = vec![pos];
    if robot.has_reach_modifier(ReachModifier::AdjacentTiles) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let to = pos.offset(dx, dy);
                if reachable_adjacent(board, pos, to) {
                    cells.push(to);
                }
            }
        }
    }
    cells
}

/// Advances every robot touching its next checkpoint. Returns the first
/// robot (in robot order) to reach the final checkpoint.
pub fn touch_checkpoints(board: &Board, robots: &mut [Robot], events: &mut Vec<GameEvent>) -> Option<usize> {
    let total = board.checkpoint_count();
    let mut winner = None;
    for idx in 0..robots.len() {
        if !robots[idx].is_alive() || robots[idx].checkpoint >= total {
            continue;
        }
        let next = robots[idx].checkpoint + 1;
        let reached = touched_cells(board, &robots[idx])
            .into_iter()
            .find(|cell| board.checkpoint_at(*cell) == Some(next));
        let Some(cell) = reached else { continue };

        let robot = &mut robots[idx];
        robot.checkpoint = next;
        robot.archive = cell;
        tracing::info!(robot = %robot.id, checkpoint = next, "checkpoint reached");
        events.push(GameEvent::CheckpointReached {
            robot: robot.id,
            number: next,
        });
        events.push(GameEvent::ArchiveUpdated {
            robot: robot.id,
            pos: cell,
        });
        if next == total && winner.is_none() {
            winner = Some(idx);
        }
    }
    winner
}

/// Heals robots on repair sites and hands out capability cards on option
/// sites. Both move the archive marker.
pub fn run_repairs(
    board: &Board,
    robots: &mut [Robot],
    option_deck: &mut Vec<OptionKind>,
    option_cap: usize,
    events: &mut Vec<GameEvent>,
) {
    for idx in 0..robots.len() {
        if !robots[idx].is_alive() {
            continue;
        }
        let site = touched_cells(board, &robots[idx]).into_iter().find_map(|cell| {
            board
                .tile(cell)
                .filter(|t| t.kind.is_repair_site())
                .map(|t| (cell, t.kind))
        });
        let Some((cell, kind)) = site else { continue };

        let robot = &mut robots[idx];
        robot.damage = robot.damage.saturating_sub(1);
        events.push(GameEvent::Repaired {
            robot: robot.id,
            damage: robot.damage,
        });
        robot.archive = cell;
        events.push(GameEvent::ArchiveUpdated {
            robot: robot.id,
            pos: cell,
        });

        if kind == TileKind::Option && robot.options.len() < option_cap {
            if let Some(drawn) = option_deck.pop() {
                robot.options.push(OptionCard::new(drawn));
                tracing::debug!(robot = %robot.id, option = ?drawn, "option drawn");
                events.push(GameEvent::OptionDrawn {
                    robot: robot.id,
                    kind: drawn,
                });
            }
        }
    }
}
