//! Conveyor belts.
//!
//! All robots on eligible belts are planned together, then vetoed: two belt
//! moves into one cell cancel each other, two belt robots swapping cells
//! cancel, and a belt move into a cell held by a robot that is not itself
//! leaving cancels. Vetoes cascade until nothing changes; survivors move
//! simultaneously. Belts never push.

use crate::board::{wall_between, Board, Pos, Robot, Rotation, TileKind};
use crate::event::{DestroyCause, GameEvent, MoveCause};

use super::lifecycle::destroy;
use super::robot_at;

#[derive(Debug, Clone, Copy)]
struct BeltMove {
    robot: usize,
    from: Pos,
    to: Pos,
    rotate: Option<Rotation>,
    approved: bool,
}

fn plan(board: &Board, robots: &[Robot], express_only: bool) -> Vec<BeltMove> {
    let mut moves = Vec::new();
    for (idx, robot) in robots.iter().enumerate() {
        let Some(from) = robot.pos else { continue };
        let Some(tile) = board.tile(from) else { continue };
        let eligible = if express_only {
            tile.kind == TileKind::ExpressConveyor
        } else {
            tile.kind.is_conveyor()
        };
        if !eligible {
            continue;
        }
        let Some(exit) = tile.exit else {
            tracing::warn!(%from, "conveyor without an exit direction");
            continue;
        };
        if wall_between(board, from, exit) {
            continue;
        }
        let to = from.step(exit);
        let rotate = board
            .tile(to)
            .filter(|t| t.kind.is_conveyor())
            .and_then(|t| t.rotate);
        moves.push(BeltMove {
            robot: idx,
            from,
            to,
            rotate,
            approved: true,
        });
    }
    moves
}

fn veto(board: &Board, robots: &[Robot], moves: &mut [BeltMove]) {
    // Shared destinations.
    for i in 0..moves.len() {
        if !board.in_bounds(moves[i].to) {
            continue;
        }
        let shared = moves
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.to == moves[i].to);
        if shared {
            moves[i].approved = false;
        }
    }

    // Head-on swaps.
    for i in 0..moves.len() {
        let swapped = moves
            .iter()
            .any(|other| other.from == moves[i].to && other.to == moves[i].from);
        if swapped {
            moves[i].approved = false;
        }
    }

    // Blocked by a robot that stays put. Repeats because each veto can
    // strand another robot behind it.
    loop {
        let mut changed = false;
        for i in 0..moves.len() {
            if !moves[i].approved || !board.in_bounds(moves[i].to) {
                continue;
            }
            let Some(occupant) = robot_at(robots, moves[i].to) else { continue };
            let leaving = moves.iter().any(|m| m.robot == occupant && m.approved);
            if !leaving {
                moves[i].approved = false;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// Runs one belt pass: express belts only, or every belt.
pub fn run_conveyors(
    board: &Board,
    robots: &mut [Robot],
    express_only: bool,
    events: &mut Vec<GameEvent>,
) {
    let mut moves = plan(board, robots, express_only);
    if moves.is_empty() {
        return;
    }
    veto(board, robots, &mut moves);

    for m in moves.iter().filter(|m| m.approved) {
        let robot = &mut robots[m.robot];
        if !board.in_bounds(m.to) {
            destroy(robot, DestroyCause::FellOffBoard, events);
            continue;
        }
        robot.pos = Some(m.to);
        events.push(GameEvent::RobotMoved {
            robot: robot.id,
            from: m.from,
            to: m.to,
            cause: MoveCause::Conveyor,
        });
        if let Some(rotation) = m.rotate {
            robot.facing = robot.facing.rotated(rotation);
            events.push(GameEvent::RobotRotated {
                robot: robot.id,
                facing: robot.facing,
                cause: MoveCause::Conveyor,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, Tile};
    use crate::resolve::testutil::bot;

    fn belt(board: &mut Board, x: i32, y: i32, exit: Direction, express: bool) {
        board.place(Pos::new(x, y), Tile::conveyor(exit, express));
    }

    #[test]
    fn belt_carries_robot() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 1, Direction::Right, false);
        let mut robots = vec![bot(0, 1, 1, Direction::Up)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(2, 1)));
        assert_eq!(robots[0].facing, Direction::Up);
    }

    #[test]
    fn express_pass_skips_normal_belts() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 1, Direction::Right, false);
        belt(&mut board, 1, 3, Direction::Right, true);
        let mut robots = vec![bot(0, 1, 1, Direction::Up), bot(1, 1, 3, Direction::Up)];
        run_conveyors(&board, &mut robots, true, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(1, 1)));
        assert_eq!(robots[1].pos, Some(Pos::new(2, 3)));
    }

    #[test]
    fn converging_belts_cancel_both() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 2, Direction::Right, false);
        belt(&mut board, 3, 2, Direction::Left, false);
        let mut robots = vec![bot(0, 1, 2, Direction::Up), bot(1, 3, 2, Direction::Up)];
        let mut events = Vec::new();
        run_conveyors(&board, &mut robots, false, &mut events);
        assert_eq!(robots[0].pos, Some(Pos::new(1, 2)));
        assert_eq!(robots[1].pos, Some(Pos::new(3, 2)));
        assert!(events.is_empty());
    }

    #[test]
    fn head_on_swap_cancels() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 1, Direction::Right, false);
        belt(&mut board, 2, 1, Direction::Left, false);
        let mut robots = vec![bot(0, 1, 1, Direction::Up), bot(1, 2, 1, Direction::Up)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(1, 1)));
        assert_eq!(robots[1].pos, Some(Pos::new(2, 1)));
    }

    #[test]
    fn train_on_one_belt_moves_together() {
        let mut board = Board::new("c", 6, 6);
        for x in 0..4 {
            belt(&mut board, x, 0, Direction::Right, false);
        }
        let mut robots = vec![bot(0, 1, 0, Direction::Up), bot(1, 2, 0, Direction::Up)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(2, 0)));
        assert_eq!(robots[1].pos, Some(Pos::new(3, 0)));
    }

    #[test]
    fn blocked_by_stationary_robot_cascades() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 0, Direction::Right, false);
        belt(&mut board, 2, 0, Direction::Right, false);
        // (3,0) is plain floor with a robot on it.
        let mut robots = vec![
            bot(0, 1, 0, Direction::Up),
            bot(1, 2, 0, Direction::Up),
            bot(2, 3, 0, Direction::Up),
        ];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(1, 0)));
        assert_eq!(robots[1].pos, Some(Pos::new(2, 0)));
        assert_eq!(robots[2].pos, Some(Pos::new(3, 0)));
    }

    #[test]
    fn belt_into_wall_holds_robot() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 1, Direction::Down, false);
        board.add_wall(Pos::new(1, 1), Direction::Down);
        let mut robots = vec![bot(0, 1, 1, Direction::Up)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(1, 1)));
    }

    #[test]
    fn belt_off_edge_destroys() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 5, 5, Direction::Right, false);
        let mut robots = vec![bot(0, 5, 5, Direction::Up)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert!(robots[0].dead);
    }

    #[test]
    fn rotating_belt_turns_robot() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 1, Direction::Right, false);
        board.place(
            Pos::new(2, 1),
            Tile::conveyor(Direction::Down, false).with_rotation(Rotation::Clockwise),
        );
        let mut robots = vec![bot(0, 1, 1, Direction::Right)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].pos, Some(Pos::new(2, 1)));
        assert_eq!(robots[0].facing, Direction::Down);
    }

    #[test]
    fn rotation_tag_ignored_when_leaving_belts() {
        let mut board = Board::new("c", 6, 6);
        belt(&mut board, 1, 1, Direction::Right, false);
        let mut plain = Tile::new(TileKind::Empty);
        plain.rotate = Some(Rotation::Clockwise);
        board.place(Pos::new(2, 1), plain);
        let mut robots = vec![bot(0, 1, 1, Direction::Right)];
        run_conveyors(&board, &mut robots, false, &mut Vec::new());
        assert_eq!(robots[0].facing, Direction::Right);
    }
}
