//! Wall and bounds tests shared by every mover and the laser tracer.

use super::geometry::{Direction, Pos};
use super::layout::Board;

/// Returns true if a wall blocks the edge between `from` and its neighbour in
/// `dir`.
///
/// The edge is checked from both sides: an exit wall on the source tile, or an
/// entry wall on the facing side of the destination tile. A missing
/// destination tile (off the board) contributes no wall.
pub fn wall_between(board: &Board, from: Pos, dir: Direction) -> bool {
    if let Some(tile) = board.tile(from) {
        if tile.walls.contains(dir) {
            return true;
        }
    }
    match board.tile(from.step(dir)) {
        Some(tile) => tile.walls.contains(dir.opposite()),
        None => false,
    }
}

/// Returns true if `pos` is not on the grid.
pub fn is_off_board(board: &Board, pos: Pos) -> bool {
    !board.in_bounds(pos)
}

/// Returns true if `to` is reachable from `from` in one king move without
/// crossing a wall.
///
/// Orthogonal neighbours need an open shared edge. Diagonal neighbours are
/// reachable when either two-step orthogonal path through an on-board corner
/// cell is open.
pub fn reachable_adjacent(board: &Board, from: Pos, to: Pos) -> bool {
    if from == to || from.chebyshev(to) != 1 || !board.in_bounds(to) {
        return false;
    }
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let horizontal = match dx {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let vertical = match dy {
        1 => Some(Direction::Down),
        -1 => Some(Direction::Up),
        _ => None,
    };

    match (horizontal, vertical) {
        (Some(dir), None) | (None, Some(dir)) => !wall_between(board, from, dir),
        (Some(h), Some(v)) => {
            let via = |first: Direction, second: Direction| {
                let corner = from.step(first);
                board.in_bounds(corner)
                    && !wall_between(board, from, first)
                    && !wall_between(board, corner, second)
            };
            via(h, v) || via(v, h)
        }
        (None, None) => false,
    }
}
