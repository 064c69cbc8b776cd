//! Board resolution.
//!
//! Each submodule resolves one sub-phase of a register (card movement,
//! belts, pushers/gears/pits, lasers, damage, checkpoints) or the robot
//! lifecycle. Resolvers borrow the static board and the robot list; they
//! report what happened by appending `GameEvent`s.

pub mod checkpoint;
pub mod conveyor;
pub mod damage;
pub mod elements;
pub mod laser;
pub mod lifecycle;
pub mod movement;

pub use checkpoint::{run_repairs, touch_checkpoints};
pub use conveyor::run_conveyors;
pub use damage::{apply_damage, mitigate, DamageChoice, Mitigation};
pub use elements::{run_gears, run_pits, run_pushers};
pub use laser::{fire_lasers, trace_beam, Beam, Hit};
pub use lifecycle::{destroy, eliminate, respawn, respawn_position};
pub use movement::{execute_card, move_robot, step_robot, StepOutcome};

use crate::board::{Pos, Robot};

/// Returns the index of the robot standing on `pos`.
pub fn robot_at(robots: &[Robot], pos: Pos) -> Option<usize> {
    robots.iter().position(|r| r.pos == Some(pos))
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::board::{Direction, Pos, Robot, RobotId};

    /// A robot with 3 lives at `(x, y)`.
    pub fn bot(id: usize, x: i32, y: i32, facing: Direction) -> Robot {
        let mut robot = Robot::new(RobotId(id), &format!("r{}", id), Pos::new(x, y), 3);
        robot.facing = facing;
        robot
    }
}
