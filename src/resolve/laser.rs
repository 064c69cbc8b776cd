//! Board and robot lasers.
//!
//! Beams are traced against the positions robots hold once movement for the
//! register is done. A beam stops at the first wall or robot unless it can
//! pierce. Board emitters light their own cell first; robot beams start one
//! cell ahead of the shooter.

use crate::board::{wall_between, Board, Direction, LaserModifier, Pos, PowerState, Robot};
use crate::event::{GameEvent, LaserSource};

use super::robot_at;

/// Cells a beam lit and the robots it struck, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Beam {
    pub path: Vec<Pos>,
    pub hits: Vec<usize>,
}

/// One laser hit on one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: usize,
    /// Direction the beam was travelling.
    pub travel: Direction,
    pub robot_laser: bool,
    pub damage: u8,
}

impl Hit {
    /// The side of the target the beam struck.
    pub fn side(&self) -> Direction {
        self.travel.opposite()
    }
}

/// Traces a beam from `origin` in `dir`. `pierce` is how many walls or
/// robots the beam may pass through before it stops.
pub fn trace_beam(
    board: &Board,
    robots: &[Robot],
    origin: Pos,
    dir: Direction,
    include_origin: bool,
    mut pierce: u8,
) -> Beam {
    let mut beam = Beam::default();
    if include_origin {
        beam.path.push(origin);
        if let Some(idx) = robot_at(robots, origin) {
            beam.hits.push(idx);
            if pierce == 0 {
                return beam;
            }
            pierce -= 1;
        }
    }
    let mut cur = origin;
    loop {
        if wall_between(board, cur, dir) {
            if pierce == 0 {
                break;
            }
            pierce -= 1;
        }
        let next = cur.step(dir);
        if !board.in_bounds(next) {
            break;
        }
        cur = next;
        beam.path.push(cur);
        if let Some(idx) = robot_at(robots, cur) {
            beam.hits.push(idx);
            if pierce == 0 {
                break;
            }
            pierce -= 1;
        }
    }
    beam
}

#[derive(Debug, Clone, Copy)]
struct Shot {
    source: LaserSource,
    travel: Direction,
    robot_laser: bool,
    damage: u8,
}

fn record(beam: &Beam, shot: Shot, robots: &[Robot], hits: &mut Vec<Hit>, events: &mut Vec<GameEvent>) {
    for &target in &beam.hits {
        hits.push(Hit {
            target,
            travel: shot.travel,
            robot_laser: shot.robot_laser,
            damage: shot.damage,
        });
    }
    events.push(GameEvent::LaserFired {
        source: shot.source,
        path: beam.path.clone(),
        hits: beam.hits.iter().map(|&i| robots[i].id).collect(),
    });
}

/// Fires every board emitter and every powered robot laser. Returns all hits
/// in firing order.
pub fn fire_lasers(board: &Board, robots: &[Robot], events: &mut Vec<GameEvent>) -> Vec<Hit> {
    let mut hits = Vec::new();

    for (index, emitter) in board.lasers.iter().enumerate() {
        let beam = trace_beam(board, robots, emitter.pos, emitter.direction, true, 0);
        let shot = Shot {
            source: LaserSource::Board { index },
            travel: emitter.direction,
            robot_laser: false,
            damage: emitter.strength,
        };
        record(&beam, shot, robots, &mut hits, events);
    }

    for robot in robots.iter() {
        let Some(pos) = robot.pos else { continue };
        if robot.power == PowerState::Off {
            continue;
        }
        let pierce = u8::from(robot.has_laser_modifier(LaserModifier::PassThrough));
        let shots = if robot.has_laser_modifier(LaserModifier::ExtraShot) {
            2
        } else {
            1
        };
        let beam = trace_beam(board, robots, pos, robot.facing, false, pierce);
        // Walled in at the muzzle: the laser never fires.
        if !beam.path.is_empty() {
            let shot = Shot {
                source: LaserSource::Robot {
                    robot: robot.id,
                    rear: false,
                },
                travel: robot.facing,
                robot_laser: true,
                damage: 1,
            };
            for _ in 0..shots {
                record(&beam, shot, robots, &mut hits, events);
            }
        }

        if robot.has_laser_modifier(LaserModifier::RearShot) {
            let back = robot.facing.opposite();
            let beam = trace_beam(board, robots, pos, back, false, 0);
            if !beam.path.is_empty() {
                let shot = Shot {
                    source: LaserSource::Robot {
                        robot: robot.id,
                        rear: true,
                    },
                    travel: back,
                    robot_laser: true,
                    damage: 1,
                };
                record(&beam, shot, robots, &mut hits, events);
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{OptionCard, OptionKind};
    use crate::resolve::testutil::bot;

    #[test]
    fn board_laser_hits_robot_on_emitter_cell() {
        let mut board = Board::new("l", 6, 6);
        board.add_laser(Pos::new(0, 2), Direction::Right, 1);
        let robots = vec![bot(0, 0, 2, Direction::Up), bot(1, 3, 2, Direction::Up)];
        let mut events = Vec::new();
        let hits = fire_lasers(&board, &robots, &mut events);
        let board_hits: Vec<usize> = hits.iter().filter(|h| !h.robot_laser).map(|h| h.target).collect();
        assert_eq!(board_hits, vec![0]);
    }

    #[test]
    fn beam_stops_at_wall() {
        let mut board = Board::new("l", 6, 6);
        board.add_laser(Pos::new(0, 2), Direction::Right, 2);
        board.add_wall(Pos::new(1, 2), Direction::Right);
        let robots = vec![bot(0, 3, 2, Direction::Up)];
        let beam = trace_beam(&board, &robots, Pos::new(0, 2), Direction::Right, true, 0);
        assert_eq!(beam.path, vec![Pos::new(0, 2), Pos::new(1, 2)]);
        assert!(beam.hits.is_empty());
    }

    #[test]
    fn robot_laser_hits_first_robot_only() {
        let board = Board::new("l", 8, 3);
        let robots = vec![
            bot(0, 0, 1, Direction::Right),
            bot(1, 3, 1, Direction::Left),
            bot(2, 5, 1, Direction::Up),
        ];
        let mut events = Vec::new();
        let hits = fire_lasers(&board, &robots, &mut events);
        let from_zero: Vec<usize> = hits
            .iter()
            .filter(|h| h.travel == Direction::Right)
            .map(|h| h.target)
            .collect();
        assert_eq!(from_zero, vec![1]);
        // Robot 1 fires back at robot 0.
        assert!(hits.iter().any(|h| h.target == 0 && h.travel == Direction::Left));
    }

    #[test]
    fn pass_through_continues_past_one_robot() {
        let board = Board::new("l", 8, 3);
        let mut robots = vec![
            bot(0, 0, 1, Direction::Right),
            bot(1, 2, 1, Direction::Up),
            bot(2, 4, 1, Direction::Up),
            bot(3, 6, 1, Direction::Up),
        ];
        robots[0].options.push(OptionCard::new(OptionKind::HighPowerLaser));
        let beam = trace_beam(&board, &robots, Pos::new(0, 1), Direction::Right, false, 1);
        assert_eq!(beam.hits, vec![1, 2]);

        let hits = fire_lasers(&board, &robots, &mut Vec::new());
        let from_zero: Vec<usize> = hits
            .iter()
            .filter(|h| h.travel == Direction::Right)
            .map(|h| h.target)
            .collect();
        assert_eq!(from_zero, vec![1, 2]);
    }

    #[test]
    fn pass_through_pierces_a_wall() {
        let mut board = Board::new("l", 8, 3);
        board.add_wall(Pos::new(1, 1), Direction::Right);
        let robots = vec![bot(0, 0, 1, Direction::Right), bot(1, 3, 1, Direction::Up)];
        let blocked = trace_beam(&board, &robots, Pos::new(0, 1), Direction::Right, false, 0);
        assert!(blocked.hits.is_empty());
        let pierced = trace_beam(&board, &robots, Pos::new(0, 1), Direction::Right, false, 1);
        assert_eq!(pierced.hits, vec![1]);
    }

    #[test]
    fn walled_muzzle_never_fires() {
        let mut board = Board::new("l", 8, 3);
        board.add_wall(Pos::new(0, 1), Direction::Right);
        let robots = vec![bot(0, 0, 1, Direction::Right)];
        let mut events = Vec::new();
        let hits = fire_lasers(&board, &robots, &mut events);
        assert!(hits.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn double_barrel_and_rear_shots() {
        let board = Board::new("l", 8, 3);
        let mut robots = vec![
            bot(0, 1, 1, Direction::Left),
            bot(1, 3, 1, Direction::Up),
            bot(2, 0, 1, Direction::Up),
        ];
        robots[0].options.push(OptionCard::new(OptionKind::DoubleBarreledLaser));
        robots[0].options.push(OptionCard::new(OptionKind::RearFiringLaser));
        let hits = fire_lasers(&board, &robots, &mut Vec::new());
        let on_two = hits.iter().filter(|h| h.target == 2).count();
        let on_one = hits.iter().filter(|h| h.target == 1).count();
        assert_eq!(on_two, 2);
        assert_eq!(on_one, 1);
    }

    #[test]
    fn powered_down_robot_does_not_fire() {
        let board = Board::new("l", 8, 3);
        let mut robots = vec![bot(0, 0, 1, Direction::Right), bot(1, 3, 1, Direction::Up)];
        robots[0].power = PowerState::Off;
        let hits = fire_lasers(&board, &robots, &mut Vec::new());
        assert!(hits.is_empty());
    }
}
