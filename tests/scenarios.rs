//! End-to-end rule scenarios driven through the public game API.

use std::sync::Arc;

use ironrally::board::{
    Board, Direction, Pos, ProgramCard, Robot, RobotId, Tile, TileKind, MAX_DAMAGE,
};
use ironrally::config::GameConfig;
use ironrally::engine::{Awaiting, Game, Phase};
use ironrally::event::{DestroyCause, GameEvent};
use ironrally::resolve::{apply_damage, trace_beam};
use ironrally::timer::{TimerPolicy, TimerTrigger};

fn no_timer() -> GameConfig {
    GameConfig {
        timer: None,
        ..GameConfig::default()
    }
}

/// An open 10x10 board with robots docked at `docks`.
fn open_board(docks: &[(i32, i32)]) -> Board {
    let mut board = Board::new("scenario", 10, 10);
    board.docks = docks.iter().map(|&(x, y)| Pos::new(x, y)).collect();
    board
}

fn game_on(board: Board, config: GameConfig, robots: usize) -> Game {
    let mut game = Game::new(Arc::new(board), config, 21);
    for n in 0..robots {
        game.add_robot(&format!("r{}", n)).unwrap();
    }
    game
}

fn face(game: &mut Game, id: usize, facing: Direction) {
    game.robot_mut(RobotId(id)).unwrap().facing = facing;
}

/// Replaces the robot's hand with exactly `cards` and submits them in order.
fn program(game: &mut Game, id: usize, cards: [Option<u16>; 5]) {
    let hand: Vec<ProgramCard> = cards
        .iter()
        .flatten()
        .map(|p| ProgramCard::from_priority(*p).unwrap())
        .collect();
    game.robot_mut(RobotId(id)).unwrap().hand = hand;
    game.submit_program(RobotId(id), cards, 0).unwrap();
}

const MOVE_1: u16 = 490;

#[test]
fn moving_onto_a_pit_destroys_and_costs_a_life() {
    let mut board = open_board(&[(5, 5)]);
    board.place(Pos::new(5, 4), Tile::new(TileKind::Pit));
    let mut game = game_on(board, no_timer(), 1);
    game.start(0).unwrap();
    program(&mut game, 0, [Some(MOVE_1), None, None, None, None]);

    let robot = &game.robots()[0];
    assert_eq!(robot.pos, None);
    assert_eq!(robot.lives, 2);
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::RobotDestroyed {
        robot: RobotId(0),
        cause: DestroyCause::Pit,
        lives: 2,
    }));
    assert!(matches!(game.awaiting(), Some(Awaiting::Respawns(_))));

    game.choose_respawn(RobotId(0), Direction::Left, false, 100).unwrap();
    let robot = &game.robots()[0];
    assert_eq!(robot.pos, Some(Pos::new(5, 5)));
    assert_eq!(robot.facing, Direction::Left);
    assert_eq!(robot.damage, 2);
    assert_eq!(game.turn(), 2);
}

#[test]
fn card_move_pushes_the_occupant() {
    let mut game = game_on(open_board(&[(4, 5), (5, 5)]), no_timer(), 2);
    face(&mut game, 0, Direction::Right);
    game.start(0).unwrap();
    program(&mut game, 1, [None; 5]);
    program(&mut game, 0, [Some(MOVE_1), None, None, None, None]);

    assert_eq!(game.robots()[0].pos, Some(Pos::new(5, 5)));
    assert_eq!(game.robots()[1].pos, Some(Pos::new(6, 5)));
}

#[test]
fn push_into_an_immovable_robot_fails() {
    let mut board = open_board(&[(4, 5), (5, 5), (6, 5)]);
    board.add_wall(Pos::new(6, 5), Direction::Right);
    let mut game = game_on(board, no_timer(), 3);
    face(&mut game, 0, Direction::Right);
    game.start(0).unwrap();
    program(&mut game, 1, [None; 5]);
    program(&mut game, 2, [None; 5]);
    program(&mut game, 0, [Some(MOVE_1), None, None, None, None]);

    assert_eq!(game.robots()[0].pos, Some(Pos::new(4, 5)));
    assert_eq!(game.robots()[1].pos, Some(Pos::new(5, 5)));
    assert_eq!(game.robots()[2].pos, Some(Pos::new(6, 5)));
}

#[test]
fn converging_conveyors_leave_both_robots_in_place() {
    let mut board = open_board(&[(3, 3), (5, 3)]);
    board.place(Pos::new(3, 3), Tile::conveyor(Direction::Right, false));
    board.place(Pos::new(5, 3), Tile::conveyor(Direction::Left, false));
    let mut game = game_on(board, no_timer(), 2);
    game.start(0).unwrap();
    program(&mut game, 0, [None; 5]);
    program(&mut game, 1, [None; 5]);

    assert_eq!(game.turn(), 2);
    assert_eq!(game.robots()[0].pos, Some(Pos::new(3, 3)));
    assert_eq!(game.robots()[1].pos, Some(Pos::new(5, 3)));
    assert!(!game
        .drain_events()
        .iter()
        .any(|e| matches!(e, GameEvent::RobotMoved { .. })));
}

#[test]
fn checkpoints_out_of_order_do_not_count() {
    let mut board = open_board(&[(2, 6)]);
    board.add_checkpoint(Pos::new(0, 0));
    board.add_checkpoint(Pos::new(2, 5));
    let mut game = game_on(board, no_timer(), 1);
    game.start(0).unwrap();
    program(&mut game, 0, [Some(MOVE_1), None, None, None, None]);

    let robot = &game.robots()[0];
    assert_eq!(robot.pos, Some(Pos::new(2, 5)));
    assert_eq!(robot.checkpoint, 0);
    assert_eq!(robot.archive, Pos::new(2, 6));
    assert_eq!(game.phase(), Phase::Programming);
}

#[test]
fn pass_through_skips_exactly_one_robot() {
    let board = Board::new("beam", 8, 1);
    let robots: Vec<Robot> = [1, 3, 5]
        .iter()
        .enumerate()
        .map(|(i, &x)| Robot::new(RobotId(i), "r", Pos::new(x, 0), 3))
        .collect();

    let plain = trace_beam(&board, &robots, Pos::new(0, 0), Direction::Right, false, 0);
    assert_eq!(plain.hits, vec![0]);
    assert_eq!(plain.path.last(), Some(&Pos::new(1, 0)));

    let piercing = trace_beam(&board, &robots, Pos::new(0, 0), Direction::Right, false, 1);
    assert_eq!(piercing.hits, vec![0, 1]);
    assert_eq!(piercing.path.last(), Some(&Pos::new(3, 0)));
}

#[test]
fn damage_is_capped_and_destroys_once() {
    let mut robot = Robot::new(RobotId(0), "r", Pos::new(0, 0), 3);
    robot.damage = 8;
    let mut events = Vec::new();
    apply_damage(&mut robot, 5, 0, &mut events);

    assert_eq!(robot.lives, 2);
    assert_eq!(robot.damage, 2);
    assert!(robot.damage <= MAX_DAMAGE);
    let destroyed = events
        .iter()
        .filter(|e| matches!(e, GameEvent::RobotDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 1);
    assert!(events.contains(&GameEvent::DamageApplied {
        robot: RobotId(0),
        requested: 5,
        prevented: 0,
        damage: MAX_DAMAGE,
    }));
}

#[test]
fn locked_registers_track_damage() {
    let mut game = game_on(open_board(&[(1, 1), (3, 3)]), no_timer(), 2);
    game.robot_mut(RobotId(0)).unwrap().damage = 7;
    game.robot_mut(RobotId(1)).unwrap().damage = 3;
    game.start(0).unwrap();

    assert_eq!(game.robots()[0].locked_registers(), 3);
    assert_eq!(game.robots()[0].hand.len(), 2);
    assert_eq!(game.robots()[1].locked_registers(), 0);
    // Locked but empty registers are filled straight from the deck.
    assert!(game.robots()[0].registers[2..].iter().all(|r| r.is_some()));
}

#[test]
fn timer_fills_the_last_program_from_its_own_hand() {
    let config = GameConfig {
        timer: Some(TimerPolicy {
            trigger: TimerTrigger::Unsubmitted(1),
            duration_ms: 5000,
        }),
        ..GameConfig::default()
    };
    let mut game = game_on(open_board(&[(1, 8), (8, 8)]), config, 2);
    game.start(0).unwrap();
    // Rotations only, so nobody leaves the board whatever the draw.
    game.robot_mut(RobotId(1)).unwrap().hand = [10, 70, 80, 90, 100, 110]
        .iter()
        .map(|p| ProgramCard::from_priority(*p).unwrap())
        .collect();
    let hand: Vec<u16> = game.robots()[1].hand.iter().map(|c| c.priority).collect();

    game.robot_mut(RobotId(0)).unwrap().hand = vec![ProgramCard::from_priority(20).unwrap()];
    game.submit_program(RobotId(0), [Some(20), None, None, None, None], 1000)
        .unwrap();
    assert_eq!(game.timer_deadline_ms(), Some(6000));

    game.tick(5999);
    assert_eq!(game.phase(), Phase::Programming);
    game.tick(6000);
    assert_eq!(game.turn(), 2);

    let executed: Vec<u16> = game
        .drain_events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::CardExecuted { robot, card, .. } if *robot == RobotId(1) => {
                Some(card.priority)
            }
            _ => None,
        })
        .collect();
    assert_eq!(executed.len(), 5);
    assert!(executed.iter().all(|p| hand.contains(p)));
}
