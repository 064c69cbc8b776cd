use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use ironrally::board::{practice_course, Board, Direction, Pos, Robot, RobotId};
use ironrally::config::GameConfig;
use ironrally::engine::Game;
use ironrally::resolve::{fire_lasers, run_conveyors, step_robot};
use ironrally::event::MoveCause;
use ironrally::selfplay::{play_game, SelfPlayConfig};

/// Eight robots spread over the practice course, some on belts and in beams.
fn crowd() -> Vec<Robot> {
    [(3, 3), (5, 3), (9, 4), (2, 7), (2, 8), (6, 6), (10, 5), (5, 2)]
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Robot::new(RobotId(i), "bench", Pos::new(x, y), 3))
        .collect()
}

fn bench_conveyors(c: &mut Criterion) {
    let board = practice_course();
    let robots = crowd();
    c.bench_function("conveyors_8_robots", |b| {
        b.iter(|| {
            let mut robots = robots.clone();
            let mut events = Vec::new();
            run_conveyors(black_box(&board), &mut robots, true, &mut events);
            run_conveyors(black_box(&board), &mut robots, false, &mut events);
            events
        })
    });
}

fn bench_lasers(c: &mut Criterion) {
    let board = practice_course();
    let robots = crowd();
    c.bench_function("lasers_8_robots", |b| {
        b.iter(|| {
            let mut events = Vec::new();
            fire_lasers(black_box(&board), black_box(&robots), &mut events)
        })
    });
}

fn bench_long_push_chain(c: &mut Criterion) {
    let board = Board::new("row", 64, 1);
    let robots: Vec<Robot> = (0..48)
        .map(|i| Robot::new(RobotId(i), "bench", Pos::new(i as i32, 0), 3))
        .collect();
    c.bench_function("push_chain_48", |b| {
        b.iter(|| {
            let mut robots = robots.clone();
            let mut events = Vec::new();
            step_robot(&board, &mut robots, 0, Direction::Right, MoveCause::Card, &mut events)
        })
    });
}

fn bench_full_turn(c: &mut Criterion) {
    let board = Arc::new(practice_course());
    let config = GameConfig {
        timer: None,
        ..GameConfig::default()
    };
    c.bench_function("full_turn_4_robots", |b| {
        b.iter(|| {
            let mut game = Game::new(Arc::clone(&board), config.clone(), 17);
            for name in ["a", "b", "c", "d"] {
                let _ = game.add_robot(name);
            }
            let _ = game.start(0);
            for id in 0..4 {
                let hand: Vec<Option<u16>> = game.robots()[id]
                    .hand
                    .iter()
                    .take(5)
                    .map(|c| Some(c.priority))
                    .collect();
                let mut program = [None; 5];
                program.copy_from_slice(&hand);
                let _ = game.submit_program(RobotId(id), program, 0);
            }
            black_box(game.turn())
        })
    });
}

fn bench_selfplay_game(c: &mut Criterion) {
    let config = SelfPlayConfig {
        max_turns: 10,
        quiet: true,
        ..SelfPlayConfig::default()
    };
    c.bench_function("selfplay_game_10_turns", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(3);
            play_game(black_box(&config), 0, &mut rng)
        })
    });
}

criterion_group!(
    benches,
    bench_conveyors,
    bench_lasers,
    bench_long_push_chain,
    bench_full_turn,
    bench_selfplay_game,
);
criterion_main!(benches);
