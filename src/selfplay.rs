//! Self-play game generation.
//!
//! Plays whole games on a course with every robot programmed at random from
//! its own hand and every decision answered at random. Useful for soak tests,
//! balance checks on new courses, and benchmarking the resolver.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{practice_course, Board, RobotId, ALL_DIRECTIONS, REGISTER_COUNT};
use crate::config::GameConfig;
use crate::engine::{Game, Phase};
use crate::event::Standing;

/// Virtual milliseconds added whenever a game stops making progress on its own.
const STALL_STEP_MS: u64 = 60_000;

/// Configuration for self-play game generation.
#[derive(Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Robots seated per game, capped by the course's docks.
    pub robots: usize,
    /// Turn cap per game.
    pub max_turns: u32,
    /// Chance a robot announces a power-down when it is badly damaged.
    pub power_down_rate: f64,
    /// Number of parallel threads.
    pub threads: usize,
    /// Random seed. 0 means entropy.
    pub seed: u64,
    /// Suppress per-game progress on stderr.
    pub quiet: bool,
    /// Course to race on.
    pub board: Arc<Board>,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            robots: 4,
            max_turns: 40,
            power_down_rate: 0.5,
            threads: 4,
            seed: 0,
            quiet: false,
            board: Arc::new(practice_course()),
        }
    }
}

/// Outcome of one self-play game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub board: String,
    pub turns: u32,
    pub winner: Option<RobotId>,
    /// False if the game hit the turn cap.
    pub finished: bool,
    pub events: usize,
    pub standings: Vec<Standing>,
}

/// Plays one game to completion.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> GameRecord {
    let seed = rng.gen::<u64>();
    let game_config = GameConfig {
        max_turns: config.max_turns,
        timer: None,
        ..GameConfig::default()
    };
    let mut game = Game::new(Arc::clone(&config.board), game_config, seed);
    for n in 0..config.robots.min(game.capacity()) {
        if let Err(e) = game.add_robot(&format!("bot-{}", n)) {
            tracing::warn!(error = %e, "could not seat robot");
        }
    }

    let mut now = 0u64;
    let mut events = 0usize;
    if let Err(e) = game.start(now) {
        tracing::warn!(game_id, error = %e, "self-play game did not start");
    }
    while !game.is_over() && game.phase() != Phase::Waiting {
        let before = (game.turn(), game.phase(), game.awaiting().cloned());
        answer_decisions(&mut game, config, rng, now);
        if game.phase() == Phase::Programming && game.awaiting().is_none() {
            submit_random_programs(&mut game, config, rng, now);
        }
        events += game.drain_events().len();

        let after = (game.turn(), game.phase(), game.awaiting().cloned());
        if before == after {
            now += STALL_STEP_MS;
            game.tick(now);
        }
    }
    events += game.drain_events().len();

    GameRecord {
        game_id,
        seed,
        board: game.board().name.clone(),
        turns: game.turn(),
        winner: game.winner(),
        finished: game.winner().is_some(),
        events,
        standings: game.standings().to_vec(),
    }
}

fn pending_robots(game: &Game) -> Vec<RobotId> {
    match game.awaiting() {
        Some(awaiting) => game
            .robots()
            .iter()
            .map(|r| r.id)
            .filter(|id| awaiting.is_pending(*id))
            .collect(),
        None => Vec::new(),
    }
}

fn answer_decisions(game: &mut Game, config: &SelfPlayConfig, rng: &mut SmallRng, now: u64) {
    use crate::engine::Awaiting;

    for id in pending_robots(game) {
        let result = match game.awaiting() {
            Some(Awaiting::PowerDown(_)) => game.decide_power_down(id, rng.gen_bool(0.3), now),
            Some(Awaiting::Respawns(_)) => {
                let facing = ALL_DIRECTIONS[rng.gen_range(0..ALL_DIRECTIONS.len())];
                let power_down = rng.gen_bool(config.power_down_rate * 0.5);
                game.choose_respawn(id, facing, power_down, now)
            }
            Some(Awaiting::DamageChoices(_)) => {
                let discardable = game.robot(id).map_or(0, |r| r.discardable_options());
                if discardable > 0 && rng.gen_bool(0.5) {
                    let index = game
                        .robot(id)
                        .and_then(|r| r.options.iter().position(|o| o.kind.is_discardable()))
                        .unwrap_or(0);
                    game.discard_option(id, index, now)
                } else {
                    game.finish_damage_choice(id, now)
                }
            }
            None => Ok(()),
        };
        // A batch can close on an earlier answer, leaving later robots nothing to do.
        if let Err(e) = result {
            tracing::debug!(robot = %id, error = %e, "self-play decision skipped");
        }
    }
}

fn submit_random_programs(game: &mut Game, config: &SelfPlayConfig, rng: &mut SmallRng, now: u64) {
    let ready: Vec<RobotId> = game
        .robots()
        .iter()
        .filter(|r| r.is_active() && !r.submitted)
        .map(|r| r.id)
        .collect();
    for id in ready {
        let Some(robot) = game.robot(id) else { continue };
        let announce = robot.damage >= 6 && rng.gen_bool(config.power_down_rate);
        let mut hand: Vec<u16> = robot.hand.iter().map(|c| c.priority).collect();
        hand.shuffle(rng);
        let mut program = [None; REGISTER_COUNT];
        for (slot, priority) in program
            .iter_mut()
            .take(robot.first_locked_register())
            .zip(hand)
        {
            *slot = Some(priority);
        }

        if announce {
            if let Err(e) = game.announce_power_down(id) {
                tracing::debug!(robot = %id, error = %e, "power-down not announced");
            }
        }
        if let Err(e) = game.submit_program(id, program, now) {
            tracing::warn!(robot = %id, error = %e, "random program rejected");
        }
        if game.phase() != Phase::Programming {
            break;
        }
    }
}

/// Runs self-play and returns all game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| games.push(game));
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs self-play, handing each record to `on_game` as soon as it finishes.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

fn game_rng(config: &SelfPlayConfig, game_id: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn report_progress(config: &SelfPlayConfig, done: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    let outcome = match game.winner {
        Some(w) => format!("{} wins", w),
        None => "no winner".to_string(),
    };
    eprintln!(
        "Game {}/{}: {} after {} turns ({:.2}s)",
        done,
        config.num_games,
        outcome,
        game.turns,
        started.elapsed().as_secs_f64(),
    );
}

fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let mut rng = game_rng(config, i);
        let started = Instant::now();
        let game = play_game(config, i, &mut rng);
        report_progress(config, i + 1, &game, started);
        on_game(game);
    }
}

/// Parallel self-play: games run on a dedicated rayon pool and stream back
/// over a channel to the caller's thread.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "thread pool unavailable, playing sequentially");
            run_self_play_sequential(config, on_game);
            return;
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();
    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let mut rng = game_rng(config, i);
                        let started = Instant::now();
                        let game = play_game(config, i, &mut rng);
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        report_progress(config, done, &game, started);
                        let _ = tx.send(game);
                    });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
}

/// Writes one JSON object per game.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()
}

pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)
}

pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let finished = games.iter().filter(|g| g.finished).count();
    let turns: u64 = games.iter().map(|g| g.turns as u64).sum();
    let events: usize = games.iter().map(|g| g.events).sum();
    let seats = games.iter().map(|g| g.standings.len()).max().unwrap_or(0);
    let mut wins = vec![0usize; seats];
    for winner in games.iter().filter_map(|g| g.winner) {
        if let Some(count) = wins.get_mut(winner.0) {
            *count += 1;
        }
    }

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Finished with a winner: {}", finished);
    eprintln!("Avg turns/game: {:.1}", turns as f64 / total.max(1) as f64);
    eprintln!("Avg events/game: {:.1}", events as f64 / total.max(1) as f64);
    eprintln!("Win distribution:");
    for (seat, count) in wins.iter().enumerate() {
        let pct = 100.0 * *count as f64 / total.max(1) as f64;
        eprintln!("  robot#{}: {} ({:.1}%)", seat, count, pct);
    }
}
