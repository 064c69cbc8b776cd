//! Self-play game generation CLI.
//!
//! Plays robot races with random programs and writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --robots N      Robots per game (default: 4)
//!   --max-turns N   Turn cap per game (default: 40)
//!   --course FILE   Board JSON file (default: built-in practice course)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use ironrally::board::Board;
use ironrally::selfplay::{self, SelfPlayConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => config.num_games = value(&args, &mut i, flag),
            "--robots" => config.robots = value(&args, &mut i, flag),
            "--max-turns" => config.max_turns = value(&args, &mut i, flag),
            "--threads" => config.threads = value(&args, &mut i, flag),
            "--seed" => config.seed = value(&args, &mut i, flag),
            "--course" => {
                let path: String = value(&args, &mut i, flag);
                match Board::load(Path::new(&path)) {
                    Ok(board) => config.board = Arc::new(board),
                    Err(e) => fail(&format!("cannot load {}: {}", path, e)),
                }
            }
            "--output" => output_path = Some(value(&args, &mut i, flag)),
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => fail(&format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    let result = match &output_path {
        Some(path) => File::create(path).and_then(|file| {
            let mut out = BufWriter::new(file);
            selfplay::write_jsonl(&games, &mut out)
        }),
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut out)
        }
    };
    if let Err(e) = result {
        eprintln!("failed to write records: {}", e);
        std::process::exit(1);
    }

    if !config.quiet {
        selfplay::print_summary(&games);
        eprintln!(
            "Total time: {:.1}s ({:.2}s/game)",
            elapsed.as_secs_f64(),
            elapsed.as_secs_f64() / games.len().max(1) as f64,
        );
        if let Some(path) = &output_path {
            eprintln!("Output written to: {}", path);
        }
    }
}

/// Reads the value following `flag`, exiting with usage on a bad value.
fn value<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    *i += 1;
    match args.get(*i).map(|raw| raw.parse::<T>()) {
        Some(Ok(parsed)) => parsed,
        _ => fail(&format!("invalid {} value", flag)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    std::process::exit(1);
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N       Number of games to play (default: 10)");
    eprintln!("  --robots N      Robots per game (default: 4)");
    eprintln!("  --max-turns N   Turn cap per game (default: 40)");
    eprintln!("  --course FILE   Board JSON file (default: built-in practice course)");
    eprintln!("  --threads N     Number of parallel threads (default: 4)");
    eprintln!("  --seed N        Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE   Output file path (default: stdout)");
    eprintln!("  --quiet         Suppress summary output");
}
