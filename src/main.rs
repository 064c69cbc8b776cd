//! ironrally: drive a robot race over JSON lines.
//!
//! Reads one command per line from stdin and writes one JSON object per line
//! to stdout: the reply to each command, followed by every event the command
//! produced. Time is virtual and only moves on `{"cmd":"advance","ms":N}`, so
//! a session transcript replays identically.
//!
//! Usage:
//!   ironrally [COURSE] [--courses DIR] [--config FILE] [--seed N]
//!
//! COURSE is a board JSON file, or a course id looked up in `--courses DIR`
//! or among the built-in courses (default: practice).

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use ironrally::board::{
    Board, BoardError, BuiltinCourses, CourseSource, JsonCourseDir, PRACTICE_COURSE,
};
use ironrally::config::GameConfig;
use ironrally::engine::Game;
use ironrally::protocol::{dispatch, parse_command, Command, Reply};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

struct Options {
    course: String,
    courses_dir: Option<String>,
    config_path: Option<String>,
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let options = match parse_args(env::args().skip(1).collect()) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Usage: ironrally [COURSE] [--courses DIR] [--config FILE] [--seed N]");
            std::process::exit(2);
        }
    };

    let board = match load_board(&options) {
        Ok(board) => board,
        Err(e) => {
            tracing::error!(course = %options.course, error = %e, "cannot load course");
            std::process::exit(1);
        }
    };
    let config = match load_config(options.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "cannot load config");
            std::process::exit(1);
        }
    };

    let mut game = Game::new(Arc::new(board), config, options.seed);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if let Err(e) = run_session(&mut game, stdin.lock(), &mut out) {
        tracing::error!(error = %e, "session aborted");
        std::process::exit(1);
    }
}

fn parse_args(args: Vec<String>) -> Result<Options, String> {
    let mut options = Options {
        course: PRACTICE_COURSE.to_string(),
        courses_dir: None,
        config_path: None,
        seed: 1,
    };
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--courses" => {
                options.courses_dir = Some(iter.next().ok_or("--courses needs a directory")?)
            }
            "--config" => options.config_path = Some(iter.next().ok_or("--config needs a file")?),
            "--seed" => {
                let raw = iter.next().ok_or("--seed needs a number")?;
                options.seed = raw
                    .parse()
                    .map_err(|_| format!("invalid --seed value: {}", raw))?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown argument: {}", flag)),
            course => options.course = course.to_string(),
        }
    }
    Ok(options)
}

fn load_board(options: &Options) -> Result<Board, BoardError> {
    let path = Path::new(&options.course);
    if path.is_file() {
        return Board::load(path);
    }
    match &options.courses_dir {
        Some(dir) => JsonCourseDir::new(dir).load_course(&options.course),
        None => BuiltinCourses.load_course(&options.course),
    }
}

fn load_config(path: Option<&str>) -> Result<GameConfig, String> {
    match path {
        None => Ok(GameConfig::from_env()),
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
            serde_json::from_str(&json).map_err(|e| format!("{}: {}", path, e))
        }
    }
}

fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

/// Runs the command loop until `quit` or end of input.
fn run_session<R: BufRead, W: Write>(game: &mut Game, input: R, out: &mut W) -> io::Result<()> {
    let mut now_ms = 0u64;
    for line in input.lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                write_line(out, &Reply::error(&e))?;
                out.flush()?;
                continue;
            }
        };

        let reply = match command {
            Command::Quit => {
                write_line(out, &Reply::Ok)?;
                break;
            }
            Command::Advance { ms } => {
                now_ms = now_ms.saturating_add(ms);
                game.tick(now_ms);
                Reply::Ok
            }
            command => dispatch(game, command, now_ms).unwrap_or_else(|e| Reply::error(&e)),
        };
        write_line(out, &reply)?;
        for event in game.drain_events() {
            write_line(out, &event)?;
        }
        out.flush()?;
    }
    out.flush()
}
