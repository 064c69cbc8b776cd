//! Integration tests for the ironrally binary.
//!
//! Spawns the CLI, feeds it JSON-lines commands on stdin, and checks the
//! replies and events it writes to stdout.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use serde_json::Value;

/// Sends a sequence of commands and collects stdout lines as JSON.
fn run_session(args: &[&str], commands: &[&str]) -> (bool, Vec<Value>) {
    let exe = env!("CARGO_BIN_EXE_ironrally");
    let mut child = Command::new(exe)
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("IRONRALLY_TIMER")
        .env_remove("IRONRALLY_TIMER_MS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start ironrally");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        // The process may already have exited after a quit.
        let _ = writeln!(stdin, "{}", cmd);
    }
    let _ = stdin.flush();
    drop(stdin);

    let lines: Vec<Value> = reader
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).expect("stdout line is not JSON"))
        .collect();
    let status = child.wait().expect("failed to wait on child");
    (status.success(), lines)
}

fn replies(lines: &[Value]) -> Vec<&Value> {
    lines.iter().filter(|l| l.get("reply").is_some()).collect()
}

fn events<'a>(lines: &'a [Value], name: &str) -> Vec<&'a Value> {
    lines.iter().filter(|l| l["event"] == name).collect()
}

#[test]
fn join_start_and_inspect() {
    let (ok, lines) = run_session(
        &["--seed", "3"],
        &[
            r#"{"cmd":"join","name":"alice"}"#,
            r#"{"cmd":"join","name":"bob"}"#,
            r#"{"cmd":"start"}"#,
            r#"{"cmd":"state"}"#,
            r#"{"cmd":"quit"}"#,
        ],
    );
    assert!(ok);
    let replies = replies(&lines);
    assert_eq!(replies.len(), 5);
    assert_eq!(replies[0]["reply"], "joined");
    assert_eq!(replies[1]["robot"], 1);
    assert_eq!(replies[2]["reply"], "ok");

    let state = replies[3];
    assert_eq!(state["reply"], "state");
    assert_eq!(state["board"], "practice");
    assert_eq!(state["turn"], 1);
    assert_eq!(state["phase"]["phase"], "programming");
    assert_eq!(state["robots"].as_array().unwrap().len(), 2);
    assert_eq!(state["robots"][0]["hand"].as_array().unwrap().len(), 9);

    assert_eq!(events(&lines, "turn_started").len(), 1);
    assert_eq!(events(&lines, "cards_dealt").len(), 2);
}

#[test]
fn malformed_and_rejected_commands_report_errors() {
    let (ok, lines) = run_session(
        &[],
        &[
            "not json at all",
            r#"{"cmd":"start"}"#,
            r#"{"cmd":"program","robot":0,"cards":[null,null,null,null,null]}"#,
            r#"{"cmd":"quit"}"#,
        ],
    );
    assert!(ok);
    let replies = replies(&lines);
    assert_eq!(replies.len(), 4);
    assert!(replies[..3].iter().all(|r| r["reply"] == "error"));
    assert!(replies[0]["message"]
        .as_str()
        .unwrap()
        .starts_with("malformed command"));
    assert_eq!(
        replies[1]["message"],
        "at least one robot is needed to start"
    );
    assert_eq!(replies[3]["reply"], "ok");
}

#[test]
fn blank_lines_are_ignored() {
    let (ok, lines) = run_session(&[], &["", "   ", r#"{"cmd":"quit"}"#]);
    assert!(ok);
    assert_eq!(lines.len(), 1);
}

#[test]
fn eof_exits_cleanly() {
    let (ok, lines) = run_session(&[], &[r#"{"cmd":"join","name":"a"}"#]);
    assert!(ok);
    assert_eq!(lines.len(), 1);
}

#[test]
fn nothing_runs_after_quit() {
    let (ok, lines) = run_session(
        &[],
        &[r#"{"cmd":"quit"}"#, r#"{"cmd":"join","name":"late"}"#],
    );
    assert!(ok);
    assert_eq!(lines.len(), 1);
}

#[test]
fn advancing_the_clock_expires_the_timer() {
    let (ok, lines) = run_session(
        &["--seed", "9"],
        &[
            r#"{"cmd":"join","name":"a"}"#,
            r#"{"cmd":"join","name":"b"}"#,
            r#"{"cmd":"start"}"#,
            r#"{"cmd":"program","robot":0,"cards":[null,null,null,null,null]}"#,
            r#"{"cmd":"advance","ms":10000}"#,
            r#"{"cmd":"advance","ms":25000}"#,
            r#"{"cmd":"quit"}"#,
        ],
    );
    assert!(ok);
    assert_eq!(events(&lines, "timer_started").len(), 1);
    assert_eq!(events(&lines, "timer_expired").len(), 1);
    let auto: Vec<&Value> = events(&lines, "program_submitted")
        .into_iter()
        .filter(|e| e["auto"] == true)
        .collect();
    assert_eq!(auto.len(), 1);
    assert_eq!(auto[0]["robot"], 1);
    assert!(!events(&lines, "card_executed").is_empty());
}

#[test]
fn unknown_course_fails_to_start() {
    let (ok, lines) = run_session(&["no_such_course"], &[r#"{"cmd":"quit"}"#]);
    assert!(!ok);
    assert!(lines.is_empty());
}
