//! Game configuration.
//!
//! `GameConfig` deserializes from JSON with every field optional, and
//! `GameConfig::from_env` layers `IRONRALLY_*` environment overrides on top of
//! the defaults.

use std::env;

use serde::{Deserialize, Serialize};

use crate::timer::{TimerPolicy, TimerTrigger};

pub const DEFAULT_STARTING_LIVES: u8 = 3;
pub const DEFAULT_DECISION_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_TIMER_MS: u64 = 30_000;
pub const DEFAULT_OPTION_HAND_CAP: usize = 3;
pub const DEFAULT_MAX_ROBOTS: usize = 8;

/// Tunables for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_lives: u8,
    /// How long a robot may deliberate over discarding options to prevent damage.
    pub damage_choice_timeout_ms: u64,
    /// How long a destroyed robot may take to pick its respawn facing.
    pub respawn_timeout_ms: u64,
    /// How long a powered-down robot may take to decide whether to stay down.
    pub power_down_timeout_ms: u64,
    /// Maximum capability cards a robot may hold.
    pub option_hand_cap: usize,
    pub max_robots: usize,
    /// Ends the game after this many turns; 0 means unlimited.
    pub max_turns: u32,
    /// Auto-submit countdown policy; `None` disables the timer.
    pub timer: Option<TimerPolicy>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_lives: DEFAULT_STARTING_LIVES,
            damage_choice_timeout_ms: DEFAULT_DECISION_TIMEOUT_MS,
            respawn_timeout_ms: DEFAULT_DECISION_TIMEOUT_MS,
            power_down_timeout_ms: DEFAULT_DECISION_TIMEOUT_MS,
            option_hand_cap: DEFAULT_OPTION_HAND_CAP,
            max_robots: DEFAULT_MAX_ROBOTS,
            max_turns: 0,
            timer: Some(TimerPolicy::default()),
        }
    }
}

impl GameConfig {
    /// Builds a config from defaults plus environment overrides.
    ///
    /// Recognised variables: `IRONRALLY_LIVES`, `IRONRALLY_DAMAGE_TIMEOUT_MS`,
    /// `IRONRALLY_RESPAWN_TIMEOUT_MS`, `IRONRALLY_POWER_DOWN_TIMEOUT_MS`,
    /// `IRONRALLY_OPTION_CAP`, `IRONRALLY_MAX_ROBOTS`, `IRONRALLY_MAX_TURNS`,
    /// `IRONRALLY_TIMER` (`off`, `unsubmitted:N`, `submitted:N`) and
    /// `IRONRALLY_TIMER_MS`.
    pub fn from_env() -> Self {
        let defaults = GameConfig::default();
        let timer = match env::var("IRONRALLY_TIMER") {
            Ok(raw) => match parse_timer_trigger(&raw) {
                Ok(trigger) => trigger.map(|trigger| TimerPolicy {
                    trigger,
                    duration_ms: DEFAULT_TIMER_MS,
                }),
                Err(()) => {
                    tracing::warn!("IRONRALLY_TIMER='{}' not understood, using default", raw);
                    defaults.timer
                }
            },
            Err(_) => defaults.timer,
        }
        .map(|policy| TimerPolicy {
            duration_ms: read_env_u64("IRONRALLY_TIMER_MS", policy.duration_ms),
            ..policy
        });

        GameConfig {
            starting_lives: read_env_u64("IRONRALLY_LIVES", defaults.starting_lives as u64)
                .min(u8::MAX as u64) as u8,
            damage_choice_timeout_ms: read_env_u64(
                "IRONRALLY_DAMAGE_TIMEOUT_MS",
                defaults.damage_choice_timeout_ms,
            ),
            respawn_timeout_ms: read_env_u64(
                "IRONRALLY_RESPAWN_TIMEOUT_MS",
                defaults.respawn_timeout_ms,
            ),
            power_down_timeout_ms: read_env_u64(
                "IRONRALLY_POWER_DOWN_TIMEOUT_MS",
                defaults.power_down_timeout_ms,
            ),
            option_hand_cap: read_env_usize("IRONRALLY_OPTION_CAP", defaults.option_hand_cap),
            max_robots: read_env_usize("IRONRALLY_MAX_ROBOTS", defaults.max_robots),
            max_turns: read_env_u64("IRONRALLY_MAX_TURNS", defaults.max_turns as u64)
                .min(u32::MAX as u64) as u32,
            timer,
        }
    }
}

/// Parses `off`, `unsubmitted:N`, or `submitted:N`.
pub(crate) fn parse_timer_trigger(raw: &str) -> Result<Option<TimerTrigger>, ()> {
    let raw = raw.trim().to_ascii_lowercase();
    if raw == "off" || raw == "none" {
        return Ok(None);
    }
    let (kind, count) = raw.split_once(':').ok_or(())?;
    let count: usize = count.trim().parse().map_err(|_| ())?;
    match kind.trim() {
        "unsubmitted" => Ok(Some(TimerTrigger::Unsubmitted(count))),
        "submitted" => Ok(Some(TimerTrigger::Submitted(count))),
        _ => Err(()),
    }
}

fn read_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
