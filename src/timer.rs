//! Programming-phase auto-submit timer.
//!
//! The policy decides when the countdown starts; the countdown itself is a
//! deadline polled against the injected clock. The engine fills empty
//! registers when `poll` reports expiry.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TIMER_MS;
use crate::event::GameEvent;

/// Condition that starts the countdown, counted over active robots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTrigger {
    /// Start once at most N active robots are still unsubmitted.
    Unsubmitted(usize),
    /// Start once at least N active robots have submitted.
    Submitted(usize),
}

impl TimerTrigger {
    /// Returns true if the countdown should start. Never starts when nobody is
    /// left to wait for.
    pub fn is_met(self, active: usize, submitted: usize) -> bool {
        let unsubmitted = active.saturating_sub(submitted);
        if unsubmitted == 0 {
            return false;
        }
        match self {
            TimerTrigger::Unsubmitted(n) => unsubmitted <= n,
            TimerTrigger::Submitted(n) => submitted >= n,
        }
    }
}

/// Timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPolicy {
    pub trigger: TimerTrigger,
    pub duration_ms: u64,
}

impl Default for TimerPolicy {
    fn default() -> Self {
        TimerPolicy {
            trigger: TimerTrigger::Unsubmitted(1),
            duration_ms: DEFAULT_TIMER_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    deadline_ms: u64,
    /// Last whole-second value announced.
    announced_secs: u64,
}

/// One cancelable countdown per game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTimer {
    policy: Option<TimerPolicy>,
    running: Option<Countdown>,
}

impl TurnTimer {
    pub fn new(policy: Option<TimerPolicy>) -> Self {
        TurnTimer {
            policy,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Deadline of the running countdown, if any.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.running.map(|c| c.deadline_ms)
    }

    /// Starts the countdown if the policy's trigger is met and it is not
    /// already running. Returns true if it started.
    pub fn maybe_start(
        &mut self,
        now_ms: u64,
        active: usize,
        submitted: usize,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let policy = match self.policy {
            Some(p) => p,
            None => return false,
        };
        if self.running.is_some() || !policy.trigger.is_met(active, submitted) {
            return false;
        }
        self.running = Some(Countdown {
            deadline_ms: now_ms.saturating_add(policy.duration_ms),
            announced_secs: policy.duration_ms.div_ceil(1000),
        });
        tracing::debug!(duration_ms = policy.duration_ms, "programming timer started");
        events.push(GameEvent::TimerStarted {
            duration_ms: policy.duration_ms,
        });
        true
    }

    /// Stops the countdown without firing.
    pub fn cancel(&mut self) {
        self.running = None;
    }

    /// Advances the countdown to `now_ms`, emitting a tick whenever the
    /// remaining whole seconds drop. Returns true exactly once, on expiry.
    pub fn poll(&mut self, now_ms: u64, events: &mut Vec<GameEvent>) -> bool {
        let countdown = match self.running.as_mut() {
            Some(c) => c,
            None => return false,
        };
        if now_ms >= countdown.deadline_ms {
            self.running = None;
            events.push(GameEvent::TimerExpired);
            return true;
        }
        let remaining_secs = (countdown.deadline_ms - now_ms).div_ceil(1000);
        if remaining_secs < countdown.announced_secs {
            countdown.announced_secs = remaining_secs;
            events.push(GameEvent::TimerTick { remaining_secs });
        }
        false
    }
}
