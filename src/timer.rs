//! Per-question countdown.
//!
//! The engine owns at most one repeating tick on the [`Clock`]. It never calls
//! back into the game; each command returns a [`TimerSignal`] the controller
//! turns into a render or a time-up.
//!
//! ```text
//! Stopped -> Running -> (Paused by user | Expired) -> Stopped
//! ```

use crate::clock::{Clock, TimerHandle, Wake};
use crate::config::{seconds_for_streak, StreakTier};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerSignal {
    /// Remaining share of the allotted time, 0.0..=1.0
    Progress(f64),
    Expired,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    tiers: Vec<StreakTier>,
    tick_interval_ms: u64,
    seconds_allotted: u32,
    seconds_remaining: u32,
    paused_by_user: bool,
    tick: Option<TimerHandle>,
}

impl TimerEngine {
    pub fn new(tiers: Vec<StreakTier>, tick_interval_ms: u64) -> Self {
        let seconds = seconds_for_streak(&tiers, 0);
        Self {
            tiers,
            tick_interval_ms,
            seconds_allotted: seconds,
            seconds_remaining: seconds,
            paused_by_user: false,
            tick: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn seconds_allotted(&self) -> u32 {
        self.seconds_allotted
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    pub fn is_paused_by_user(&self) -> bool {
        self.paused_by_user
    }

    pub fn fraction_remaining(&self) -> f64 {
        if self.seconds_allotted == 0 {
            return 0.0;
        }
        (self.seconds_remaining as f64 / self.seconds_allotted as f64).clamp(0.0, 1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Starts counting down. With `reset_duration` the allotment is
    /// recomputed from `streak`; otherwise the remaining time carries over.
    pub fn start(&mut self, clock: &mut impl Clock, streak: u32, reset_duration: bool) -> TimerSignal {
        self.stop(clock);
        if reset_duration {
            self.prepare(streak);
        }
        self.arm(clock)
    }

    /// Loads a fresh allotment for `streak` without starting the countdown.
    pub fn prepare(&mut self, streak: u32) {
        self.seconds_allotted = seconds_for_streak(&self.tiers, streak);
        self.seconds_remaining = self.seconds_allotted;
    }

    pub fn stop(&mut self, clock: &mut impl Clock) {
        if let Some(handle) = self.tick.take() {
            clock.cancel(handle);
        }
    }

    pub fn pause(&mut self, clock: &mut impl Clock) {
        self.paused_by_user = true;
        self.stop(clock);
    }

    /// Picks up where a user-pause left off. Returns `None` when there was no
    /// user-pause to resume or the game is no longer being played.
    pub fn resume(&mut self, clock: &mut impl Clock, playing: bool) -> Option<TimerSignal> {
        if !self.paused_by_user || !playing {
            return None;
        }
        self.paused_by_user = false;
        if self.seconds_remaining > 0 {
            Some(self.start(clock, 0, false))
        } else {
            Some(TimerSignal::Expired)
        }
    }

    pub fn clear_pause(&mut self) {
        self.paused_by_user = false;
    }

    /// Handles one [`Wake::Tick`]. A tick arriving while stopped is stale and ignored.
    pub fn tick(&mut self, clock: &mut impl Clock) -> Option<TimerSignal> {
        self.tick?;
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.stop(clock);
            return Some(TimerSignal::Expired);
        }
        Some(TimerSignal::Progress(self.fraction_remaining()))
    }

    fn arm(&mut self, clock: &mut impl Clock) -> TimerSignal {
        if self.seconds_remaining == 0 {
            return TimerSignal::Expired;
        }
        self.tick = Some(clock.schedule_repeating(self.tick_interval_ms, Wake::Tick));
        TimerSignal::Progress(self.fraction_remaining())
    }
}
