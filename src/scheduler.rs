//! Non-blocking interval timers for the cooperative main loop.
//!
//! The loop never sleeps on behalf of a task.  Each periodic activity owns
//! an [`IntervalTimer`] and asks it whether it is due against the current
//! uptime; the timer re-arms itself when it answers yes.
//!
//! ```text
//!  loop {
//!      now = uptime_ms()
//!      if sample_timer.due(now) { sample }          // 40 ms
//!      if emit_timer.due(now)   { filter · emit }   // 1 s
//!      network housekeeping
//!  }
//! ```

/// A periodic deadline measured in milliseconds of uptime.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    period_ms: u64,
    last_ms: u64,
}

impl IntervalTimer {
    /// A timer whose first deadline is `period_ms` after `start_ms`.
    pub fn new(period_ms: u32, start_ms: u64) -> Self {
        Self {
            period_ms: u64::from(period_ms.max(1)),
            last_ms: start_ms,
        }
    }

    /// `true` when at least one period has elapsed since the last firing.
    /// Re-arms from `now_ms`, so a stalled loop fires once rather than
    /// replaying every missed period.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Milliseconds until the next deadline (0 when already due).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.last_ms + self.period_ms).saturating_sub(now_ms)
    }

    /// Restart the period from `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}

/// Seconds-granularity counter for low-rate housekeeping (stats reports).
#[derive(Debug, Clone, Copy)]
pub struct SlowTicker {
    timer: Option<IntervalTimer>,
}

impl SlowTicker {
    /// `interval_secs == 0` disables the ticker.
    pub fn new(interval_secs: u32, start_ms: u64) -> Self {
        let timer = (interval_secs > 0)
            .then(|| IntervalTimer::new(interval_secs.saturating_mul(1000), start_ms));
        Self { timer }
    }

    pub fn due(&mut self, now_ms: u64) -> bool {
        self.timer.as_mut().is_some_and(|t| t.due(now_ms))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
