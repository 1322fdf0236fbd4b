//! Mock adapters for integration tests.
//!
//! A scripted probe, a hand-advanced clock, recording sinks and an event
//! log, so tests can assert on full histories without real peripherals.

#![allow(dead_code)]

use std::cell::Cell;

use chrono::{DateTime, Utc};

use tdsmon::app::events::AppEvent;
use tdsmon::app::ports::{ClockPort, Delivered, EventSink, MeasurementSink, SensorPort};
use tdsmon::error::TransportError;
use tdsmon::pipeline::Measurement;

// ── MockProbe ─────────────────────────────────────────────────

/// Replays `codes` cyclically and reports `temperature` when asked.
pub struct MockProbe {
    codes: Vec<u16>,
    next: usize,
    pub temperature: Option<f32>,
    pub samples_taken: usize,
}

impl MockProbe {
    pub fn constant(code: u16) -> Self {
        Self::cycle(vec![code])
    }

    pub fn cycle(codes: Vec<u16>) -> Self {
        Self {
            codes,
            next: 0,
            temperature: None,
            samples_taken: 0,
        }
    }
}

impl SensorPort for MockProbe {
    fn sample_tds(&mut self) -> u16 {
        let code = self.codes[self.next % self.codes.len()];
        self.next += 1;
        self.samples_taken += 1;
        code
    }

    fn read_temperature(&mut self) -> Option<f32> {
        self.temperature
    }
}

// ── ManualClock ───────────────────────────────────────────────

pub struct ManualClock {
    now_ms: Cell<u64>,
    pub wall: Option<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
            wall: None,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl ClockPort for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn utc_now(&self) -> Option<DateTime<Utc>> {
        self.wall
    }
}

// ── Sinks ─────────────────────────────────────────────────────

/// Accepts everything and keeps a copy.
#[derive(Default)]
pub struct RecordingSink {
    pub received: Vec<Measurement>,
}

impl MeasurementSink for RecordingSink {
    fn submit(&mut self, m: &Measurement) -> Result<Delivered, TransportError> {
        self.received.push(m.clone());
        Ok(Delivered::Written)
    }
}

/// Fails the first `failures` submissions with `error`, then accepts.
pub struct FlakySink {
    pub failures: usize,
    pub error: TransportError,
    pub attempts: usize,
    pub accepted: Vec<Measurement>,
}

impl FlakySink {
    pub fn new(failures: usize, error: TransportError) -> Self {
        Self {
            failures,
            error,
            attempts: 0,
            accepted: Vec::new(),
        }
    }
}

impl MeasurementSink for FlakySink {
    fn submit(&mut self, m: &Measurement) -> Result<Delivered, TransportError> {
        self.attempts += 1;
        if self.attempts <= self.failures {
            return Err(self.error);
        }
        self.accepted.push(m.clone());
        Ok(Delivered::Http(200))
    }

    fn reconnect_attempts(&self) -> u32 {
        if self.error.wants_reconnect() {
            self.failures.min(self.attempts) as u32
        } else {
            0
        }
    }
}

// ── EventLog ──────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

impl EventLog {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
