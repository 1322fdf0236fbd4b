//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PipelineState (domain)
//! ```
//!
//! Driven adapters (ADC, clock, measurement sinks, event sinks, config
//! storage) implement these traits.  The
//! [`PipelineState`](super::service::PipelineState) consumes them via
//! generics, so the domain core never touches hardware or sockets directly.

use chrono::{DateTime, Utc};

use crate::config::SystemConfig;
use crate::error::TransportError;
use crate::pipeline::Measurement;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain raw sensor data.
pub trait SensorPort {
    /// One raw TDS probe ADC code.  Not range-checked.
    fn sample_tds(&mut self) -> u16;

    /// Water temperature in °C from the temperature collaborator, or
    /// `None` when no probe is wired or the reading is implausible.
    fn read_temperature(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;

    /// Wall-clock time, `None` until synchronised.
    fn utc_now(&self) -> Option<DateTime<Utc>>;
}

// ───────────────────────────────────────────────────────────────
// Measurement sink port (driven adapter: domain → serial / network)
// ───────────────────────────────────────────────────────────────

/// How a measurement left the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivered {
    /// Line written to a local stream.
    Written,
    /// Server answered with this 2xx status.
    Http(u16),
    /// Handed to the background uploader.
    Queued,
}

/// Outcomes of deliveries that finished after `submit` had returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredOutcomes {
    pub uploaded: u32,
    pub failed: u32,
}

/// Capability the pipeline hands each measurement to.
///
/// Implementations own their wire format.  A failure affects only the
/// current measurement; the pipeline never retries it.
pub trait MeasurementSink {
    fn submit(&mut self, measurement: &Measurement) -> Result<Delivered, TransportError>;

    /// Reconnects this sink has requested since boot (network sinks only).
    fn reconnect_attempts(&self) -> u32 {
        0
    }

    /// Running totals for sinks that answer `Delivered::Queued` and finish
    /// the delivery elsewhere.  Synchronous sinks report `None`.
    fn deferred_outcomes(&self) -> Option<DeferredOutcomes> {
        None
    }
}

impl<T: MeasurementSink + ?Sized> MeasurementSink for Box<T> {
    fn submit(&mut self, measurement: &Measurement) -> Result<Delivered, TransportError> {
        (**self).submit(measurement)
    }

    fn reconnect_attempts(&self) -> u32 {
        (**self).reconnect_attempts()
    }

    fn deferred_outcomes(&self) -> Option<DeferredOutcomes> {
        (**self).deferred_outcomes()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting and
/// after loading; invalid ranges are rejected with
/// [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
