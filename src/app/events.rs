//! Outbound application events.
//!
//! The [`PipelineState`](super::service::PipelineState) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  The log adapter turns
//! them into console lines.

use crate::diagnostics::PipelineStats;
use crate::error::TransportError;

use super::ports::Delivered;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The pipeline has started.
    Started {
        window_size: usize,
        sample_period_ms: u64,
        emit_period_ms: u64,
    },

    /// A measurement left the device.
    Emitted {
        tds_ppm: f32,
        voltage: f32,
        delivered: Delivered,
    },

    /// A measurement was computed but the sink rejected it.
    EmitFailed {
        tds_ppm: f32,
        error: TransportError,
    },

    /// The conversion refused the current temperature.
    ConversionRejected { temperature_c: f32 },

    /// Emission skipped because the window is not yet filled.
    WarmingUp { filled: usize, window_size: usize },

    /// The compensation temperature changed.
    TemperatureChanged { temperature_c: f32 },

    /// Periodic runtime counters.
    Stats(PipelineStats),
}
