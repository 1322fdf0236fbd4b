//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production).  Every line starts with a short
//! subsystem tag so console output can be grepped.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Delivered, EventSink};
use crate::error::TransportError;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                window_size,
                sample_period_ms,
                emit_period_ms,
            } => {
                info!(
                    "START | window={} sample={}ms emit={}ms",
                    window_size, sample_period_ms, emit_period_ms
                );
            }
            AppEvent::Emitted {
                tds_ppm,
                voltage,
                delivered,
            } => match delivered {
                Delivered::Written => debug!("EMIT | serial {:.1}ppm {:.2}V", tds_ppm, voltage),
                Delivered::Http(status) => {
                    info!("EMIT | TDS={:.1}ppm V={:.2}V -> HTTP {}", tds_ppm, voltage, status)
                }
                Delivered::Queued => debug!("EMIT | queued {:.1}ppm {:.2}V", tds_ppm, voltage),
            },
            AppEvent::EmitFailed { tds_ppm, error } => match error {
                TransportError::NetworkUnavailable => {
                    warn!("NET | offline, dropped {:.1}ppm", tds_ppm)
                }
                other => warn!("EMIT | failed ({}), dropped {:.1}ppm", other, tds_ppm),
            },
            AppEvent::ConversionRejected { temperature_c } => {
                warn!("TDS | conversion rejected at {:.2}\u{00b0}C", temperature_c);
            }
            AppEvent::WarmingUp {
                filled,
                window_size,
            } => {
                info!("TDS | warming up {}/{}", filled, window_size);
            }
            AppEvent::TemperatureChanged { temperature_c } => {
                info!("TDS | compensation T={:.1}\u{00b0}C", temperature_c);
            }
            AppEvent::Stats(s) => {
                info!(
                    "STATS | samples={} delivered={} failed={} (offline={} queue={}) \
                     queued={} rejected={} warmup={} reconnects={} ratio={:.2}",
                    s.samples,
                    s.delivered_total(),
                    s.failed_total(),
                    s.network_unavailable,
                    s.queue_drops,
                    s.queued,
                    s.rejected,
                    s.warmup_skips,
                    s.reconnects,
                    s.delivery_ratio(),
                );
            }
        }
    }
}
