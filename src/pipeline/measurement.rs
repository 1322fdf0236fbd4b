//! The value handed from the pipeline to a sink.

use chrono::{DateTime, Utc};

use super::DeviceIdString;

/// One emitted TDS reading.  Not retained after the sink returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub device_id: DeviceIdString,
    pub tds_ppm: f32,
    pub voltage: f32,
    /// Wall-clock time of the reading, when the clock is synchronised and
    /// timestamps are enabled.
    pub timestamp: Option<DateTime<Utc>>,
}
