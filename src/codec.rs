//! Wire formats for emitted measurements.
//!
//! * **Serial CSV**: `device_id,<tds 1 dp>,<voltage 2 dp>,` plus newline.
//!   The trailing field is the receiver's optional timestamp column and is
//!   always left empty; the receiver stamps arrival time itself.
//! * **HTTP JSON**: `{"device_id","device_ip","tds","voltage"[,"timestamp"]}`.
//!
//! Both directions are here: the firmware only encodes, but the parsers
//! document (and test) exactly what the ingest side accepts.

use core::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::Measurement;

/// Longest CSV line the firmware emits (32-byte id plus two numbers).
pub const MAX_CSV_LINE: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Line did not fit the output buffer.
    Overflow,
    /// CSV line with fewer than two fields.
    TooFewFields,
    /// A numeric field failed to parse.
    InvalidNumber(&'static str),
    /// JSON payload without a usable `device_id`.
    MissingDeviceId,
    /// JSON payload that is not an object with a numeric `tds`.
    Malformed,
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Overflow => write!(f, "line exceeds {} bytes", MAX_CSV_LINE),
            Self::TooFewFields => write!(f, "expected at least device_id,tds"),
            Self::InvalidNumber(field) => write!(f, "invalid {} value (must be numeric)", field),
            Self::MissingDeviceId => write!(f, "missing device_id"),
            Self::Malformed => write!(f, "malformed payload or missing tds"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Serial CSV
// ───────────────────────────────────────────────────────────────

/// Format one measurement as a newline-terminated CSV line.
pub fn format_csv_line(m: &Measurement) -> Result<heapless::String<MAX_CSV_LINE>, CodecError> {
    let mut line = heapless::String::new();
    writeln!(line, "{},{:.1},{:.2},", m.device_id, m.tds_ppm, m.voltage)
        .map_err(|_| CodecError::Overflow)?;
    Ok(line)
}

/// One line as the serial ingest side understands it.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub device_id: String,
    pub tds: f32,
    pub voltage: Option<f32>,
    pub timestamp: Option<String>,
}

impl CsvRecord {
    /// Parse `device_id,tds[,voltage[,timestamp]]`.  Fields are trimmed and
    /// empty optional fields read as absent.  Extra fields are ignored.
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        let mut parts = line.trim_end_matches(['\r', '\n']).split(',').map(str::trim);

        let device_id = parts.next().ok_or(CodecError::TooFewFields)?;
        if device_id.is_empty() {
            return Err(CodecError::MissingDeviceId);
        }
        let tds = parts.next().ok_or(CodecError::TooFewFields)?;
        let tds = tds
            .parse::<f32>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or(CodecError::InvalidNumber("tds"))?;

        let voltage = match parts.next().filter(|s| !s.is_empty()) {
            Some(v) => Some(
                v.parse::<f32>()
                    .map_err(|_| CodecError::InvalidNumber("voltage"))?,
            ),
            None => None,
        };
        let timestamp = parts.next().filter(|s| !s.is_empty()).map(String::from);

        Ok(Self {
            device_id: device_id.into(),
            tds,
            voltage,
            timestamp,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// HTTP JSON
// ───────────────────────────────────────────────────────────────

/// Body of `POST /api/tds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdsPayload {
    pub device_id: String,
    #[serde(default)]
    pub device_ip: String,
    pub tds: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TdsPayload {
    pub fn from_measurement(m: &Measurement, device_ip: &str) -> Self {
        Self {
            device_id: m.device_id.as_str().into(),
            device_ip: device_ip.into(),
            tds: m.tds_ppm,
            voltage: Some(m.voltage),
            timestamp: m.timestamp.as_ref().map(format_timestamp),
        }
    }

    /// Reject what the receiver would answer with 400.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.device_id.is_empty() {
            return Err(CodecError::MissingDeviceId);
        }
        if !self.tds.is_finite() {
            return Err(CodecError::InvalidNumber("tds"));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        self.validate()?;
        serde_json::to_vec(self).map_err(|_| CodecError::Malformed)
    }

    /// Parse and validate a request body.
    pub fn from_json(body: &[u8]) -> Result<Self, CodecError> {
        let payload: Self = serde_json::from_slice(body).map_err(|e| {
            if e.to_string().contains("device_id") {
                CodecError::MissingDeviceId
            } else {
                CodecError::Malformed
            }
        })?;
        payload.validate()?;
        Ok(payload)
    }
}

/// RFC 3339, UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
