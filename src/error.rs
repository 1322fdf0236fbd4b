//! Unified error types for the TDS monitor firmware.
//!
//! The measurement pipeline has exactly one failure mode of its own
//! ([`Error::InvalidTemperature`]); everything else comes from the emission
//! side and is carried as a [`TransportError`].  All variants are `Copy` so
//! they can be logged, counted and handed to the event sink without
//! allocation.  None of them is fatal: the main loop always proceeds to the
//! next cycle.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Temperature compensation coefficient would be zero or negative
    /// (temperature at or below -25 °C, or not a finite number).
    InvalidTemperature(f32),
    /// A measurement could not be delivered to its sink.
    Transport(TransportError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTemperature(t) => {
                write!(f, "invalid temperature {t} °C (compensation undefined)")
            }
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Why a measurement did not reach its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No network connectivity.  The sink has requested a reconnect.
    NetworkUnavailable,
    /// The server answered with a status outside 2xx.
    Status(u16),
    /// Connection-level failure before any status was received
    /// (refused, reset, timed out, DNS).
    Connection,
    /// The measurement could not be encoded for the wire.
    Encode,
    /// Writing to a local stream (serial console) failed.
    Io,
    /// The background upload queue is full; the measurement was dropped.
    QueueFull,
}

impl TransportError {
    /// Failures after which the network sink asks for a reconnect.
    pub fn wants_reconnect(self) -> bool {
        match self {
            Self::NetworkUnavailable | Self::Connection => true,
            Self::Status(code) => code >= 400,
            Self::Encode | Self::Io | Self::QueueFull => false,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnavailable => write!(f, "network unavailable"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Connection => write!(f, "connection failed"),
            Self::Encode => write!(f, "payload encoding failed"),
            Self::Io => write!(f, "stream write failed"),
            Self::QueueFull => write!(f, "upload queue full"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
