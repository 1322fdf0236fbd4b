//! Measurement pipeline: sample window, median filter, TDS conversion.
//!
//! Pure arithmetic with no I/O.  [`app::service`](crate::app::service)
//! drives it on a timer and hands the result to a sink.
//!
//! ```text
//!  ADC ──▶ SampleWindow ──snapshot──▶ median ──▶ Calibration::convert ──▶ Measurement
//! ```

pub mod converter;
pub mod measurement;
pub mod median;
pub mod window;

pub use converter::{Calibration, Conversion};
pub use measurement::Measurement;
pub use window::SampleWindow;

/// Bounded device identifier carried by every measurement.
pub type DeviceIdString = heapless::String<32>;

/// Median of a private copy of the window, converted with `cal`.
pub fn filter_and_convert(
    window: &SampleWindow,
    cal: &Calibration,
) -> crate::error::Result<Conversion> {
    let mut copy = window.snapshot();
    let raw = median::median_in_place(&mut copy);
    cal.convert(raw)
}
