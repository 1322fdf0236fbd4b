//! Raw ADC code → voltage → temperature-compensated EC → TDS (ppm).
//!
//! The cubic is the gravity-style analog TDS probe calibration curve.  Its
//! coefficients belong to the sensor model and are not configuration; the
//! reference voltage, ADC divisor, temperature and K factor are.
//!
//! ```text
//! voltage     = raw · V_ref / ADC_MAX_CODE
//! coefficient = 1 + 0.02 · (T − 25)
//! v           = voltage / coefficient
//! ec          = (133.42·v³ − 255.86·v² + 857.39·v) / 1000
//! tds         = max(ec · K · 1000, 0)
//! ```

use crate::error::{Error, Result};

/// Reference temperature of the calibration curve (°C).
pub const REFERENCE_TEMPERATURE_C: f32 = 25.0;
/// Conductivity change per °C relative to the reference.
pub const TEMPERATURE_SLOPE: f32 = 0.02;
/// Temperatures within this distance of -25 °C (and below) are rejected.
pub const TEMPERATURE_EPSILON_C: f32 = 0.01;

const EC_A3: f32 = 133.42;
const EC_A2: f32 = 255.86;
const EC_A1: f32 = 857.39;

/// Calibration state of one probe.  Only `temperature_c` changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub reference_voltage: f32,
    pub adc_max_code: u16,
    pub temperature_c: f32,
    pub k_factor: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            reference_voltage: 3.3,
            adc_max_code: 4095,
            temperature_c: REFERENCE_TEMPERATURE_C,
            k_factor: 0.5,
        }
    }
}

/// Result of one conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub voltage: f32,
    pub tds_ppm: f32,
}

impl Calibration {
    /// Convert a (possibly fractional) median code.
    pub fn convert(&self, raw: f32) -> Result<Conversion> {
        let voltage = raw_to_voltage(raw, self.reference_voltage, self.adc_max_code);
        let tds_ppm = tds_from_voltage(voltage, self.temperature_c, self.k_factor)?;
        Ok(Conversion { voltage, tds_ppm })
    }

    /// Replace the compensation temperature.  The previous value is kept
    /// when `temperature_c` is rejected.
    pub fn set_temperature(&mut self, temperature_c: f32) -> Result<()> {
        compensation_coefficient(temperature_c)?;
        self.temperature_c = temperature_c;
        Ok(())
    }
}

/// `raw · V_ref / ADC_MAX_CODE`.
pub fn raw_to_voltage(raw: f32, reference_voltage: f32, adc_max_code: u16) -> f32 {
    raw * reference_voltage / f32::from(adc_max_code)
}

/// `1 + 0.02 · (T − 25)`, or [`Error::InvalidTemperature`] when the
/// coefficient would not be safely positive.
pub fn compensation_coefficient(temperature_c: f32) -> Result<f32> {
    if !temperature_c.is_finite() || temperature_c <= -25.0 + TEMPERATURE_EPSILON_C {
        return Err(Error::InvalidTemperature(temperature_c));
    }
    Ok(1.0 + TEMPERATURE_SLOPE * (temperature_c - REFERENCE_TEMPERATURE_C))
}

/// Unclamped EC (mS/cm) for a compensated voltage.
pub fn ec_from_compensated(v: f32) -> f32 {
    (EC_A3 * v * v * v - EC_A2 * v * v + EC_A1 * v) / 1000.0
}

/// TDS (ppm) for a probe voltage at `temperature_c`, floored at zero.
pub fn tds_from_voltage(voltage: f32, temperature_c: f32, k_factor: f32) -> Result<f32> {
    let compensated = voltage / compensation_coefficient(temperature_c)?;
    let tds = ec_from_compensated(compensated) * k_factor * 1000.0;
    Ok(tds.max(0.0))
}
