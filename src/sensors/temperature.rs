//! NTC thermistor water-temperature probe (10 kOhm @ 25 C, B = 3950).
//!
//! Wired in a voltage divider with a fixed 10 kOhm resistor.  The simplified
//! Beta equation converts resistance to temperature.  Readings outside the
//! plausible water range are reported as `None` so a disconnected or
//! shorted probe never feeds garbage into temperature compensation.
//!
//! On ESP-IDF: ADC1 via the oneshot API.  On host: a static atomic.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::adc;

static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(raw: u16) {
    SIM_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;

/// Liquid-water range accepted from the probe.
pub const MIN_PLAUSIBLE_C: f32 = 0.0;
pub const MAX_PLAUSIBLE_C: f32 = 60.0;

pub struct Thermistor {
    channel: u32,
}

impl Thermistor {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }

    /// Water temperature in °C, or `None` when the probe is absent or the
    /// value is implausible.
    pub fn read_celsius(&self) -> Option<f32> {
        adc_to_celsius(self.read_adc())
            .filter(|t| (MIN_PLAUSIBLE_C..=MAX_PLAUSIBLE_C).contains(t))
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        adc::read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.channel;
        SIM_TEMP_ADC.load(Ordering::Relaxed)
    }
}

fn adc_to_celsius(raw: u16) -> Option<f32> {
    let voltage = (raw as f32 / ADC_MAX) * V_REF;
    // Rails mean open or shorted divider.
    if voltage <= 0.01 || voltage >= (V_REF - 0.01) {
        return None;
    }
    let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return None;
    }
    Some((1.0 / inv_t) - 273.15)
}
