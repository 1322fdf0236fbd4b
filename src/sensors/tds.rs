//! Analog TDS probe (gravity-style conductivity board, 0–2.3 V output).
//!
//! The probe board does its own excitation and rectification; firmware only
//! sees a DC level proportional to conductivity.  Each call to
//! [`TdsProbe::read_raw`] performs a single one-shot conversion; filtering
//! is the pipeline's job, not the driver's.
//!
//! On ESP-IDF the reading comes from ADC1 (configured by
//! [`drivers::adc::init`](crate::drivers::adc::init)).  On host builds it
//! comes from a static atomic that tests inject into.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::adc;

static SIM_TDS_ADC: AtomicU16 = AtomicU16::new(0);

/// Inject the raw code the next host-side reads will return.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_tds_adc(raw: u16) {
    SIM_TDS_ADC.store(raw, Ordering::Relaxed);
}

pub struct TdsProbe {
    channel: u32,
}

impl TdsProbe {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }

    /// One raw conversion, passed through as the ADC reported it.
    pub fn read_raw(&self) -> u16 {
        self.read_adc()
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        adc::read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_TDS_ADC.load(Ordering::Relaxed)
    }
}
