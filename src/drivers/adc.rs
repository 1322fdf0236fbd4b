//! One-shot ADC1 unit shared by the TDS probe and the thermistor.
//!
//! Configured once from `main()` before the loop starts, using raw ESP-IDF
//! sys calls.  On host builds [`init`] is a no-op and [`read`] returns 0;
//! the sensor drivers substitute injectable simulation values instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

/// Largest code the 12-bit oneshot unit can return.
pub const MAX_READING: u16 = 4095;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcInitError {
    UnitInitFailed(i32),
    ChannelConfigFailed { channel: u32, rc: i32 },
}

impl core::fmt::Display for AdcInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnitInitFailed(rc) => write!(f, "ADC1 unit init failed (rc={})", rc),
            Self::ChannelConfigFailed { channel, rc } => {
                write!(f, "ADC1 channel {} config failed (rc={})", channel, rc)
            }
        }
    }
}

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: callers must be on the init path or the main loop; the handle
/// is written once by `init()` before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
pub fn init() -> Result<(), AdcInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(AdcInitError::UnitInitFailed(ret));
    }

    // 12 dB attenuation covers the probe's 0–2.3 V output.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for channel in [pins::TDS_ADC_CHANNEL, pins::TEMP_ADC_CHANNEL] {
        let rc = unsafe { adc_oneshot_config_channel(handle(), channel, &chan_cfg) };
        if rc != ESP_OK as i32 {
            return Err(AdcInitError::ChannelConfigFailed { channel, rc });
        }
    }

    info!(
        "adc: ADC1 configured (CH{}=TDS, CH{}=temp)",
        pins::TDS_ADC_CHANNEL,
        pins::TEMP_ADC_CHANNEL
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init() -> Result<(), AdcInitError> {
    log::info!("adc(sim): init skipped");
    Ok(())
}

/// Raw 12-bit code, 0 on read failure.
#[cfg(target_os = "espidf")]
pub fn read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn read(_channel: u32) -> u16 {
    0
}
