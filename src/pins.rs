//! GPIO / ADC channel assignments for the TDS monitor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Analog TDS probe
// ---------------------------------------------------------------------------

/// Analog TDS probe signal.  ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const TDS_ADC_GPIO: i32 = 4;
/// ADC1 channel index of [`TDS_ADC_GPIO`].
pub const TDS_ADC_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Water temperature (optional NTC thermistor, 10 kΩ @ 25 °C)
// ---------------------------------------------------------------------------

/// Thermistor divider midpoint.  ADC1 channel 5 (GPIO 6 on ESP32-S3).
pub const TEMP_ADC_GPIO: i32 = 6;
/// ADC1 channel index of [`TEMP_ADC_GPIO`].
pub const TEMP_ADC_CHANNEL: u32 = 5;

// ---------------------------------------------------------------------------
// UART console (CSV output)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
pub const UART_BAUD: u32 = 115_200;
