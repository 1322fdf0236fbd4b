//! Sensor drivers: the analog TDS probe and the optional water-temperature
//! thermistor.  Both share ADC1.

pub mod tds;
pub mod temperature;
