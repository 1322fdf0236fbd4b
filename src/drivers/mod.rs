//! Peripheral drivers: the shared ADC unit, the task watchdog and
//! core-pinned thread spawning.

pub mod adc;
pub mod task_pin;
pub mod watchdog;
