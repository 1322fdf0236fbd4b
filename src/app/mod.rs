//! Application core: pure domain logic, zero I/O.
//!
//! Sampling cadence, warm-up, filtering and emission bookkeeping live here.
//! All interaction with hardware, clocks and networks happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
