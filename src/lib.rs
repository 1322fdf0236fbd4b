//! TDS monitor firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! adapters used by the ESP-IDF binary.  All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod pins;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;
