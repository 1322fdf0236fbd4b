//! System configuration parameters
//!
//! All tunable parameters for the TDS monitor.
//! Compile-time defaults can be overridden at build time through environment
//! variables (`TDS_DEVICE_ID`, `TDS_WIFI_SSID`, `TDS_WIFI_PASS`,
//! `TDS_SERVER_HOST`) and at runtime through the NVS-backed `ConfigPort`.

use serde::{Deserialize, Serialize};

use crate::drivers::adc;
use crate::pipeline::converter;
use crate::pipeline::window::MAX_WINDOW;

/// Where measurements go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitMode {
    /// One CSV line per measurement on the serial console.
    Serial,
    /// One JSON POST per measurement to the dashboard server.
    Http,
}

impl EmitMode {
    /// Console log threshold once the loop runs.  Serial mode shares UART0
    /// with the CSV stream, so only warnings and errors may interleave with
    /// measurement lines there.
    pub fn log_level(self) -> log::LevelFilter {
        match self {
            Self::Serial => log::LevelFilter::Warn,
            Self::Http => log::LevelFilter::Info,
        }
    }
}

/// What to do while the sample window has not been filled once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarmupPolicy {
    /// Skip emission until `window_size` real samples were taken.
    WaitForFill,
    /// Emit immediately; zero-initialised slots take part in the median.
    ZeroBias,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Device identifier reported with every measurement.  Empty means
    /// "derive from the factory MAC at boot".
    pub device_id: heapless::String<32>,

    // --- Calibration ---
    /// ADC full-scale voltage (V)
    pub reference_voltage: f32,
    /// Divisor applied to the raw code (1023/1024 for 10-bit, 4095 for 12-bit)
    pub adc_max_code: u16,
    /// Water temperature used for compensation until a probe reports one (°C)
    pub temperature_c: f32,
    /// EC → TDS conversion factor
    pub k_factor: f32,
    /// Read the NTC thermistor and feed it into the compensation
    pub temperature_probe: bool,

    // --- Sampling ---
    /// Raw ADC sample interval (milliseconds)
    pub sample_period_ms: u32,
    /// Filter + convert + emit interval (milliseconds)
    pub emit_period_ms: u32,
    /// Median window length N
    pub window_size: u16,
    /// Behaviour before the window has been filled once
    pub warmup: WarmupPolicy,

    // --- Emission ---
    pub emit_mode: EmitMode,
    /// Attach a wall-clock timestamp to JSON payloads when time is synced
    pub include_timestamp: bool,
    /// Hand HTTP uploads to a background worker instead of blocking the loop
    pub background_upload: bool,

    // --- Network ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    pub server_host: heapless::String<64>,
    pub server_port: u16,
    pub endpoint_path: heapless::String<64>,
    /// Upper bound for one Wi-Fi association attempt (milliseconds)
    pub wifi_connect_timeout_ms: u32,

    // --- Diagnostics ---
    /// Runtime counter report interval (seconds, 0 = never)
    pub stats_interval_secs: u32,
}

fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    heapless::String::try_from(s).unwrap_or_default()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_id: bounded(option_env!("TDS_DEVICE_ID").unwrap_or("")),

            // Calibration
            reference_voltage: 3.3,
            adc_max_code: 4095, // ESP32-S3 oneshot ADC, 12 bit
            temperature_c: 25.0,
            k_factor: 0.5,
            temperature_probe: false,

            // Sampling
            sample_period_ms: 40, // 25 Hz
            emit_period_ms: 1000, // 1 Hz
            window_size: 30,
            warmup: WarmupPolicy::WaitForFill,

            // Emission
            emit_mode: EmitMode::Http,
            include_timestamp: false,
            background_upload: true,

            // Network
            wifi_ssid: bounded(option_env!("TDS_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("TDS_WIFI_PASS").unwrap_or("")),
            server_host: bounded(option_env!("TDS_SERVER_HOST").unwrap_or("192.168.1.100")),
            server_port: 5000,
            endpoint_path: bounded("/api/tds"),
            wifi_connect_timeout_ms: 20_000,

            // Diagnostics
            stats_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.5..=6.0).contains(&self.reference_voltage) {
            return Err("reference_voltage must be 0.5–6.0 V");
        }
        if self.adc_max_code < 255 {
            return Err("adc_max_code must be at least 255");
        }
        if self.adc_max_code > adc::MAX_READING {
            return Err("adc_max_code exceeds the 12-bit ADC range");
        }
        if converter::compensation_coefficient(self.temperature_c).is_err() {
            return Err("temperature_c must be above -25 °C");
        }
        if !(self.k_factor > 0.0 && self.k_factor <= 1.0) {
            return Err("k_factor must be in (0, 1]");
        }
        if !(1..=10_000).contains(&self.sample_period_ms) {
            return Err("sample_period_ms must be 1–10000");
        }
        if self.emit_period_ms < self.sample_period_ms {
            return Err("emit_period_ms must not be shorter than sample_period_ms");
        }
        if self.window_size == 0 || self.window_size as usize > MAX_WINDOW {
            return Err("window_size must be 1–64");
        }
        if self.emit_mode == EmitMode::Http {
            if self.wifi_ssid.is_empty() {
                return Err("wifi_ssid is required in HTTP mode");
            }
            if self.server_host.is_empty() || self.server_port == 0 {
                return Err("server_host and server_port are required in HTTP mode");
            }
            if !self.endpoint_path.starts_with('/') {
                return Err("endpoint_path must start with '/'");
            }
            if !(1_000..=120_000).contains(&self.wifi_connect_timeout_ms) {
                return Err("wifi_connect_timeout_ms must be 1000–120000");
            }
        }
        Ok(())
    }

    /// Full URL of the ingestion endpoint.
    pub fn endpoint_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.server_host, self.server_port, self.endpoint_path
        )
    }
}
