//! ESP32 time adapter.
//!
//! Implements [`ClockPort`]: monotonic uptime for the interval timers and
//! the wall clock for measurement timestamps.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` for uptime and
//!   `gettimeofday()` (set by SNTP) for wall-clock time.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and the host
//!   system clock.

use chrono::{DateTime, Utc};

use crate::app::ports::ClockPort;

/// Anything earlier means SNTP has not set the clock yet.
const EPOCH_2020: i64 = 1_577_836_800;

/// Time adapter for the ESP32-S3 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    #[cfg(target_os = "espidf")]
    fn wall_clock(&self) -> Option<(i64, u32)> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        Some((tv.tv_sec as i64, (tv.tv_usec as u32).saturating_mul(1000)))
    }

    #[cfg(not(target_os = "espidf"))]
    fn wall_clock(&self) -> Option<(i64, u32)> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        Some((now.as_secs() as i64, now.subsec_nanos()))
    }
}

/// `None` for clocks that were never synchronised.
fn synced(secs: i64, nanos: u32) -> Option<DateTime<Utc>> {
    if secs < EPOCH_2020 {
        return None;
    }
    DateTime::from_timestamp(secs, nanos)
}

impl ClockPort for Esp32TimeAdapter {
    fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1000
    }

    fn utc_now(&self) -> Option<DateTime<Utc>> {
        let (secs, nanos) = self.wall_clock()?;
        synced(secs, nanos)
    }
}
