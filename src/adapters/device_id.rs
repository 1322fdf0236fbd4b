//! Device identity derived from the ESP32 factory MAC address.
//!
//! Used when no `device_id` is configured.  Produces `tds-xxyyzz` from the
//! last three bytes of the eFuse MAC, stable across reboots.

use core::fmt::Write;

use crate::pipeline::DeviceIdString;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `tds-xxyyzz` (lowercase hex of the last 3 MAC bytes).
pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "tds-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

/// The configured id, or the MAC-derived one when none is configured.
pub fn resolve(configured: &str) -> DeviceIdString {
    let configured = configured.trim();
    if configured.is_empty() {
        return device_id(&read_mac());
    }
    DeviceIdString::try_from(configured).unwrap_or_else(|_| device_id(&read_mac()))
}
