//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]: the hexagonal boundary for network
//! connectivity used by the HTTP measurement sink.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc`,
//!   attached from `main()` with [`WifiAdapter::attach`].
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! Each association attempt is time-boxed by the configured connect
//! timeout.  After a failure, or when the sink reports a transport error,
//! the adapter enters `Reconnecting` and retries on every [`poll`]
//! without backoff and without a retry limit.
//!
//! [`poll`]: ConnectivityPort::poll

use core::fmt;
use core::net::Ipv4Addr;

use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    Timeout,
    AlreadyConnected,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::Timeout => write!(f, "WiFi association timed out"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    /// Drive reconnection.  Blocks for at most one connect timeout.
    fn poll(&mut self);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
    /// Station address, `None` while disconnected.
    fn ip_address(&self) -> Option<Ipv4Addr>;
    /// Drop the current association and retry on the next `poll`.
    fn request_reconnect(&mut self);
    fn reconnect_attempts(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    connect_timeout_ms: u32,
    reconnects: u32,
    #[cfg(target_os = "espidf")]
    wifi: Option<BlockingWifi<EspWifi<'static>>>,
    /// Simulation: whether the pretend access point accepts associations.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_up: bool,
}

impl WifiAdapter {
    pub fn new(connect_timeout_ms: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            connect_timeout_ms,
            reconnects: 0,
            #[cfg(target_os = "espidf")]
            wifi: None,
            #[cfg(not(target_os = "espidf"))]
            sim_ap_up: true,
        }
    }

    /// Hand over the started-in-main WiFi driver.
    #[cfg(target_os = "espidf")]
    pub fn attach(&mut self, wifi: BlockingWifi<EspWifi<'static>>) {
        self.wifi = Some(wifi);
    }

    /// Simulation: take the pretend access point up or down.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ap(&mut self, up: bool) {
        self.sim_ap_up = up;
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use core::time::Duration;
        use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let wifi = self.wifi.as_mut().ok_or(ConnectivityError::ConnectionFailed)?;
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        wifi.set_configuration(&config).map_err(|e| {
            error!("WiFi: set_configuration failed: {}", e);
            ConnectivityError::ConnectionFailed
        })?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|_| ConnectivityError::ConnectionFailed)?;
        }

        let timeout = Some(Duration::from_millis(u64::from(self.connect_timeout_ms)));
        wifi.wifi_mut()
            .connect()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        wifi.wifi_wait_while(|| wifi.is_connected().map(|c| !c), timeout)
            .map_err(|_| ConnectivityError::Timeout)?;
        wifi.ip_wait_while(|| wifi.wifi().sta_netif().is_up().map(|up| !up), timeout)
            .map_err(|_| ConnectivityError::Timeout)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if !self.sim_ap_up {
            warn!(
                "WiFi(sim): no AP answering '{}' within {}ms",
                self.ssid, self.connect_timeout_ms
            );
            return Err(ConnectivityError::Timeout);
        }
        info!("WiFi(sim): associated with '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Some(wifi) = self.wifi.as_mut() {
            let _ = wifi.disconnect();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.wifi
            .as_ref()
            .and_then(|w| w.is_connected().ok())
            .unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_ap_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        let wifi = self.wifi.as_ref()?;
        wifi.wifi().sta_netif().get_ip_info().ok().map(|info| info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 168, 4, 2))
    }

    fn try_associate(&mut self, attempt: u32) {
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: reconnected after {} attempt(s), ip={:?}", attempt + 1, self.platform_ip());
            }
            Err(e) => {
                warn!("WiFi: reconnect attempt {} failed: {}", attempt + 1, e);
                self.state = WifiState::Reconnecting { attempt: attempt + 1 };
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}' (timeout {}ms)", self.ssid, self.connect_timeout_ms);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected, ip={:?}", self.platform_ip());
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_link_up()
    }

    fn poll(&mut self) {
        match self.state {
            WifiState::Reconnecting { attempt } => self.try_associate(attempt),
            WifiState::Connected if !self.platform_link_up() => {
                warn!("WiFi: connection lost, entering reconnect");
                self.reconnects = self.reconnects.saturating_add(1);
                self.state = WifiState::Reconnecting { attempt: 0 };
            }
            _ => {}
        }
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        if self.is_connected() { self.platform_ip() } else { None }
    }

    fn request_reconnect(&mut self) {
        if self.ssid.is_empty() || matches!(self.state, WifiState::Reconnecting { .. }) {
            return;
        }
        info!("WiFi: reconnect requested");
        self.platform_disconnect();
        self.reconnects = self.reconnects.saturating_add(1);
        self.state = WifiState::Reconnecting { attempt: 0 };
    }

    fn reconnect_attempts(&self) -> u32 {
        self.reconnects
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
