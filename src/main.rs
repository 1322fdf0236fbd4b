//! TDS monitor firmware: main entry point.
//!
//! Hexagonal architecture around a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (SensorPort)      (EventSink)    (ConfigPort) (ClockPort)     │
//! │  SerialCsvSink  ·  HttpJsonSink + WifiAdapter  ·  QueuedSink   │
//! │  (MeasurementSink)                                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            PipelineState (pure logic)                  │    │
//! │  │  window · median · temperature-compensated TDS         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::sntp::EspSntp;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use tdsmon::adapters::device_id;
use tdsmon::adapters::hardware::HardwareAdapter;
use tdsmon::adapters::http_sink::{EspHttpClient, HttpJsonSink};
use tdsmon::adapters::log_sink::LogEventSink;
use tdsmon::adapters::nvs::NvsAdapter;
use tdsmon::adapters::serial_sink::SerialCsvSink;
use tdsmon::adapters::time::Esp32TimeAdapter;
use tdsmon::adapters::upload_queue::{self, QueuedSink, UPLOAD_QUEUE};
use tdsmon::adapters::wifi::{ConnectivityPort, WifiAdapter};
use tdsmon::app::ports::{ClockPort, ConfigPort, MeasurementSink};
use tdsmon::app::service::PipelineState;
use tdsmon::config::{EmitMode, SystemConfig};
use tdsmon::drivers::{adc, watchdog::Watchdog};
use tdsmon::pins;
use tdsmon::sensors::tds::TdsProbe;
use tdsmon::sensors::temperature::Thermistor;

/// Per-request HTTP timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest the loop sleeps between polls.
const MAX_IDLE_MS: u64 = 20;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TDS monitor v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = adc::init() {
        // Without the ADC there is nothing to measure; the watchdog is
        // not armed yet, so halt visibly instead of boot-looping.
        error!("ADC init failed: {}: halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config unavailable ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    // Defaults may lack build-time credentials; measure over serial instead.
    let emit_mode = match config.validate() {
        Ok(()) => config.emit_mode,
        Err(msg) => {
            warn!("Config invalid ({}), falling back to serial output", msg);
            EmitMode::Serial
        }
    };

    let dev_id = device_id::resolve(&config.device_id);
    info!("Device ID: {}", dev_id);

    // ── 3. Sensors ────────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        TdsProbe::new(pins::TDS_ADC_CHANNEL),
        config
            .temperature_probe
            .then(|| Thermistor::new(pins::TEMP_ADC_CHANNEL)),
    );
    let clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 4. Measurement sink ───────────────────────────────────
    // SNTP must outlive the loop for timestamps to stay synchronised.
    let mut _sntp: Option<EspSntp<'static>> = None;
    let mut sink: Box<dyn MeasurementSink> = match emit_mode {
        EmitMode::Serial => {
            info!("Emitting CSV on UART0 ({} baud)", pins::UART_BAUD);
            Box::new(SerialCsvSink::new(std::io::stdout()))
        }
        EmitMode::Http => {
            let peripherals = Peripherals::take()?;
            let sys_loop = EspSystemEventLoop::take()?;
            let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), None)?;
            let mut wifi = WifiAdapter::new(config.wifi_connect_timeout_ms);
            wifi.attach(BlockingWifi::wrap(esp_wifi, sys_loop)?);
            wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            if let Err(e) = wifi.connect() {
                warn!("WiFi not up at boot ({}); will keep retrying", e);
            }
            if config.include_timestamp {
                _sntp = Some(EspSntp::new_default()?);
            }

            let url = config.endpoint_url();
            info!("Emitting JSON to {}", url);
            let http = HttpJsonSink::new(wifi, EspHttpClient::new(HTTP_TIMEOUT), url);
            if config.background_upload {
                upload_queue::spawn_uploader(&UPLOAD_QUEUE, http)?;
                Box::new(QueuedSink::new(&UPLOAD_QUEUE))
            } else {
                Box::new(http)
            }
        }
    };

    // ── 5. Watchdog ───────────────────────────────────────────
    // Synchronous uploads may block for one association plus one request.
    let wdt_ms = config
        .wifi_connect_timeout_ms
        .saturating_add(HTTP_TIMEOUT.as_millis() as u32)
        .saturating_add(10_000);
    let watchdog = Watchdog::new(wdt_ms);

    // ── 6. Pipeline ───────────────────────────────────────────
    let mut pipeline = PipelineState::new(&config, dev_id, clock.uptime_ms());
    pipeline.start(&mut log_sink);

    info!("System ready. Entering measurement loop.");
    log::set_max_level(emit_mode.log_level());

    loop {
        pipeline.poll(&clock, &mut hw, sink.as_mut(), &mut log_sink);
        watchdog.feed();

        let idle = pipeline.idle_ms(clock.uptime_ms()).min(MAX_IDLE_MS);
        if idle > 0 {
            std::thread::sleep(Duration::from_millis(idle));
        }
    }
}
