//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `hardware`     | SensorPort         | TDS probe, NTC thermistor   |
//! | `time`         | ClockPort          | ESP32 system timer, SNTP    |
//! | `serial_sink`  | MeasurementSink    | UART console (CSV)          |
//! | `http_sink`    | MeasurementSink    | Dashboard `POST` (JSON)     |
//! | `upload_queue` | MeasurementSink    | Background uploader thread  |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA            |
//! | `log_sink`     | EventSink          | Serial log output           |
//! | `nvs`          | ConfigPort         | NVS / in-memory store       |

pub mod device_id;
pub mod hardware;
pub mod http_sink;
pub mod log_sink;
pub mod nvs;
pub mod serial_sink;
pub mod time;
pub mod upload_queue;
pub mod wifi;
