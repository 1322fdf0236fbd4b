//! HTTP measurement sink: JSON `POST` to the dashboard ingest endpoint.
//!
//! [`HttpJsonSink`] owns the connectivity port and an [`HttpClient`].  On
//! each submit it checks the link, serialises a [`TdsPayload`], posts it and
//! logs the answer.  Anything but 2xx is a failure; a status of 400 or
//! above, or a connection-level failure, also asks the connectivity port to
//! reconnect.  The measurement itself is dropped, never retried.
//!
//! Two clients:
//! - **`target_os = "espidf"`**: [`EspHttpClient`], `embedded_svc` client
//!   over `EspHttpConnection`.
//! - **all targets**: [`TcpHttpClient`], a minimal HTTP/1.1 client over
//!   `std::net`, used on the host and in integration tests.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{Delivered, MeasurementSink};
use crate::codec::TdsPayload;
use crate::error::TransportError;
use crate::pipeline::Measurement;

use super::wifi::ConnectivityPort;

/// Bytes of response body kept for the log line.
const MAX_LOGGED_BODY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking JSON POST capability.
pub trait HttpClient {
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// HttpJsonSink
// ───────────────────────────────────────────────────────────────

pub struct HttpJsonSink<C: ConnectivityPort, H: HttpClient> {
    net: C,
    client: H,
    url: String,
}

impl<C: ConnectivityPort, H: HttpClient> HttpJsonSink<C, H> {
    pub fn new(net: C, client: H, url: impl Into<String>) -> Self {
        Self {
            net,
            client,
            url: url.into(),
        }
    }

    pub fn connectivity(&mut self) -> &mut C {
        &mut self.net
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<C: ConnectivityPort, H: HttpClient> MeasurementSink for HttpJsonSink<C, H> {
    fn submit(&mut self, measurement: &Measurement) -> Result<Delivered, TransportError> {
        if !self.net.is_connected() {
            // One time-boxed association attempt; the loop carries on either way.
            self.net.request_reconnect();
            self.net.poll();
            if !self.net.is_connected() {
                return Err(TransportError::NetworkUnavailable);
            }
        }

        let device_ip = self
            .net
            .ip_address()
            .map(|ip| ip.to_string())
            .unwrap_or_default();
        let body = TdsPayload::from_measurement(measurement, &device_ip)
            .to_json()
            .map_err(|e| {
                warn!("HTTP: payload refused: {}", e);
                TransportError::Encode
            })?;

        debug!("HTTP: POST {} ({} bytes)", self.url, body.len());
        let result = self
            .client
            .post_json(&self.url, &body)
            .and_then(|resp| {
                info!("HTTP: {} -> {} {}", self.url, resp.status, resp.body.trim());
                if !(200..300).contains(&resp.status) {
                    Err(TransportError::Status(resp.status))
                } else {
                    Ok(Delivered::Http(resp.status))
                }
            });

        if let Err(e) = result {
            warn!("HTTP: post failed: {}", e);
            if e.wants_reconnect() {
                self.net.request_reconnect();
            }
        }
        result
    }

    fn reconnect_attempts(&self) -> u32 {
        self.net.reconnect_attempts()
    }
}

// ───────────────────────────────────────────────────────────────
// URL helpers
// ───────────────────────────────────────────────────────────────

/// Split `http://host[:port]/path` into its parts.  Only plain HTTP.
pub fn split_url(url: &str) -> Option<(&str, u16, &str)> {
    let rest = url.strip_prefix("http://")?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h, p.parse().ok()?),
        None => (authority, 80),
    };
    if host.is_empty() {
        return None;
    }
    Some((host, port, path))
}

fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

fn truncate_body(raw: &[u8]) -> String {
    let end = raw.len().min(MAX_LOGGED_BODY);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

// ───────────────────────────────────────────────────────────────
// TcpHttpClient (std::net)
// ───────────────────────────────────────────────────────────────

pub struct TcpHttpClient {
    timeout: Duration,
}

impl TcpHttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl HttpClient for TcpHttpClient {
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, TransportError> {
        let (host, port, path) = split_url(url).ok_or(TransportError::Encode)?;
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Connection)?
            .next()
            .ok_or(TransportError::Connection)?;

        let mut stream =
            TcpStream::connect_timeout(&addr, self.timeout).map_err(|_| TransportError::Connection)?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|_| TransportError::Io)?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|_| TransportError::Io)?;

        let head = format!(
            "POST {path} HTTP/1.1\r\nHost: {host}:{port}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream
            .write_all(head.as_bytes())
            .and_then(|()| stream.write_all(body))
            .and_then(|()| stream.flush())
            .map_err(|_| TransportError::Connection)?;

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .map_err(|_| TransportError::Connection)?;

        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .ok_or(TransportError::Connection)?;
        let head = String::from_utf8_lossy(&raw[..split]);
        let status = head
            .lines()
            .next()
            .and_then(parse_status_line)
            .ok_or(TransportError::Connection)?;

        Ok(HttpResponse {
            status,
            body: truncate_body(&raw[split + 4..]),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// EspHttpClient (embedded_svc over esp-idf)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspHttpClient;

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;

    use embedded_svc::http::Method;
    use embedded_svc::http::client::Client;
    use embedded_svc::io::Write as _;
    use embedded_svc::utils::io;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

    use super::{HttpClient, HttpResponse, MAX_LOGGED_BODY, truncate_body};
    use crate::error::TransportError;

    pub struct EspHttpClient {
        timeout: Duration,
    }

    impl EspHttpClient {
        pub fn new(timeout: Duration) -> Self {
            Self { timeout }
        }

        fn client(&self) -> anyhow::Result<Client<EspHttpConnection>> {
            let conf = Configuration {
                timeout: Some(self.timeout),
                ..Default::default()
            };
            Ok(Client::wrap(EspHttpConnection::new(&conf)?))
        }
    }

    impl HttpClient for EspHttpClient {
        fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, TransportError> {
            // Fresh connection per post; the server closes after each reading.
            let mut client = self.client().map_err(|e| {
                log::error!("HTTP: client init failed: {:#}", e);
                TransportError::Connection
            })?;

            let len = body.len().to_string();
            let headers = [
                ("Content-Type", "application/json"),
                ("Content-Length", len.as_str()),
            ];
            let mut request = client
                .request(Method::Post, url, &headers)
                .map_err(|_| TransportError::Connection)?;
            request.write_all(body).map_err(|_| TransportError::Connection)?;
            request.flush().map_err(|_| TransportError::Connection)?;
            let mut response = request.submit().map_err(|_| TransportError::Connection)?;

            let status = response.status();
            let mut buf = [0u8; MAX_LOGGED_BODY];
            let read = io::try_read_full(&mut response, &mut buf).unwrap_or(0);
            Ok(HttpResponse {
                status,
                body: truncate_body(&buf[..read]),
            })
        }
    }
}
