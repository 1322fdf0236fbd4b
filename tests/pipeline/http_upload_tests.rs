//! HTTP emission against a loopback server: payload shape, status
//! handling, reconnect requests and the background upload queue.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tdsmon::adapters::http_sink::{HttpJsonSink, TcpHttpClient};
use tdsmon::adapters::upload_queue::{QueuedSink, UploadQueue, spawn_uploader};
use tdsmon::adapters::wifi::{ConnectivityPort, WifiAdapter, WifiState};
use tdsmon::app::ports::{Delivered, MeasurementSink};
use tdsmon::codec::TdsPayload;
use tdsmon::error::TransportError;
use tdsmon::pipeline::Measurement;

// ── Loopback server ───────────────────────────────────────────

/// Answer one request per entry in `replies`, then stop.  Yields the raw
/// requests in arrival order.
fn serve(replies: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            write!(
                stream,
                "{status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
        requests
    });
    (format!("http://{addr}/api/tds"), handle)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                break;
            }
        }
    }
    String::from_utf8(buf).unwrap()
}

fn body_of(request: &str) -> &str {
    request.split_once("\r\n\r\n").map(|(_, b)| b).unwrap()
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/tds")
}

// ── Fixtures ──────────────────────────────────────────────────

fn online_wifi() -> WifiAdapter {
    let mut wifi = WifiAdapter::new(20_000);
    wifi.set_credentials("TankNet", "password1").unwrap();
    wifi.connect().unwrap();
    wifi
}

fn sink(url: String) -> HttpJsonSink<WifiAdapter, TcpHttpClient> {
    HttpJsonSink::new(online_wifi(), TcpHttpClient::new(Duration::from_secs(2)), url)
}

fn measurement(tds: f32) -> Measurement {
    Measurement {
        device_id: "esp32-01".try_into().unwrap(),
        tds_ppm: tds,
        voltage: 1.25,
        timestamp: None,
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[test]
fn posts_json_reading() {
    let (url, server) = serve(vec![("HTTP/1.1 200 OK", r#"{"status":"ok"}"#)]);
    let mut s = sink(url);

    assert_eq!(s.submit(&measurement(345.7)), Ok(Delivered::Http(200)));

    let requests = server.join().unwrap();
    let req = &requests[0];
    assert!(req.starts_with("POST /api/tds HTTP/1.1\r\n"));
    assert!(req.to_ascii_lowercase().contains("content-type: application/json"));

    let payload = TdsPayload::from_json(body_of(req).as_bytes()).unwrap();
    assert_eq!(payload.device_id, "esp32-01");
    assert_eq!(payload.device_ip, "192.168.4.2");
    assert!((payload.tds - 345.7).abs() < 1e-3);
    assert_eq!(payload.voltage, Some(1.25));
    assert_eq!(payload.timestamp, None);
}

#[test]
fn bad_request_fails_and_reconnects_before_next_post() {
    let (url, server) = serve(vec![
        ("HTTP/1.1 400 Bad Request", r#"{"detail":"Missing tds value"}"#),
        ("HTTP/1.1 200 OK", "{}"),
    ]);
    let mut s = sink(url);

    assert_eq!(s.submit(&measurement(1.0)), Err(TransportError::Status(400)));
    assert_eq!(s.reconnect_attempts(), 1);
    assert_eq!(s.connectivity().state(), WifiState::Reconnecting { attempt: 0 });

    // Next cycle: the sink re-associates, then posts normally.
    assert_eq!(s.submit(&measurement(2.0)), Ok(Delivered::Http(200)));
    assert!(s.connectivity().is_connected());
    assert_eq!(server.join().unwrap().len(), 2);
}

#[test]
fn refused_connection_is_transport_failure() {
    let mut s = sink(closed_port_url());
    assert_eq!(s.submit(&measurement(1.0)), Err(TransportError::Connection));
    assert_eq!(s.reconnect_attempts(), 1);
}

#[test]
fn no_access_point_means_network_unavailable() {
    let mut wifi = online_wifi();
    wifi.sim_set_ap(false);
    let mut s = HttpJsonSink::new(wifi, TcpHttpClient::new(Duration::from_secs(2)), closed_port_url());

    for _ in 0..3 {
        assert_eq!(s.submit(&measurement(1.0)), Err(TransportError::NetworkUnavailable));
    }
    assert!(s.reconnect_attempts() >= 1);
}

#[test]
fn background_uploader_posts_queued_readings() {
    let (url, server) = serve(vec![("HTTP/1.1 200 OK", "{}"), ("HTTP/1.1 201 Created", "{}")]);
    let queue: &'static UploadQueue = Box::leak(Box::new(UploadQueue::new()));
    spawn_uploader(queue, sink(url)).unwrap();

    let mut producer = QueuedSink::new(queue);
    assert_eq!(producer.submit(&measurement(10.0)), Ok(Delivered::Queued));
    assert_eq!(producer.submit(&measurement(20.0)), Ok(Delivered::Queued));

    let requests = server.join().unwrap();
    for _ in 0..200 {
        if queue.uploaded() == 2 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(queue.uploaded(), 2);
    assert_eq!(queue.failed(), 0);

    let tds: Vec<f32> = requests
        .iter()
        .map(|r| TdsPayload::from_json(body_of(r).as_bytes()).unwrap().tds)
        .collect();
    assert_eq!(tds, vec![10.0, 20.0]);
}
