//! Serial CSV sink.
//!
//! Writes one line per measurement to any byte stream: the UART console
//! (`std::io::stdout()` is routed to UART0 by ESP-IDF) in production, a
//! `Vec<u8>` in tests.

use std::io::Write;

use log::warn;

use crate::app::ports::{Delivered, MeasurementSink};
use crate::codec;
use crate::error::TransportError;
use crate::pipeline::Measurement;

pub struct SerialCsvSink<W: Write> {
    out: W,
}

impl<W: Write> SerialCsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MeasurementSink for SerialCsvSink<W> {
    fn submit(&mut self, measurement: &Measurement) -> Result<Delivered, TransportError> {
        let line = codec::format_csv_line(measurement).map_err(|e| {
            warn!("EMIT | csv encode failed: {}", e);
            TransportError::Encode
        })?;
        self.out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|_| TransportError::Io)?;
        Ok(Delivered::Written)
    }
}
