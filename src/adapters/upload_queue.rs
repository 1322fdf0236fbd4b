//! Background upload queue.
//!
//! Decouples the sampling loop from network latency.  The loop hands each
//! measurement to a [`QueuedSink`], which only does a non-blocking
//! `try_send` into a bounded `embassy-sync` channel.  A dedicated uploader
//! thread drains the channel into the real (blocking) sink.
//!
//! ```text
//! ┌──────────────┐ Measurement ┌────────────────┐  POST  ┌───────────┐
//! │ sampling loop│────────────▶│ uploader thread│───────▶│ dashboard │
//! │  (QueuedSink)│  try_send   │  (HttpJsonSink)│        └───────────┘
//! └──────────────┘             └────────────────┘
//! ```
//!
//! A full queue drops the newest measurement; the loop is never stalled.

use core::sync::atomic::{AtomicU32, Ordering};
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::ports::{DeferredOutcomes, Delivered, MeasurementSink};
use crate::drivers::task_pin::{self, Core};
use crate::error::TransportError;
use crate::pipeline::Measurement;

/// Measurements buffered while the uploader is busy.
pub const QUEUE_DEPTH: usize = 8;

const UPLOADER_STACK_KB: usize = 8;
const UPLOADER_PRIORITY: u8 = 5;

/// Channel plus the counters the uploader publishes back to the loop.
pub struct UploadQueue {
    channel: Channel<CriticalSectionRawMutex, Measurement, QUEUE_DEPTH>,
    uploaded: AtomicU32,
    failed: AtomicU32,
    reconnects: AtomicU32,
}

impl UploadQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            uploaded: AtomicU32::new(0),
            failed: AtomicU32::new(0),
            reconnects: AtomicU32::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn uploaded(&self) -> u32 {
        self.uploaded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u32 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Wait for the next measurement and hand it to `sink`.
    pub async fn upload_next<S: MeasurementSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<Delivered, TransportError> {
        let m = self.channel.receive().await;
        let result = sink.submit(&m);
        match result {
            Ok(_) => self.uploaded.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        self.reconnects
            .store(sink.reconnect_attempts(), Ordering::Relaxed);
        result
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue shared by `main()` and the uploader thread.
pub static UPLOAD_QUEUE: UploadQueue = UploadQueue::new();

// ───────────────────────────────────────────────────────────────
// Producer side
// ───────────────────────────────────────────────────────────────

pub struct QueuedSink {
    queue: &'static UploadQueue,
}

impl QueuedSink {
    pub fn new(queue: &'static UploadQueue) -> Self {
        Self { queue }
    }
}

impl MeasurementSink for QueuedSink {
    fn submit(&mut self, measurement: &Measurement) -> Result<Delivered, TransportError> {
        self.queue
            .channel
            .try_send(measurement.clone())
            .map(|()| Delivered::Queued)
            .map_err(|_| {
                warn!(
                    "Upload queue full ({} pending), dropping {:.1} ppm",
                    QUEUE_DEPTH, measurement.tds_ppm
                );
                TransportError::QueueFull
            })
    }

    fn reconnect_attempts(&self) -> u32 {
        self.queue.reconnects.load(Ordering::Relaxed)
    }

    fn deferred_outcomes(&self) -> Option<DeferredOutcomes> {
        Some(DeferredOutcomes {
            uploaded: self.queue.uploaded(),
            failed: self.queue.failed(),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Consumer side
// ───────────────────────────────────────────────────────────────

/// Spawn the uploader on the protocol core.  It owns `sink` and drains
/// `queue` forever.
pub fn spawn_uploader<S>(queue: &'static UploadQueue, mut sink: S) -> std::io::Result<JoinHandle<()>>
where
    S: MeasurementSink + Send + 'static,
{
    task_pin::spawn_on_core(
        Core::Pro,
        UPLOADER_PRIORITY,
        UPLOADER_STACK_KB,
        "uploader\0",
        move || {
            info!("Uploader started (queue depth {})", QUEUE_DEPTH);
            futures_lite::future::block_on(async {
                loop {
                    // Outcome is logged by the sink and counted by the queue.
                    let _ = queue.upload_next(&mut sink).await;
                }
            })
        },
    )
}
