//! Runtime counters for field diagnostics.
//!
//! Updated by the pipeline on every sample and emission tick and reported
//! through [`AppEvent::Stats`](crate::app::events::AppEvent::Stats) at the
//! configured interval.  Counters saturate instead of wrapping.

use crate::app::ports::{DeferredOutcomes, Delivered};
use crate::error::TransportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Raw ADC samples pushed into the window.
    pub samples: u64,
    /// Measurements the sink confirmed on the spot (written or POSTed).
    pub delivered: u32,
    /// Measurements handed to the background uploader.
    pub queued: u32,
    /// Of `queued`, those the uploader got a 2xx for.
    pub uploaded: u32,
    /// Of `queued`, those the uploader failed to deliver.
    pub upload_failed: u32,
    /// Measurements refused by the sink on the spot.
    pub failed: u32,
    /// Of `failed`, those caused by missing connectivity.
    pub network_unavailable: u32,
    /// Of `failed`, those dropped because the upload queue was full.
    pub queue_drops: u32,
    /// Emission ticks refused by temperature compensation.
    pub rejected: u32,
    /// Emission ticks skipped during warm-up.
    pub warmup_skips: u32,
    /// Network reconnects requested by the sink.
    pub reconnects: u32,
}

impl PipelineStats {
    pub fn record_sample(&mut self) {
        self.samples = self.samples.saturating_add(1);
    }

    pub fn record_delivery(&mut self, result: Result<Delivered, TransportError>) {
        match result {
            Ok(Delivered::Queued) => self.queued = self.queued.saturating_add(1),
            Ok(_) => self.delivered = self.delivered.saturating_add(1),
            Err(e) => {
                self.failed = self.failed.saturating_add(1);
                match e {
                    TransportError::NetworkUnavailable => {
                        self.network_unavailable = self.network_unavailable.saturating_add(1);
                    }
                    TransportError::QueueFull => {
                        self.queue_drops = self.queue_drops.saturating_add(1);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Take over the uploader's running totals.
    pub fn record_deferred(&mut self, outcomes: DeferredOutcomes) {
        self.uploaded = outcomes.uploaded;
        self.upload_failed = outcomes.failed;
    }

    /// Deliveries the receiver confirmed, directly or through the uploader.
    pub fn delivered_total(&self) -> u32 {
        self.delivered.saturating_add(self.uploaded)
    }

    /// Failed deliveries, directly or through the uploader.
    pub fn failed_total(&self) -> u32 {
        self.failed.saturating_add(self.upload_failed)
    }

    pub fn record_rejected(&mut self) {
        self.rejected = self.rejected.saturating_add(1);
    }

    pub fn record_warmup_skip(&mut self) {
        self.warmup_skips = self.warmup_skips.saturating_add(1);
    }

    /// Fraction of settled emissions that reached the receiver (1.0 before
    /// any).  Measurements still in the upload queue are not counted.
    pub fn delivery_ratio(&self) -> f32 {
        let attempts = self.delivered_total().saturating_add(self.failed_total());
        if attempts == 0 {
            return 1.0;
        }
        self.delivered_total() as f32 / attempts as f32
    }
}
