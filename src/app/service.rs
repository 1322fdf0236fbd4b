//! Pipeline service: the hexagonal core.
//!
//! [`PipelineState`] owns everything the measurement loop mutates: the
//! sample window, the calibration, both interval timers and the runtime
//! counters.  It is created once at boot and polled forever from a single
//! thread.  All I/O flows through port traits injected at call sites.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ MeasurementSink
//!                 │       PipelineState        │
//!   ClockPort ──▶ │ window · median · convert  │ ──▶ EventSink
//!                 └────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::config::{SystemConfig, WarmupPolicy};
use crate::diagnostics::PipelineStats;
use crate::error::{Error, Result, TransportError};
use crate::pipeline::{
    Calibration, DeviceIdString, Measurement, SampleWindow, converter, filter_and_convert,
};
use crate::scheduler::{IntervalTimer, SlowTicker};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ClockPort, Delivered, EventSink, MeasurementSink, SensorPort};

/// What happened on the emission side of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Emission timer not due.
    NotDue,
    /// Due, but the window has not been filled yet.
    WarmingUp,
    /// Due, but the conversion refused the current temperature.
    Rejected,
    /// Measurement accepted by the sink.
    Delivered(Delivered),
    /// Measurement refused by the sink.
    Failed(TransportError),
}

/// Outcome of one [`PipelineState::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub sampled: bool,
    pub emission: Emission,
}

// ───────────────────────────────────────────────────────────────
// PipelineState
// ───────────────────────────────────────────────────────────────

pub struct PipelineState {
    window: SampleWindow,
    cal: Calibration,
    sample_timer: IntervalTimer,
    emit_timer: IntervalTimer,
    stats_ticker: SlowTicker,
    device_id: DeviceIdString,
    warmup: WarmupPolicy,
    include_timestamp: bool,
    use_temperature_probe: bool,
    stats: PipelineStats,
}

impl PipelineState {
    /// Build the pipeline from configuration.  Both timers start counting
    /// at `start_ms`.
    pub fn new(config: &SystemConfig, device_id: DeviceIdString, start_ms: u64) -> Self {
        let cal = Calibration {
            reference_voltage: config.reference_voltage,
            adc_max_code: config.adc_max_code,
            temperature_c: config.temperature_c,
            k_factor: config.k_factor,
        };
        Self {
            window: SampleWindow::new(config.window_size as usize),
            cal,
            sample_timer: IntervalTimer::new(config.sample_period_ms, start_ms),
            emit_timer: IntervalTimer::new(config.emit_period_ms, start_ms),
            stats_ticker: SlowTicker::new(config.stats_interval_secs, start_ms),
            device_id,
            warmup: config.warmup,
            include_timestamp: config.include_timestamp,
            use_temperature_probe: config.temperature_probe,
            stats: PipelineStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            window_size: self.window.len(),
            sample_period_ms: self.sample_timer.period_ms(),
            emit_period_ms: self.emit_timer.period_ms(),
        });
        info!(
            "Pipeline started: device={} N={} Vref={}V adc_max={} K={}",
            self.device_id,
            self.window.len(),
            self.cal.reference_voltage,
            self.cal.adc_max_code,
            self.cal.k_factor
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run whichever periodic activities are due.  Never blocks except
    /// inside a synchronous sink.
    pub fn poll<S: MeasurementSink + ?Sized>(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut impl SensorPort,
        out: &mut S,
        events: &mut impl EventSink,
    ) -> PollOutcome {
        let now = clock.uptime_ms();

        let sampled = self.sample_timer.due(now);
        if sampled {
            self.sample(hw);
        }

        let emission = if self.emit_timer.due(now) {
            self.emit(clock, hw, out, events)
        } else {
            Emission::NotDue
        };

        if self.stats_ticker.due(now) {
            self.sync_sink_counters(out);
            events.emit(&AppEvent::Stats(self.stats));
        }

        PollOutcome { sampled, emission }
    }

    /// Take one raw sample into the window.
    pub fn sample(&mut self, hw: &mut impl SensorPort) -> u16 {
        let raw = hw.sample_tds();
        self.window.push(raw);
        self.stats.record_sample();
        raw
    }

    /// Filter and convert the current window.
    pub fn measure(&self, timestamp: Option<DateTime<Utc>>) -> Result<Measurement> {
        let c = filter_and_convert(&self.window, &self.cal)?;
        Ok(Measurement {
            device_id: self.device_id.clone(),
            tds_ppm: c.tds_ppm,
            voltage: c.voltage,
            timestamp,
        })
    }

    /// One emission tick: refresh temperature, honour warm-up, measure,
    /// hand off to the sink.  Failures are counted and reported, never
    /// retried.
    pub fn emit<S: MeasurementSink + ?Sized>(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut impl SensorPort,
        out: &mut S,
        events: &mut impl EventSink,
    ) -> Emission {
        if self.use_temperature_probe {
            if let Some(t) = hw.read_temperature() {
                if let Err(e) = self.handle_command(AppCommand::SetTemperature(t), events) {
                    debug!("Temperature probe ignored: {}", e);
                }
            }
        }

        if self.warmup == WarmupPolicy::WaitForFill && !self.window.is_filled() {
            self.stats.record_warmup_skip();
            events.emit(&AppEvent::WarmingUp {
                filled: self.window.filled(),
                window_size: self.window.len(),
            });
            return Emission::WarmingUp;
        }

        let timestamp = if self.include_timestamp {
            clock.utc_now()
        } else {
            None
        };

        let measurement = match self.measure(timestamp) {
            Ok(m) => m,
            Err(e) => {
                warn!("Measurement rejected: {}", e);
                self.stats.record_rejected();
                events.emit(&AppEvent::ConversionRejected {
                    temperature_c: self.cal.temperature_c,
                });
                return Emission::Rejected;
            }
        };

        let result = out.submit(&measurement);
        self.stats.record_delivery(result);
        match result {
            Ok(delivered) => {
                events.emit(&AppEvent::Emitted {
                    tds_ppm: measurement.tds_ppm,
                    voltage: measurement.voltage,
                    delivered,
                });
                Emission::Delivered(delivered)
            }
            Err(error) => {
                events.emit(&AppEvent::EmitFailed {
                    tds_ppm: measurement.tds_ppm,
                    error,
                });
                Emission::Failed(error)
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply one inbound command.  The thermistor feeds `SetTemperature`
    /// through here on every emission tick; recalibration and window resets
    /// come from whichever operator channel the binary wires up.
    pub fn handle_command(&mut self, cmd: AppCommand, events: &mut impl EventSink) -> Result<()> {
        match cmd {
            AppCommand::SetTemperature(t) => self.apply_temperature(t, events),
            AppCommand::UpdateCalibration(cal) => {
                converter::compensation_coefficient(cal.temperature_c)?;
                if cal.adc_max_code == 0 || !(cal.reference_voltage > 0.0) {
                    return Err(Error::Config("calibration needs a positive Vref and ADC divisor"));
                }
                if !(cal.k_factor > 0.0) {
                    return Err(Error::Config("calibration needs a positive K factor"));
                }
                self.cal = cal;
                info!(
                    "Calibration updated: Vref={}V adc_max={} K={} T={}°C",
                    cal.reference_voltage, cal.adc_max_code, cal.k_factor, cal.temperature_c
                );
                Ok(())
            }
            AppCommand::ResetWindow => {
                self.window.clear();
                info!("Sample window cleared ({} slots)", self.window.len());
                Ok(())
            }
        }
    }

    /// Pull the counters the sink keeps itself: reconnects and the
    /// outcomes of queued uploads.
    pub fn sync_sink_counters<S: MeasurementSink + ?Sized>(&mut self, out: &S) {
        self.stats.reconnects = out.reconnect_attempts();
        if let Some(outcomes) = out.deferred_outcomes() {
            self.stats.record_deferred(outcomes);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn calibration(&self) -> &Calibration {
        &self.cal
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn window_filled(&self) -> bool {
        self.window.is_filled()
    }

    /// Milliseconds until the next sample or emission falls due.
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        self.sample_timer
            .remaining_ms(now_ms)
            .min(self.emit_timer.remaining_ms(now_ms))
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_temperature(&mut self, temperature_c: f32, events: &mut impl EventSink) -> Result<()> {
        let previous = self.cal.temperature_c;
        self.cal.set_temperature(temperature_c)?;
        if (previous - temperature_c).abs() >= 0.05 {
            events.emit(&AppEvent::TemperatureChanged { temperature_c });
        }
        Ok(())
    }
}
