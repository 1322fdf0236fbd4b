//! Integration tests for the sample → window → median → convert → emit
//! loop driven through `PipelineState::poll`.

use chrono::{TimeZone, Utc};

use tdsmon::adapters::upload_queue::{QueuedSink, UploadQueue, spawn_uploader};
use tdsmon::app::commands::AppCommand;
use tdsmon::app::events::AppEvent;
use tdsmon::app::ports::Delivered;
use tdsmon::app::service::{Emission, PipelineState};
use tdsmon::config::{SystemConfig, WarmupPolicy};
use tdsmon::error::TransportError;
use tdsmon::pipeline::DeviceIdString;

use super::mock_hw::{EventLog, FlakySink, ManualClock, MockProbe, RecordingSink};

fn config(sample_ms: u32, emit_ms: u32, window: u16, warmup: WarmupPolicy) -> SystemConfig {
    SystemConfig {
        sample_period_ms: sample_ms,
        emit_period_ms: emit_ms,
        window_size: window,
        warmup,
        stats_interval_secs: 0,
        ..SystemConfig::default()
    }
}

fn pipeline(cfg: &SystemConfig) -> PipelineState {
    PipelineState::new(cfg, DeviceIdString::try_from("tank-1").unwrap(), 0)
}

fn ec(v: f32) -> f32 {
    (133.42 * v * v * v - 255.86 * v * v + 857.39 * v) / 1000.0
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn default_cadence_samples_25hz_and_emits_1hz_after_fill() {
    let cfg = config(40, 1000, 30, WarmupPolicy::WaitForFill);
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(1000);
    let mut sink = RecordingSink::default();
    let mut log = EventLog::default();
    p.start(&mut log);

    for _ in 0..300 {
        clock.advance(10);
        p.poll(&clock, &mut probe, &mut sink, &mut log);
    }

    assert_eq!(probe.samples_taken, 75);
    // t=1000 ms: 25/30 samples, skipped.  t=2000 and t=3000: emitted.
    assert_eq!(sink.received.len(), 2);
    assert_eq!(log.count(|e| matches!(e, AppEvent::WarmingUp { filled: 25, window_size: 30 })), 1);
    assert_eq!(p.stats().warmup_skips, 1);
}

#[test]
fn stalled_loop_fires_once_per_timer() {
    let cfg = config(40, 1000, 1, WarmupPolicy::ZeroBias);
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(10);
    let mut sink = RecordingSink::default();

    clock.advance(5_000);
    let outcome = p.poll(&clock, &mut probe, &mut sink, &mut EventLog::default());
    assert!(outcome.sampled);
    assert!(matches!(outcome.emission, Emission::Delivered(_)));
    assert_eq!(probe.samples_taken, 1);
    assert_eq!(sink.received.len(), 1);
}

#[test]
fn idle_time_points_at_next_deadline() {
    let cfg = config(40, 1000, 5, WarmupPolicy::WaitForFill);
    let p = pipeline(&cfg);
    assert_eq!(p.idle_ms(0), 40);
    assert_eq!(p.idle_ms(35), 5);
    assert_eq!(p.idle_ms(50), 0);
}

// ── End to end ────────────────────────────────────────────────

#[test]
fn constant_512_window_at_5v_10bit() {
    let cfg = SystemConfig {
        reference_voltage: 5.0,
        adc_max_code: 1023,
        ..config(10, 300, 30, WarmupPolicy::WaitForFill)
    };
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(512);
    let mut sink = RecordingSink::default();

    for _ in 0..30 {
        clock.advance(10);
        p.poll(&clock, &mut probe, &mut sink, &mut EventLog::default());
    }

    assert_eq!(sink.received.len(), 1);
    let m = &sink.received[0];
    let v = 512.0_f32 * 5.0 / 1023.0;
    assert_eq!(m.voltage, v);
    assert!((m.tds_ppm - ec(v) * 0.5 * 1000.0).abs() < 1e-3);
    assert_eq!(m.device_id.as_str(), "tank-1");
    assert_eq!(m.timestamp, None);
}

#[test]
fn median_rejects_spikes() {
    let cfg = config(10, 50, 5, WarmupPolicy::WaitForFill);
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    // Two spikes out of five: median stays on the baseline.
    let mut probe = MockProbe::cycle(vec![800, 4095, 800, 0, 800]);
    let mut sink = RecordingSink::default();

    for _ in 0..5 {
        clock.advance(10);
        p.poll(&clock, &mut probe, &mut sink, &mut EventLog::default());
    }

    let expected = 800.0_f32 * 3.3 / 4095.0;
    assert_eq!(sink.received[0].voltage, expected);
}

// ── Failure handling ──────────────────────────────────────────

#[test]
fn failed_emissions_do_not_stop_sampling() {
    let cfg = config(10, 100, 5, WarmupPolicy::ZeroBias);
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(2000);
    let mut sink = FlakySink::new(2, TransportError::NetworkUnavailable);
    let mut log = EventLog::default();

    let mut failed = 0;
    for _ in 0..50 {
        clock.advance(10);
        let outcome = p.poll(&clock, &mut probe, &mut sink, &mut log);
        if outcome.emission == Emission::Failed(TransportError::NetworkUnavailable) {
            failed += 1;
        }
    }

    assert_eq!(failed, 2);
    assert_eq!(probe.samples_taken, 50);
    assert_eq!(sink.attempts, 5);
    assert_eq!(sink.accepted.len(), 3);

    let stats = p.stats();
    assert_eq!((stats.delivered, stats.failed, stats.network_unavailable), (3, 2, 2));
    assert_eq!(log.count(|e| matches!(e, AppEvent::EmitFailed { .. })), 2);
}

#[test]
fn invalid_configured_temperature_rejects_each_emission() {
    let cfg = SystemConfig {
        temperature_c: -30.0,
        ..config(10, 20, 1, WarmupPolicy::ZeroBias)
    };
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(100);
    let mut sink = RecordingSink::default();
    let mut log = EventLog::default();

    for _ in 0..4 {
        clock.advance(10);
        p.poll(&clock, &mut probe, &mut sink, &mut log);
    }

    assert!(sink.received.is_empty());
    assert_eq!(p.stats().rejected, 2);
    assert_eq!(probe.samples_taken, 4);
    assert_eq!(log.count(|e| matches!(e, AppEvent::ConversionRejected { .. })), 2);
}

// ── Temperature collaborator ──────────────────────────────────

#[test]
fn probe_temperature_feeds_compensation() {
    let base = config(10, 50, 5, WarmupPolicy::WaitForFill);
    let with_probe = SystemConfig {
        temperature_probe: true,
        ..base.clone()
    };

    let clock = ManualClock::new();
    let mut warm = pipeline(&with_probe);
    let mut cold = pipeline(&base);
    let mut warm_probe = MockProbe::constant(2500);
    warm_probe.temperature = Some(35.0);
    let mut cold_probe = MockProbe::constant(2500);
    cold_probe.temperature = Some(35.0); // ignored: probe disabled
    let mut warm_sink = RecordingSink::default();
    let mut cold_sink = RecordingSink::default();
    let mut log = EventLog::default();

    for _ in 0..5 {
        clock.advance(10);
        warm.poll(&clock, &mut warm_probe, &mut warm_sink, &mut log);
        cold.poll(&clock, &mut cold_probe, &mut cold_sink, &mut EventLog::default());
    }

    assert_eq!(warm.calibration().temperature_c, 35.0);
    assert_eq!(cold.calibration().temperature_c, 25.0);
    assert!(warm_sink.received[0].tds_ppm < cold_sink.received[0].tds_ppm);
    assert_eq!(
        log.count(|e| matches!(e, AppEvent::TemperatureChanged { temperature_c } if *temperature_c == 35.0)),
        1
    );

    // An impossible reading is ignored; the last good value stays.
    warm_probe.temperature = Some(-40.0);
    for _ in 0..5 {
        clock.advance(10);
        warm.poll(&clock, &mut warm_probe, &mut warm_sink, &mut log);
    }
    assert_eq!(warm.calibration().temperature_c, 35.0);
    assert_eq!(warm_sink.received.len(), 2);
}

// ── Timestamps ────────────────────────────────────────────────

#[test]
fn timestamp_only_when_enabled_and_synced() {
    let ts = Utc.with_ymd_and_hms(2025, 10, 30, 12, 34, 56).unwrap();
    let enabled = SystemConfig {
        include_timestamp: true,
        ..config(10, 10, 1, WarmupPolicy::ZeroBias)
    };

    let mut clock = ManualClock::new();
    let mut p = pipeline(&enabled);
    let mut probe = MockProbe::constant(100);
    let mut sink = RecordingSink::default();

    clock.advance(10);
    p.poll(&clock, &mut probe, &mut sink, &mut EventLog::default());
    clock.wall = Some(ts);
    clock.advance(10);
    p.poll(&clock, &mut probe, &mut sink, &mut EventLog::default());

    let mut plain = pipeline(&config(10, 10, 1, WarmupPolicy::ZeroBias));
    clock.advance(10);
    plain.poll(&clock, &mut probe, &mut sink, &mut EventLog::default());

    let stamps: Vec<_> = sink.received.iter().map(|m| m.timestamp).collect();
    assert_eq!(stamps, vec![None, Some(ts), None]);
}

// ── Commands and diagnostics ──────────────────────────────────

#[test]
fn reset_window_restarts_warmup() {
    let cfg = config(10, 30, 3, WarmupPolicy::WaitForFill);
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(700);
    let mut sink = RecordingSink::default();
    let mut log = EventLog::default();

    for _ in 0..3 {
        clock.advance(10);
        p.poll(&clock, &mut probe, &mut sink, &mut log);
    }
    assert_eq!(sink.received.len(), 1);

    p.handle_command(AppCommand::ResetWindow, &mut log).unwrap();
    assert!(!p.window_filled());

    p.sample(&mut probe);
    assert_eq!(p.emit(&clock, &mut probe, &mut sink, &mut log), Emission::WarmingUp);
    assert_eq!(sink.received.len(), 1);
    assert_eq!(p.stats().warmup_skips, 1);
}

#[test]
fn set_temperature_command_validates() {
    let mut p = pipeline(&SystemConfig::default());
    let mut log = EventLog::default();
    assert!(p.handle_command(AppCommand::SetTemperature(18.5), &mut log).is_ok());
    assert!(p.handle_command(AppCommand::SetTemperature(-25.0), &mut log).is_err());
    assert!(p.handle_command(AppCommand::SetTemperature(f32::NAN), &mut log).is_err());
    assert_eq!(p.calibration().temperature_c, 18.5);
}

#[test]
fn stats_report_includes_sink_reconnects() {
    let cfg = SystemConfig {
        stats_interval_secs: 1,
        ..config(10, 100, 1, WarmupPolicy::ZeroBias)
    };
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(100);
    let mut sink = FlakySink::new(1, TransportError::Connection);
    let mut log = EventLog::default();

    for _ in 0..100 {
        clock.advance(10);
        p.poll(&clock, &mut probe, &mut sink, &mut log);
    }

    let reports: Vec<_> = log
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Stats(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reconnects, 1);
    assert_eq!(reports[0].samples, 100);
    assert_eq!((reports[0].delivered, reports[0].failed), (9, 1));
}

#[test]
fn queued_uploads_that_fail_are_reported_as_failed() {
    let cfg = SystemConfig {
        stats_interval_secs: 1,
        ..config(10, 100, 10, WarmupPolicy::WaitForFill)
    };
    let mut p = pipeline(&cfg);
    let clock = ManualClock::new();
    let mut probe = MockProbe::constant(2000);
    let mut log = EventLog::default();

    let queue: &'static UploadQueue = Box::leak(Box::new(UploadQueue::new()));
    spawn_uploader(queue, FlakySink::new(usize::MAX, TransportError::Status(500))).unwrap();
    let mut producer = QueuedSink::new(queue);

    let mut queued = 0;
    for _ in 0..50 {
        clock.advance(10);
        let outcome = p.poll(&clock, &mut probe, &mut producer, &mut log);
        if outcome.emission == Emission::Delivered(Delivered::Queued) {
            queued += 1;
        }
    }
    assert_eq!(queued, 5);

    for _ in 0..200 {
        if queue.failed() == 5 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!((queue.uploaded(), queue.failed()), (0, 5));

    p.sync_sink_counters(&producer);
    let stats = p.stats();
    assert_eq!(stats.queued, 5);
    assert_eq!(stats.delivered_total(), 0);
    assert_eq!(stats.failed_total(), 5);
    assert_eq!(stats.reconnects, 5);
    assert!(stats.delivery_ratio().abs() < f32::EPSILON);

    // The periodic report carries the uploader's outcomes too.
    clock.advance(1000);
    p.poll(&clock, &mut probe, &mut producer, &mut log);
    let reported = log
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Stats(s) => Some(*s),
            _ => None,
        })
        .unwrap();
    assert_eq!(reported.delivered_total(), 0);
    assert!(reported.failed_total() >= 5);
}
