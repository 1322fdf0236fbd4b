//! Serial CSV emission: simulated probe → pipeline → CSV lines, read back
//! with the same parser the ingest side applies.

use tdsmon::adapters::hardware::HardwareAdapter;
use tdsmon::adapters::serial_sink::SerialCsvSink;
use tdsmon::app::service::PipelineState;
use tdsmon::codec::CsvRecord;
use tdsmon::config::{EmitMode, SystemConfig, WarmupPolicy};
use tdsmon::pipeline::{Calibration, DeviceIdString};
use tdsmon::sensors::tds::{TdsProbe, sim_set_tds_adc};

use super::mock_hw::{EventLog, ManualClock};

#[test]
fn simulated_probe_emits_parseable_csv() {
    let cfg = SystemConfig {
        emit_mode: EmitMode::Serial,
        sample_period_ms: 10,
        emit_period_ms: 100,
        window_size: 10,
        warmup: WarmupPolicy::WaitForFill,
        stats_interval_secs: 0,
        ..SystemConfig::default()
    };
    sim_set_tds_adc(2048);

    let mut hw = HardwareAdapter::new(TdsProbe::new(3), None);
    let mut p = PipelineState::new(&cfg, DeviceIdString::try_from("arduino-01").unwrap(), 0);
    let clock = ManualClock::new();
    let mut sink = SerialCsvSink::new(Vec::new());

    for _ in 0..30 {
        clock.advance(10);
        p.poll(&clock, &mut hw, &mut sink, &mut EventLog::default());
    }

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);

    let expected = Calibration::default().convert(2048.0).unwrap();
    for line in &lines {
        assert!(line.ends_with(','), "timestamp column must be empty: {line}");
        let rec = CsvRecord::parse(line).unwrap();
        assert_eq!(rec.device_id, "arduino-01");
        assert!((rec.tds - expected.tds_ppm).abs() <= 0.05 + 1e-3);
        assert!((rec.voltage.unwrap() - expected.voltage).abs() <= 0.005 + 1e-4);
        assert_eq!(rec.timestamp, None);
    }
}
