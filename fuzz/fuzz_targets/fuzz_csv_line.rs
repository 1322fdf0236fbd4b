//! Fuzz target: `CsvRecord::parse`
//!
//! Feeds arbitrary text to the serial-ingest CSV parser.  It must never
//! panic, and anything it accepts must carry a non-empty device id and a
//! finite TDS value.
//!
//! cargo fuzz run fuzz_csv_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use tdsmon::codec::CsvRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(rec) = CsvRecord::parse(line) {
        assert!(!rec.device_id.is_empty(), "accepted record without device id");
        assert!(rec.tds.is_finite(), "accepted non-finite tds");
    }
});
