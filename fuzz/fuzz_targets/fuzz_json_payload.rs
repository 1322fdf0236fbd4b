//! Fuzz target: `TdsPayload::from_json`
//!
//! Arbitrary request bodies must decode to a typed error or to a payload
//! that passes validation and re-encodes cleanly.
//!
//! cargo fuzz run fuzz_json_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use tdsmon::codec::TdsPayload;

fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = TdsPayload::from_json(data) {
        assert!(payload.validate().is_ok(), "decoder returned an invalid payload");
        let _ = payload.to_json();
    }
});
