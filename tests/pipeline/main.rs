//! Integration test driver for `tests/pipeline/`.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock adapters or loopback sockets.  All tests run on the host with no
//! real hardware required.

mod http_upload_tests;
mod mock_hw;
mod pipeline_tests;
mod serial_tests;
