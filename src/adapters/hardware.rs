//! Hardware adapter: bridges the sensor drivers to [`SensorPort`].
//!
//! This is the only module in the system that touches the probes.  On
//! non-espidf targets the underlying drivers use cfg-gated simulation
//! stubs.

use crate::app::ports::SensorPort;
use crate::sensors::tds::TdsProbe;
use crate::sensors::temperature::Thermistor;

pub struct HardwareAdapter {
    tds: TdsProbe,
    thermistor: Option<Thermistor>,
}

impl HardwareAdapter {
    /// `thermistor` is `None` on boards without a water-temperature probe.
    pub fn new(tds: TdsProbe, thermistor: Option<Thermistor>) -> Self {
        Self { tds, thermistor }
    }
}

impl SensorPort for HardwareAdapter {
    fn sample_tds(&mut self) -> u16 {
        self.tds.read_raw()
    }

    fn read_temperature(&mut self) -> Option<f32> {
        self.thermistor.as_ref()?.read_celsius()
    }
}
