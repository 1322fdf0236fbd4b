//! Inbound commands to the pipeline.
//!
//! These represent actions requested by the outside world (temperature
//! collaborator, operator recalibration) that the
//! [`PipelineState`](super::service::PipelineState) interprets.

use crate::pipeline::Calibration;

#[derive(Debug, Clone, Copy)]
pub enum AppCommand {
    /// New water temperature for compensation (°C).
    SetTemperature(f32),

    /// Operator recalibration: reference voltage, ADC divisor, K factor and
    /// temperature replaced together.
    UpdateCalibration(Calibration),

    /// Zero the sample window and restart warm-up.
    ResetWindow,
}
