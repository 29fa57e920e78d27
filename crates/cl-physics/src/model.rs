//! The cryogenic model trait.

use std::collections::HashMap;

use cl_model::{CablePoint, TempEstimationPoint, ThermalScheme};

use crate::error::PhysicsResult;

/// Per-stage scalar result keyed by stage id.
pub type StageLoads = HashMap<String, f64>;

/// A (conductivity, diameter-label) pair fed to the passive-load evaluator.
///
/// The label is the outer conductor diameter in units of 10 um (see
/// `Cable::diameter_label`), which the backend uses to select a conductivity
/// curve.
pub type ThermalConductivity = (f64, String);

/// The physics evaluator the engine is built around.
///
/// Implementations must be thread-safe (Send + Sync) so 2D grid cells can be
/// evaluated in parallel. All values are IEEE-754 doubles; NaN is a meaningful
/// "infeasible/out of bounds" sentinel that implementations must return rather
/// than turn into an error.
///
/// The noise spectral functions return `stage count + 1` values: index 0 is
/// the room-temperature contribution, index `i + 1` belongs to stage `i` in
/// warm-to-cold order.
pub trait CryoModel: Send + Sync {
    /// Evaluator name (for logging).
    fn name(&self) -> &str;

    /// Passive heat conducted through a cable, per stage.
    #[allow(clippy::too_many_arguments)]
    fn passive_load(
        &self,
        stage_ids: &[String],
        diameters: [f64; 3],
        lengths: &[f64],
        stage_temps: &[f64],
        therm_cond: &[ThermalConductivity; 3],
        therm_scheme: &ThermalScheme,
    ) -> PhysicsResult<StageLoads>;

    /// Active heat deposited by an AC signal, per stage.
    fn active_load_ac(
        &self,
        stage_ids: &[String],
        lengths: &[f64],
        attenuations: &[f64],
        cable_data: &[CablePoint],
        signal_power: f64,
        signal_frequency: f64,
    ) -> PhysicsResult<StageLoads>;

    /// Active heat deposited by DC resistive dissipation, per stage.
    fn active_load_dc(
        &self,
        stage_ids: &[String],
        diameters: [f64; 3],
        lengths: &[f64],
        attenuations: &[f64],
        input_current: f64,
        rho: f64,
    ) -> PhysicsResult<StageLoads>;

    /// Noise contribution of one drive line, per stage.
    fn drive_noise(
        &self,
        stage_ids: &[String],
        lengths: &[f64],
        stage_temps: &[f64],
        attenuations: &[f64],
        cable_data: &[CablePoint],
        frequency: f64,
    ) -> PhysicsResult<StageLoads>;

    /// Noise contribution of one flux line, per stage.
    fn flux_noise(
        &self,
        stage_ids: &[String],
        lengths: &[f64],
        stage_temps: &[f64],
        attenuations: &[f64],
        cable_data: &[CablePoint],
        frequency: f64,
    ) -> PhysicsResult<StageLoads>;

    /// Interpolate a cable's attenuation curve at `frequency` (GHz).
    fn cable_attenuation(&self, cable_data: &[CablePoint], frequency: f64) -> PhysicsResult<f64>;

    /// Unbounded temperature response: per-stage temperature for a per-stage
    /// absolute heat load vector.
    fn apply_t_stages(&self, heat_loads: &[f64]) -> PhysicsResult<Vec<f64>>;

    /// Photon flux noise spectrum; `stage count + 1` entries, RT first.
    #[allow(clippy::too_many_arguments)]
    fn noise_photons(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
    ) -> PhysicsResult<Vec<f64>>;

    /// Current noise spectrum; `stage count + 1` entries, RT first.
    #[allow(clippy::too_many_arguments)]
    fn noise_current(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
    ) -> PhysicsResult<Vec<f64>>;

    /// Voltage noise spectrum; `stage count + 1` entries, RT first.
    #[allow(clippy::too_many_arguments)]
    fn noise_voltage(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
    ) -> PhysicsResult<Vec<f64>>;

    /// Feed measured temperature-response calibration data to the backend.
    fn load_temperature_estimation(&self, data: &[TempEstimationPoint]) -> PhysicsResult<()>;
}
