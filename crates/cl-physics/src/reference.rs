//! Closed-form reference backend.
//!
//! A deterministic, dependency-free stand-in for the real cryogenic numerics.
//! The magnitudes are representative rather than calibrated: passive loads
//! follow anchored-layer conductivity times temperature drop, active loads
//! follow attenuated signal power, and the temperature response relaxes each
//! stage toward its base temperature with a weak load feedback (so fixed-point
//! sweeps converge). Used by the engine's test suites and as a template for
//! wiring a real backend.

use cl_model::{CablePoint, TempEstimationPoint, ThermalScheme};

use crate::error::{PhysicsError, PhysicsResult};
use crate::model::{CryoModel, StageLoads, ThermalConductivity};

/// Ambient temperature seen by the warmest stage (K).
const ROOM_TEMPERATURE: f64 = 295.0;

/// Reference analytic evaluator.
#[derive(Debug, Clone)]
pub struct AnalyticModel {
    /// Equilibrium stage temperatures with no load (K), warm to cold.
    pub base_temperatures: Vec<f64>,
    /// Load scale per stage (W); the temperature response is linear in
    /// `load / capacity`.
    pub load_capacities: Vec<f64>,
    /// Feedback strength of load on temperature.
    pub damping: f64,
}

impl Default for AnalyticModel {
    fn default() -> Self {
        // The reference 5-stage fridge: 50K, 4K, Still, CP, MXC.
        Self {
            base_temperatures: vec![46.0, 3.94, 1.227, 0.15, 0.02],
            load_capacities: vec![5.0, 1.0, 5e-2, 1e-3, 8e-4],
            damping: 0.1,
        }
    }
}

impl AnalyticModel {
    fn check_len(&self, what: &str, got: usize, expected: usize) -> PhysicsResult<()> {
        if got != expected {
            return Err(PhysicsError::Evaluation {
                what: format!("{what}: expected {expected} entries, got {got}"),
            });
        }
        Ok(())
    }

    fn db_to_power_ratio(db: f64) -> f64 {
        10f64.powf(-db / 10.0)
    }

    fn db_to_amplitude_ratio(db: f64) -> f64 {
        10f64.powf(-db / 20.0)
    }

    fn noise_spectrum(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
        scale: f64,
    ) -> PhysicsResult<Vec<f64>> {
        let n = stage_ids.len();
        self.check_len("temperatures", temperatures.len(), n)?;
        self.check_len("attenuations", attenuations.len(), n)?;
        self.check_len("cable attenuations", cable_atts.len(), n)?;
        self.check_len("lengths", lengths.len(), n)?;

        let mut spectrum = Vec::with_capacity(n + 1);
        spectrum.push(scale * ROOM_TEMPERATURE / (1.0 + frequency));
        for i in 0..n {
            let transmitted = Self::db_to_power_ratio(attenuations[i] + cable_atts[i] * lengths[i]);
            spectrum.push(scale * temperatures[i] * transmitted / (1.0 + frequency));
        }
        Ok(spectrum)
    }
}

impl CryoModel for AnalyticModel {
    fn name(&self) -> &str {
        "analytic-reference"
    }

    fn passive_load(
        &self,
        stage_ids: &[String],
        diameters: [f64; 3],
        lengths: &[f64],
        stage_temps: &[f64],
        therm_cond: &[ThermalConductivity; 3],
        therm_scheme: &ThermalScheme,
    ) -> PhysicsResult<StageLoads> {
        let n = stage_ids.len();
        self.check_len("lengths", lengths.len(), n)?;
        self.check_len("stage temperatures", stage_temps.len(), n)?;
        for layer in therm_scheme {
            self.check_len("thermal scheme", layer.len(), n)?;
        }

        let mut loads = StageLoads::with_capacity(n);
        for i in 0..n {
            let warm_side = if i == 0 {
                ROOM_TEMPERATURE
            } else {
                stage_temps[i - 1]
            };
            let delta_t = (warm_side - stage_temps[i]).max(0.0);
            let mut conductance = 0.0;
            for layer in 0..3 {
                if therm_scheme[layer][i] {
                    conductance += therm_cond[layer].0 * diameters[layer];
                }
            }
            loads.insert(stage_ids[i].clone(), conductance * delta_t * lengths[i]);
        }
        Ok(loads)
    }

    fn active_load_ac(
        &self,
        stage_ids: &[String],
        lengths: &[f64],
        attenuations: &[f64],
        cable_data: &[CablePoint],
        signal_power: f64,
        signal_frequency: f64,
    ) -> PhysicsResult<StageLoads> {
        let n = stage_ids.len();
        self.check_len("lengths", lengths.len(), n)?;
        self.check_len("attenuations", attenuations.len(), n)?;
        let att_per_meter = self.cable_attenuation(cable_data, signal_frequency)?;

        let mut loads = StageLoads::with_capacity(n);
        let mut incoming = signal_power;
        for i in 0..n {
            let stage_att = attenuations[i] + att_per_meter * lengths[i];
            let transmitted = incoming * Self::db_to_power_ratio(stage_att);
            loads.insert(stage_ids[i].clone(), incoming - transmitted);
            incoming = transmitted;
        }
        Ok(loads)
    }

    fn active_load_dc(
        &self,
        stage_ids: &[String],
        diameters: [f64; 3],
        lengths: &[f64],
        attenuations: &[f64],
        input_current: f64,
        rho: f64,
    ) -> PhysicsResult<StageLoads> {
        let n = stage_ids.len();
        self.check_len("lengths", lengths.len(), n)?;
        self.check_len("attenuations", attenuations.len(), n)?;

        let core_area = std::f64::consts::FRAC_PI_4 * diameters[0] * diameters[0];
        if core_area <= 0.0 {
            return Err(PhysicsError::Evaluation {
                what: "inner conductor diameter must be positive".into(),
            });
        }
        let resistance_per_meter = rho / core_area;

        let mut loads = StageLoads::with_capacity(n);
        let mut current = input_current;
        for i in 0..n {
            loads.insert(
                stage_ids[i].clone(),
                current * current * resistance_per_meter * lengths[i],
            );
            current *= Self::db_to_amplitude_ratio(attenuations[i]);
        }
        Ok(loads)
    }

    fn drive_noise(
        &self,
        stage_ids: &[String],
        lengths: &[f64],
        stage_temps: &[f64],
        attenuations: &[f64],
        cable_data: &[CablePoint],
        frequency: f64,
    ) -> PhysicsResult<StageLoads> {
        let n = stage_ids.len();
        self.check_len("lengths", lengths.len(), n)?;
        self.check_len("stage temperatures", stage_temps.len(), n)?;
        self.check_len("attenuations", attenuations.len(), n)?;
        let att_per_meter = self.cable_attenuation(cable_data, frequency)?;

        let mut record = StageLoads::with_capacity(n);
        for i in 0..n {
            let transmitted =
                Self::db_to_power_ratio(attenuations[i] + att_per_meter * lengths[i]);
            record.insert(
                stage_ids[i].clone(),
                1e-3 * stage_temps[i] * transmitted / (1.0 + frequency),
            );
        }
        Ok(record)
    }

    fn flux_noise(
        &self,
        stage_ids: &[String],
        lengths: &[f64],
        stage_temps: &[f64],
        attenuations: &[f64],
        cable_data: &[CablePoint],
        frequency: f64,
    ) -> PhysicsResult<StageLoads> {
        let n = stage_ids.len();
        self.check_len("lengths", lengths.len(), n)?;
        self.check_len("stage temperatures", stage_temps.len(), n)?;
        self.check_len("attenuations", attenuations.len(), n)?;
        let att_per_meter = self.cable_attenuation(cable_data, frequency)?;

        let mut record = StageLoads::with_capacity(n);
        for i in 0..n {
            let transmitted =
                Self::db_to_amplitude_ratio(attenuations[i] + att_per_meter * lengths[i]);
            record.insert(
                stage_ids[i].clone(),
                1e-2 * stage_temps[i] * transmitted / (1.0 + frequency),
            );
        }
        Ok(record)
    }

    fn cable_attenuation(&self, cable_data: &[CablePoint], frequency: f64) -> PhysicsResult<f64> {
        if cable_data.len() < 2 {
            return Err(PhysicsError::DegenerateCurve {
                got: cable_data.len(),
            });
        }

        // Clamp outside the tabulated range, interpolate linearly inside.
        let first = &cable_data[0];
        let last = &cable_data[cable_data.len() - 1];
        if frequency <= first.frequency {
            return Ok(first.attenuation);
        }
        if frequency >= last.frequency {
            return Ok(last.attenuation);
        }
        for pair in cable_data.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if frequency <= hi.frequency {
                let span = hi.frequency - lo.frequency;
                let t = if span > 0.0 {
                    (frequency - lo.frequency) / span
                } else {
                    0.0
                };
                return Ok(lo.attenuation + t * (hi.attenuation - lo.attenuation));
            }
        }
        Ok(last.attenuation)
    }

    fn apply_t_stages(&self, heat_loads: &[f64]) -> PhysicsResult<Vec<f64>> {
        self.check_len(
            "heat loads",
            heat_loads.len(),
            self.base_temperatures.len(),
        )?;
        Ok(heat_loads
            .iter()
            .zip(&self.base_temperatures)
            .zip(&self.load_capacities)
            .map(|((&load, &base), &cap)| base * (1.0 + self.damping * load / cap))
            .collect())
    }

    fn noise_photons(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
    ) -> PhysicsResult<Vec<f64>> {
        self.noise_spectrum(
            temperatures,
            attenuations,
            cable_atts,
            lengths,
            stage_ids,
            frequency,
            1e-1,
        )
    }

    fn noise_current(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
    ) -> PhysicsResult<Vec<f64>> {
        self.noise_spectrum(
            temperatures,
            attenuations,
            cable_atts,
            lengths,
            stage_ids,
            frequency,
            1e-3,
        )
    }

    fn noise_voltage(
        &self,
        temperatures: &[f64],
        attenuations: &[f64],
        cable_atts: &[f64],
        lengths: &[f64],
        stage_ids: &[String],
        frequency: f64,
    ) -> PhysicsResult<Vec<f64>> {
        self.noise_spectrum(
            temperatures,
            attenuations,
            cable_atts,
            lengths,
            stage_ids,
            frequency,
            1e-5,
        )
    }

    fn load_temperature_estimation(&self, data: &[TempEstimationPoint]) -> PhysicsResult<()> {
        for (i, point) in data.iter().enumerate() {
            if point.applied_power.len() != point.measured_temperature.len() {
                return Err(PhysicsError::Evaluation {
                    what: format!(
                        "temperature estimation point {i}: {} powers vs {} temperatures",
                        point.applied_power.len(),
                        point.measured_temperature.len()
                    ),
                });
            }
        }
        Ok(())
    }
}
