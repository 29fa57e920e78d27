//! Bounded stage temperature response.
//!
//! Each stage has an operating heat-load window; a total load outside any
//! window means the fridge cannot reach equilibrium there, and the response
//! is an all-NaN sentinel instead of a temperature vector.

use cl_physics::CryoModel;
use tracing::warn;

use crate::error::{SweepError, SweepResult};

/// Operating limits of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageBound {
    pub label: String,
    /// Lowest admissible total heat load (W).
    pub lower: f64,
    /// Highest admissible total heat load (W).
    pub upper: f64,
    /// Minimum load fed to the evaluator; loads below it are raised to it
    /// before the bounds check (still circulation keeps a floor load).
    pub floor: Option<f64>,
    /// Seed temperature for fixed-point iteration (K).
    pub initial_guess: f64,
}

/// The per-stage bounds table, warm to cold.
#[derive(Debug, Clone, PartialEq)]
pub struct StageBounds {
    bounds: Vec<StageBound>,
}

impl Default for StageBounds {
    /// Limits of the reference 5-stage fridge (50K, 4K, Still, CP, MXC).
    fn default() -> Self {
        let bound = |label: &str, lower: f64, upper: f64, floor: Option<f64>, guess: f64| {
            StageBound {
                label: label.to_string(),
                lower,
                upper,
                floor,
                initial_guess: guess,
            }
        };
        Self {
            bounds: vec![
                bound("50K", 0.0, 5.0, None, 4.20111000e1),
                bound("4K", 0.0, 1.0, None, 3.41026571e0),
                bound("Still", 1e-2, 5e-2, Some(3e-2), 1.20520821e0),
                bound("CP", 0.0, 1e-3, None, 1.63359036e-1),
                bound("MXC", 0.0, 8e-4, None, 1.64774143e-2),
            ],
        }
    }
}

impl StageBounds {
    pub fn new(bounds: Vec<StageBound>) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &[StageBound] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Seed temperatures for the fixed-point loop, warm to cold.
    pub fn initial_guesses(&self) -> Vec<f64> {
        self.bounds.iter().map(|b| b.initial_guess).collect()
    }

    /// Temperature response of `loads`, NaN-filled when any stage is outside
    /// its operating window.
    ///
    /// Floors apply before the window check, so a floored stage is judged on
    /// the load the evaluator will actually see. NaN loads compare false
    /// against both limits and pass through to the evaluator.
    pub fn apply_bounded_t_stages(
        &self,
        model: &dyn CryoModel,
        loads: &[f64],
    ) -> SweepResult<Vec<f64>> {
        if loads.len() != self.bounds.len() {
            return Err(SweepError::StageCount {
                expected: self.bounds.len(),
                got: loads.len(),
            });
        }

        let floored: Vec<f64> = loads
            .iter()
            .zip(&self.bounds)
            .map(|(&load, bound)| bound.floor.map_or(load, |floor| load.max(floor)))
            .collect();

        let mut out_of_bounds = false;
        for (&load, bound) in floored.iter().zip(&self.bounds) {
            if load < bound.lower || load > bound.upper {
                warn!(
                    stage = %bound.label,
                    load,
                    lower = bound.lower,
                    upper = bound.upper,
                    "heat load outside the stage operating window"
                );
                out_of_bounds = true;
            }
        }
        if out_of_bounds {
            return Ok(vec![f64::NAN; loads.len()]);
        }

        Ok(model.apply_t_stages(&floored)?)
    }
}
