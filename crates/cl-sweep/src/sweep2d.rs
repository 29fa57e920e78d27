//! 2D attenuation sweep with fixed-point temperature convergence.
//!
//! Every grid cell evaluates the per-stage constraint expressions at its
//! (x, y) point, derives a hypothetical fridge, and iterates the heat-load /
//! temperature feedback until the cooling-normalized load matrix stops
//! changing. Cells whose constraints go negative are infeasible and skipped;
//! cells whose loads leave the stage operating windows degrade to zeros.

use std::sync::atomic::{AtomicBool, Ordering};

use cl_loads::{generate_line_load_outputs, line_cable_attenuation_points};
use cl_model::{Fridge, SignalType};
use cl_physics::{ConstraintEvaluator, CryoModel, StageLoads};
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use crate::bounds::StageBounds;
use crate::error::{SweepError, SweepResult};
use crate::range::Axis;
use crate::shape::{noise_spectra, rotate_2d, stage_value};

/// Constraint values in `(CLAMP_WINDOW, 0)` are rounding noise and clamp to
/// an exact 0 instead of marking the cell infeasible.
const CLAMP_WINDOW: f64 = -1e-4;

/// How a grid cell's evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    /// The load matrix change dropped below the threshold.
    Converged,
    /// A constraint evaluated negative; the cell was never solved.
    Infeasible,
    /// A total load left its stage operating window mid-iteration.
    OutOfBounds,
    /// The iteration cap was reached without converging.
    MaxIterations,
}

/// Spectrum-summed noise of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseSummary {
    pub photons: f64,
    pub voltage: f64,
    pub current: f64,
}

#[derive(Debug, Clone)]
pub struct Sweep2dOptions {
    pub bounds: StageBounds,
    /// Relative load-matrix change below which a cell has converged.
    pub threshold: f64,
    /// Hard cap on fixed-point iterations per cell; hitting it degrades the
    /// cell like an out-of-bounds result instead of looping forever.
    pub max_iterations: usize,
    /// Evaluate grid rows on the rayon pool. Cells are independent and
    /// assembly is indexed, so results are identical either way.
    pub parallel: bool,
}

impl Default for Sweep2dOptions {
    fn default() -> Self {
        Self {
            bounds: StageBounds::default(),
            threshold: 5e-4,
            max_iterations: 100,
            parallel: false,
        }
    }
}

/// A finished 2D sweep. The grids are point-reflected for presentation
/// (see [`rotate_2d`]); the axis vectors are not.
#[derive(Debug, Clone)]
pub struct Sweep2d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Per cell: the target line's cooling-normalized load, per stage.
    pub heat_loads: Vec<Vec<StageLoads>>,
    /// Per cell: converged stage temperatures, zero-filled otherwise.
    pub temperatures: Vec<Vec<StageLoads>>,
    /// Per cell: summed noise spectra, zero-filled unless converged.
    pub noise: Vec<Vec<NoiseSummary>>,
    pub outcomes: Vec<Vec<CellOutcome>>,
}

struct Cell {
    loads: StageLoads,
    temps: StageLoads,
    noise: NoiseSummary,
    outcome: CellOutcome,
}

fn zero_loads(stage_ids: &[String]) -> StageLoads {
    stage_ids.iter().map(|id| (id.clone(), 0.0)).collect()
}

#[allow(clippy::too_many_arguments)]
fn evaluate_cell(
    model: &dyn CryoModel,
    eval: &dyn ConstraintEvaluator,
    fridge: &Fridge,
    line_id: &str,
    x: f64,
    y: f64,
    constraints: &[String],
    options: &Sweep2dOptions,
    cancel: Option<&AtomicBool>,
    stage_ids: &[String],
    cooling: &[f64],
    cable_att: &[f64],
    lengths: &[f64],
    frequency: f64,
) -> SweepResult<Cell> {
    let config: Vec<f64> = eval
        .specific_constraint_generation(constraints, x, y)?
        .into_iter()
        .map(|c| if c < 0.0 && c > CLAMP_WINDOW { 0.0 } else { c })
        .collect();

    if config.iter().any(|&c| c < 0.0) {
        return Ok(Cell {
            loads: zero_loads(stage_ids),
            temps: zero_loads(stage_ids),
            noise: NoiseSummary::default(),
            outcome: CellOutcome::Infeasible,
        });
    }

    let n = stage_ids.len();
    let row_count: usize = fridge
        .lines
        .iter()
        .map(|l| if l.signal_type == SignalType::Output { 1 } else { 2 })
        .sum();
    let derived = fridge.with_line_attenuation(line_id, &config)?;

    let mut t_est = options.bounds.initial_guesses();
    let mut prev = DMatrix::<f64>::zeros(row_count, n);
    let mut delta = DMatrix::<f64>::from_element(row_count, n, 1.0);
    let mut row_lines: Vec<String> = Vec::new();
    let mut outcome = CellOutcome::Converged;
    let mut iterations = 0usize;

    // NaN deltas compare false and therefore count as settled.
    while delta.iter().any(|&d| d > options.threshold) {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(SweepError::Cancelled);
            }
        }
        if iterations >= options.max_iterations {
            outcome = CellOutcome::MaxIterations;
            break;
        }

        let working = derived.with_stage_temperatures(&t_est)?;
        let rows = generate_line_load_outputs(model, &working, false)?;
        if rows.len() != row_count {
            return Err(SweepError::RowCount {
                expected: row_count,
                got: rows.len(),
            });
        }
        row_lines = rows.iter().map(|r| r.line.id.clone()).collect();

        let mut abs = DMatrix::<f64>::zeros(row_count, n);
        let mut totals = vec![0.0; n];
        for (r, row) in rows.iter().enumerate() {
            for (s, id) in stage_ids.iter().enumerate() {
                let value = stage_value(&row.output, id)?;
                abs[(r, s)] = value;
                totals[s] += value;
            }
        }

        t_est = options.bounds.apply_bounded_t_stages(model, &totals)?;
        if t_est.iter().any(|t| t.is_nan()) {
            outcome = CellOutcome::OutOfBounds;
            break;
        }

        let new = DMatrix::from_fn(row_count, n, |r, s| abs[(r, s)] / cooling[s]);
        delta = DMatrix::from_fn(row_count, n, |r, s| 1.0 - prev[(r, s)] / new[(r, s)]);
        prev = new;
        iterations += 1;
        debug!(x, y, iterations, "fixed-point iteration");
    }

    // Heat-load attribution: only the target line's rows of the last
    // cooling-normalized matrix count, whatever the outcome. Other lines
    // participate in the physics but not in the reported load.
    let mut loads = StageLoads::with_capacity(n);
    for (s, id) in stage_ids.iter().enumerate() {
        let mut sum = 0.0;
        for (r, line) in row_lines.iter().enumerate() {
            if line == line_id {
                sum += prev[(r, s)];
            }
        }
        loads.insert(id.clone(), sum);
    }

    if outcome != CellOutcome::Converged {
        return Ok(Cell {
            loads,
            temps: zero_loads(stage_ids),
            noise: NoiseSummary::default(),
            outcome,
        });
    }

    let temps: StageLoads = stage_ids
        .iter()
        .zip(&t_est)
        .map(|(id, &t)| (id.clone(), t))
        .collect();
    let [photons, current, voltage] =
        noise_spectra(model, &t_est, &config, cable_att, lengths, stage_ids, frequency)?;
    let noise = NoiseSummary {
        photons: photons.iter().sum(),
        voltage: voltage.iter().sum(),
        current: current.iter().sum(),
    };
    Ok(Cell {
        loads,
        temps,
        noise,
        outcome,
    })
}

/// Sweep `line_id` over a 2D grid of constraint variables.
///
/// `constraints` holds one expression per stage in the grid variables `x`
/// and `y`. `cancel` is polled between cells and between iterations; setting
/// it aborts the sweep with [`SweepError::Cancelled`].
#[allow(clippy::too_many_arguments)]
pub fn sweep_model_2d(
    model: &dyn CryoModel,
    eval: &dyn ConstraintEvaluator,
    fridge: &Fridge,
    line_id: &str,
    x_axis: &Axis,
    y_axis: &Axis,
    constraints: &[String],
    options: &Sweep2dOptions,
    cancel: Option<&AtomicBool>,
) -> SweepResult<Sweep2d> {
    let stage_ids = fridge.stage_ids();
    let cooling = fridge.cooling_powers();
    let line = fridge.line(line_id)?;
    let frequency = line.signal_frequency;
    let lengths: Vec<f64> = fridge
        .line_segments(line_id)?
        .iter()
        .map(|s| s.length)
        .collect();
    let cable_att = line_cable_attenuation_points(model, fridge, line_id)?;

    let x_range = x_axis.resolve(true)?;
    let y_range = y_axis.resolve(true)?;
    debug!(
        line = %line_id,
        x_points = x_range.len(),
        y_points = y_range.len(),
        parallel = options.parallel,
        "2D sweep"
    );

    let grid_row = |&x: &f64| -> SweepResult<Vec<Cell>> {
        y_range
            .iter()
            .map(|&y| {
                if let Some(flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        return Err(SweepError::Cancelled);
                    }
                }
                evaluate_cell(
                    model,
                    eval,
                    fridge,
                    line_id,
                    x,
                    y,
                    constraints,
                    options,
                    cancel,
                    &stage_ids,
                    &cooling,
                    &cable_att,
                    &lengths,
                    frequency,
                )
            })
            .collect()
    };

    let cells: Vec<Vec<Cell>> = if options.parallel {
        x_range.par_iter().map(grid_row).collect::<SweepResult<_>>()?
    } else {
        x_range.iter().map(grid_row).collect::<SweepResult<_>>()?
    };

    let loads: Vec<Vec<StageLoads>> = cells
        .iter()
        .map(|row| row.iter().map(|c| c.loads.clone()).collect())
        .collect();
    let temps: Vec<Vec<StageLoads>> = cells
        .iter()
        .map(|row| row.iter().map(|c| c.temps.clone()).collect())
        .collect();
    let noise: Vec<Vec<NoiseSummary>> = cells
        .iter()
        .map(|row| row.iter().map(|c| c.noise).collect())
        .collect();
    let outcomes: Vec<Vec<CellOutcome>> = cells
        .iter()
        .map(|row| row.iter().map(|c| c.outcome).collect())
        .collect();

    Ok(Sweep2d {
        x: x_range,
        y: y_range,
        heat_loads: rotate_2d(&loads),
        temperatures: rotate_2d(&temps),
        noise: rotate_2d(&noise),
        outcomes: rotate_2d(&outcomes),
    })
}
