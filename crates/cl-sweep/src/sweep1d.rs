//! 1D attenuation sweep.
//!
//! Sweeps one line's per-stage attenuation along a sampled axis and shapes
//! the results into named plot series: per-line and total heat loads
//! (cooling-power normalized), equilibrium stage temperatures for the total
//! absolute load, and noise spectra at every sample.

use cl_loads::{LoadKind, generate_line_load_outputs, line_cable_attenuation_points};
use cl_model::Fridge;
use cl_physics::{ConstraintEvaluator, CryoModel};
use tracing::debug;

use crate::bounds::StageBounds;
use crate::error::SweepResult;
use crate::range::{Axis, validate_constraints};
use crate::shape::{noise_spectra, stage_value};

const NOISE_LABELS: [&str; 3] = ["Photons", "Current", "Voltage"];

/// Named series of a finished 1D sweep.
#[derive(Debug, Clone)]
pub struct Sweep1d {
    /// Series in emission order: per-stage line loads, line totals, stage
    /// totals, temperatures, noise, and finally `range`.
    pub series: Vec<(String, Vec<f64>)>,
    /// The (line id, kind label) pairs actually produced, including the
    /// synthetic `Total` entries for lines with both a passive and an
    /// active row.
    pub line_kinds: Vec<(String, String)>,
}

impl Sweep1d {
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }
}

struct Sample {
    /// Cooling-normalized loads, rows x stages.
    norm: Vec<Vec<f64>>,
    /// Bounded temperatures of the summed absolute loads (may be NaN).
    total_temps: Vec<f64>,
}

/// Sweep `line_id`'s attenuation configuration over `axis`.
///
/// `constraints` holds one expression per stage (warm to cold) in the sweep
/// variable `x`; every sample derives a hypothetical fridge with that line's
/// attenuations replaced and re-evaluates all load categories. Negative
/// constraint values abort the sweep.
#[allow(clippy::too_many_arguments)]
pub fn sweep_model(
    model: &dyn CryoModel,
    eval: &dyn ConstraintEvaluator,
    fridge: &Fridge,
    axis: &Axis,
    constraints: &[String],
    line_id: &str,
    linear: bool,
    bounds: &StageBounds,
) -> SweepResult<Sweep1d> {
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

    let range = axis.resolve(linear)?;
    let configs = eval.constraint_generation(constraints, &range)?;
    validate_constraints(&configs)?;
    debug!(line = %line_id, points = range.len(), linear, "1D sweep");

    let mut samples: Vec<Sample> = Vec::with_capacity(range.len());
    let mut row_tags: Vec<(String, LoadKind)> = Vec::new();
    for config in &configs {
        let derived = fridge.with_line_attenuation(line_id, config)?;
        let rows = generate_line_load_outputs(model, &derived, false)?;
        row_tags = rows
            .iter()
            .map(|r| (r.line.id.clone(), r.kind))
            .collect();

        let mut norm: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
        let mut total_abs = vec![0.0; stage_ids.len()];
        for row in &rows {
            let mut values = Vec::with_capacity(stage_ids.len());
            for (s, id) in stage_ids.iter().enumerate() {
                let value = stage_value(&row.output, id)?;
                total_abs[s] += value;
                values.push(value / cooling[s]);
            }
            norm.push(values);
        }
        let total_temps = bounds.apply_bounded_t_stages(model, &total_abs)?;
        samples.push(Sample { norm, total_temps });
    }

    // Row indices per line, in line declaration order. Drive and Flux lines
    // own a passive and an active row, Output lines a passive row only.
    let line_rows: Vec<Vec<usize>> = fridge
        .lines
        .iter()
        .map(|l| {
            row_tags
                .iter()
                .enumerate()
                .filter(|(_, (id, _))| *id == l.id)
                .map(|(r, _)| r)
                .collect()
        })
        .collect();

    let points = range.len();
    let mut series: Vec<(String, Vec<f64>)> = Vec::new();

    for (m, stage) in stage_ids.iter().enumerate() {
        for (r, (lid, kind)) in row_tags.iter().enumerate() {
            let values: Vec<f64> = samples.iter().map(|s| s.norm[r][m]).collect();
            series.push((format!("{stage}_{lid}{}", kind.label()), values));
        }

        let mut overall = vec![0.0; points];
        for rows in &line_rows {
            match rows.as_slice() {
                [a, b] => {
                    let sum: Vec<f64> = samples
                        .iter()
                        .map(|s| s.norm[*a][m] + s.norm[*b][m])
                        .collect();
                    for (total, value) in overall.iter_mut().zip(&sum) {
                        *total += value;
                    }
                    series.push((format!("{stage}_{}Total", row_tags[*a].0), sum));
                }
                [a] => {
                    for (k, total) in overall.iter_mut().enumerate() {
                        *total += samples[k].norm[*a][m];
                    }
                }
                _ => {}
            }
        }
        series.push((format!("{stage}_TotalHeatLoad"), overall));
    }

    for (m, stage) in stage_ids.iter().enumerate() {
        let values: Vec<f64> = samples.iter().map(|s| s.total_temps[m]).collect();
        series.push((format!("{stage}_TotalTemperature"), values));
    }

    // Noise at every sample, evaluated at the total-load temperatures with
    // the sample's attenuation config.
    let mut noise = Vec::with_capacity(points);
    for (sample, config) in samples.iter().zip(&configs) {
        noise.push(noise_spectra(
            model,
            &sample.total_temps,
            config,
            &cable_att,
            &lengths,
            &stage_ids,
            frequency,
        )?);
    }

    for (t, label) in NOISE_LABELS.iter().enumerate() {
        let mut total = vec![0.0; points];
        for (m, stage) in stage_ids.iter().enumerate() {
            let values: Vec<f64> = noise.iter().map(|n| n[t][m + 1]).collect();
            for (k, value) in values.iter().enumerate() {
                total[k] += value;
            }
            series.push((format!("{stage}_Noise{label}"), values));
        }
        let rt: Vec<f64> = noise.iter().map(|n| n[t][0]).collect();
        for (k, value) in rt.iter().enumerate() {
            total[k] += value;
        }
        series.push((format!("RT_Noise{label}"), rt));
        series.push((format!("total_Noise{label}"), total));
    }

    series.push(("range".to_string(), range));

    let mut line_kinds: Vec<(String, String)> = Vec::new();
    for (l, line) in fridge.lines.iter().enumerate() {
        for &r in &line_rows[l] {
            line_kinds.push((line.id.clone(), row_tags[r].1.label().to_string()));
        }
        if line_rows[l].len() == 2 {
            line_kinds.push((line.id.clone(), "Total".to_string()));
        }
    }

    Ok(Sweep1d { series, line_kinds })
}
