//! Load aggregation across the fridge topology.

use cl_model::{Cable, Fridge, Segment, SignalType, thermal_scheme};
use cl_physics::{CryoModel, StageLoads, ThermalConductivity};
use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::output::{LineLoadOutput, LoadKind};

/// Empirical fraction of AC dissipation retained as heat. Documented model
/// constant; preserve exactly.
pub const AC_ACTIVE_SCALE: f64 = 0.33;

/// DC counterpart of [`AC_ACTIVE_SCALE`]; a no-op kept for symmetry.
pub const DC_ACTIVE_SCALE: f64 = 1.0;

/// Conductivity triple for a single-cable line: inner conductor, dielectric,
/// outer conductor.
///
/// The dielectric pair carries a fixed conductivity of 0; this is a known
/// modeling simplification the backend expects, not a gap to fill in.
fn conductivity_triple(cable: &Cable) -> [ThermalConductivity; 3] {
    let label = cable.diameter_label();
    [
        (cable.thermal_conductivity_value, label.clone()),
        (0.0, label.clone()),
        (cable.thermal_conductivity_value, label),
    ]
}

fn evaluate_passive<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
    cable: &Cable,
    segments: &[&Segment],
) -> LoadResult<StageLoads> {
    let stages = fridge.stages_ordered();
    let scheme = thermal_scheme(&stages, segments)?;
    let lengths: Vec<f64> = segments.iter().map(|s| s.length).collect();
    let loads = model.passive_load(
        &fridge.stage_ids(),
        cable.diameters,
        &lengths,
        &fridge.stage_temperatures(),
        &conductivity_triple(cable),
        &scheme,
    )?;
    Ok(loads)
}

fn stage_value(output: &StageLoads, stage_id: &str) -> LoadResult<f64> {
    output
        .get(stage_id)
        .copied()
        .ok_or_else(|| LoadError::MissingStageValue {
            stage: stage_id.to_string(),
        })
}

/// Passive load of every Drive line, one record per line.
pub fn passive_drive_load<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
) -> LoadResult<Vec<LineLoadOutput>> {
    passive_single_cable(model, fridge, SignalType::Drive)
}

/// Passive load of every Flux line, one record per line.
pub fn passive_flux_load<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
) -> LoadResult<Vec<LineLoadOutput>> {
    passive_single_cable(model, fridge, SignalType::Flux)
}

fn passive_single_cable<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
    signal_type: SignalType,
) -> LoadResult<Vec<LineLoadOutput>> {
    let mut results = Vec::new();
    for line in fridge.lines.iter().filter(|l| l.signal_type == signal_type) {
        let segments = fridge.line_segments(&line.id)?;
        let cable = fridge.line_cable(&line.id)?;
        let output = evaluate_passive(model, fridge, cable, &segments)?;
        results.push(LineLoadOutput {
            output,
            line: line.clone(),
            kind: LoadKind::Passive,
        });
    }
    Ok(results)
}

/// Passive load of every Output line.
///
/// Output lines may change cable type along their path. Each distinct cable
/// is evaluated independently over the full path, then every stage takes the
/// contribution of the cable that actually occupies that stage's segment.
pub fn passive_output_load<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
) -> LoadResult<Vec<LineLoadOutput>> {
    let mut results = Vec::new();
    for line in fridge
        .lines
        .iter()
        .filter(|l| l.signal_type == SignalType::Output)
    {
        let segments = fridge.line_segments(&line.id)?;
        let cables = fridge.line_cables(&line.id)?;

        let mut per_cable: Vec<(&str, StageLoads)> = Vec::with_capacity(cables.len());
        for cable in &cables {
            let output = evaluate_passive(model, fridge, cable, &segments)?;
            per_cable.push((cable.id.as_str(), output));
        }

        let mut output = StageLoads::new();
        for stage in fridge.stages_ordered() {
            let segment = fridge.segment(&line.id, &stage.id)?;
            let cable_output = per_cable
                .iter()
                .find(|(id, _)| *id == segment.cable_id)
                .map(|(_, o)| o)
                .ok_or_else(|| cl_model::ModelError::CableNotFound(segment.cable_id.clone()))?;
            *output.entry(stage.id.clone()).or_insert(0.0) +=
                stage_value(cable_output, &stage.id)?;
        }

        results.push(LineLoadOutput {
            output,
            line: line.clone(),
            kind: LoadKind::Passive,
        });
    }
    Ok(results)
}

/// Active AC dissipation of every Drive line.
pub fn active_drive_load<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
) -> LoadResult<Vec<LineLoadOutput>> {
    let mut results = Vec::new();
    for line in fridge
        .lines
        .iter()
        .filter(|l| l.signal_type == SignalType::Drive)
    {
        let segments = fridge.line_segments(&line.id)?;
        let cable = fridge.line_cable(&line.id)?;
        let mut output = model.active_load_ac(
            &fridge.stage_ids(),
            &segments.iter().map(|s| s.length).collect::<Vec<_>>(),
            &segments.iter().map(|s| s.attenuation).collect::<Vec<_>>(),
            &cable.bivariate_cable_data,
            line.signal_power,
            line.signal_frequency,
        )?;
        for value in output.values_mut() {
            *value *= AC_ACTIVE_SCALE;
        }
        results.push(LineLoadOutput {
            output,
            line: line.clone(),
            kind: LoadKind::Active,
        });
    }
    Ok(results)
}

/// Active DC dissipation of every Flux line.
pub fn active_flux_load<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
) -> LoadResult<Vec<LineLoadOutput>> {
    let mut results = Vec::new();
    for line in fridge
        .lines
        .iter()
        .filter(|l| l.signal_type == SignalType::Flux)
    {
        let segments = fridge.line_segments(&line.id)?;
        let cable = fridge.line_cable(&line.id)?;
        let mut output = model.active_load_dc(
            &fridge.stage_ids(),
            cable.diameters,
            &segments.iter().map(|s| s.length).collect::<Vec<_>>(),
            &segments.iter().map(|s| s.attenuation).collect::<Vec<_>>(),
            line.input_current,
            cable.rho,
        )?;
        for value in output.values_mut() {
            *value *= DC_ACTIVE_SCALE;
        }
        results.push(LineLoadOutput {
            output,
            line: line.clone(),
            kind: LoadKind::Active,
        });
    }
    Ok(results)
}

/// All five load categories in the canonical row order: passive drive,
/// passive flux, passive output, active drive, active flux.
pub fn generate_line_load_outputs<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
    apply_cooling: bool,
) -> LoadResult<Vec<LineLoadOutput>> {
    let mut outputs = Vec::new();
    outputs.extend(passive_drive_load(model, fridge)?);
    outputs.extend(passive_flux_load(model, fridge)?);
    outputs.extend(passive_output_load(model, fridge)?);
    outputs.extend(active_drive_load(model, fridge)?);
    outputs.extend(active_flux_load(model, fridge)?);
    debug!(rows = outputs.len(), apply_cooling, "aggregated line load rows");
    apply_line_transformations(fridge, outputs, apply_cooling)
}

/// Scale every record by its line's `count`; with `apply_cooling`,
/// additionally divide by each stage's cooling power to get dimensionless
/// load fractions.
pub fn apply_line_transformations(
    fridge: &Fridge,
    mut outputs: Vec<LineLoadOutput>,
    apply_cooling: bool,
) -> LoadResult<Vec<LineLoadOutput>> {
    let stages = fridge.stages_ordered();
    for row in &mut outputs {
        let count = f64::from(row.line.count);
        for stage in &stages {
            let value = row
                .output
                .get_mut(stage.id.as_str())
                .ok_or_else(|| LoadError::MissingStageValue {
                    stage: stage.id.clone(),
                })?;
            *value *= count;
            if apply_cooling {
                *value /= stage.cooling_power;
            }
        }
    }
    Ok(outputs)
}

/// Per-stage sum across all records, independent of kind.
pub fn sum_line_load_outputs(fridge: &Fridge, outputs: &[LineLoadOutput]) -> LoadResult<StageLoads> {
    let mut totals = StageLoads::new();
    for row in outputs {
        for stage in fridge.stages_ordered() {
            *totals.entry(stage.id.clone()).or_insert(0.0) += stage_value(&row.output, &stage.id)?;
        }
    }
    Ok(totals)
}

/// Attenuation of one segment's cable at its line's signal frequency.
pub fn cable_attenuation<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
    segment: &Segment,
) -> LoadResult<f64> {
    let cable = fridge.cable(&segment.cable_id)?;
    let line = fridge.line(&segment.line_id)?;
    Ok(model.cable_attenuation(&cable.bivariate_cable_data, line.signal_frequency)?)
}

/// Per-segment cable attenuation along a line's path, warm to cold.
///
/// Each segment is evaluated against its own cable's curve, so Output lines
/// that switch cable type mid-path are handled naturally.
pub fn line_cable_attenuation_points<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
    line_id: &str,
) -> LoadResult<Vec<f64>> {
    let line = fridge.line(line_id)?;
    let segments = fridge.line_segments(line_id)?;
    let mut points = Vec::with_capacity(segments.len());
    for segment in segments {
        let cable = fridge.cable(&segment.cable_id)?;
        points.push(model.cable_attenuation(&cable.bivariate_cable_data, line.signal_frequency)?);
    }
    Ok(points)
}
