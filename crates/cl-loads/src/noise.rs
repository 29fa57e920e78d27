//! Noise contributions of the signal lines.

use cl_model::{Fridge, SignalType};
use cl_physics::{CryoModel, StageLoads};

use crate::error::LoadResult;

/// Summed noise contribution of all Drive lines, per stage.
pub fn drive_noise<M: CryoModel + ?Sized>(model: &M, fridge: &Fridge) -> LoadResult<StageLoads> {
    line_noise(model, fridge, SignalType::Drive)
}

/// Summed noise contribution of all Flux lines, per stage.
pub fn flux_noise<M: CryoModel + ?Sized>(model: &M, fridge: &Fridge) -> LoadResult<StageLoads> {
    line_noise(model, fridge, SignalType::Flux)
}

fn line_noise<M: CryoModel + ?Sized>(
    model: &M,
    fridge: &Fridge,
    signal_type: SignalType,
) -> LoadResult<StageLoads> {
    let stage_ids = fridge.stage_ids();
    let stage_temps = fridge.stage_temperatures();
    let mut totals = StageLoads::new();
    for id in &stage_ids {
        totals.insert(id.clone(), 0.0);
    }

    for line in fridge.lines.iter().filter(|l| l.signal_type == signal_type) {
        let segments = fridge.line_segments(&line.id)?;
        let cable = fridge.line_cable(&line.id)?;
        let lengths: Vec<f64> = segments.iter().map(|s| s.length).collect();
        let attenuations: Vec<f64> = segments.iter().map(|s| s.attenuation).collect();
        let contribution = match signal_type {
            SignalType::Drive => model.drive_noise(
                &stage_ids,
                &lengths,
                &stage_temps,
                &attenuations,
                &cable.bivariate_cable_data,
                line.signal_frequency,
            )?,
            SignalType::Flux => model.flux_noise(
                &stage_ids,
                &lengths,
                &stage_temps,
                &attenuations,
                &cable.bivariate_cable_data,
                line.signal_frequency,
            )?,
            SignalType::Output => unreachable!("output lines carry no injected signal"),
        };
        for (stage, value) in contribution {
            if let Some(total) = totals.get_mut(&stage) {
                *total += value;
            }
        }
    }
    Ok(totals)
}
