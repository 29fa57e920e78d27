//! Thermal anchoring scheme derivation.

use crate::error::{ModelError, ModelResult};
use crate::types::{Segment, Stage};

/// Per-layer anchoring flags, one per stage in warm-to-cold order:
/// `[inner, dielectric, outer]`.
pub type ThermalScheme = [Vec<bool>; 3];

/// Resolve the tri-state thermalisation flags of a line's segments into the
/// boolean scheme the passive-load evaluator consumes.
///
/// The flags are ordered by stage `index`, not by segment insertion order.
/// Every stage must have a matching segment; a gap in the wiring is an error,
/// not a default.
pub fn thermal_scheme(stages: &[&Stage], segments: &[&Segment]) -> ModelResult<ThermalScheme> {
    let mut ordered: Vec<&Segment> = Vec::with_capacity(stages.len());
    for stage in stages {
        let segment = segments
            .iter()
            .find(|s| s.stage_id == stage.id)
            .ok_or_else(|| ModelError::MissingSegment(stage.id.clone()))?;
        ordered.push(segment);
    }

    Ok([
        ordered.iter().map(|s| s.inner_thermalised()).collect(),
        ordered.iter().map(|s| s.dielectric_thermalised()).collect(),
        ordered.iter().map(|s| s.outer_thermalised()).collect(),
    ])
}
