//! Structural validation of a fridge configuration.

use std::collections::HashSet;

use crate::error::{ModelError, ModelResult};
use crate::fridge::Fridge;

/// Validate the fridge structure: unique ids, unique stage ordering, positive
/// cooling powers, non-negative stage temperatures, and exactly one segment
/// per (line, stage) pair, each referencing an existing stage and line.
///
/// Cable references are deliberately not checked here: a missing cable is a
/// run-time error surfaced by load evaluation, not a structural invariant.
pub fn validate(fridge: &Fridge) -> ModelResult<()> {
    let mut stage_ids = HashSet::new();
    let mut stage_indices = HashSet::new();
    for stage in &fridge.stages {
        if !stage_ids.insert(stage.id.as_str()) {
            return Err(ModelError::DuplicateId {
                kind: "stage",
                id: stage.id.clone(),
            });
        }
        if !stage_indices.insert(stage.index) {
            return Err(ModelError::DuplicateStageIndex { index: stage.index });
        }
        // Cooling power divides loads downstream; zero or NaN must not pass.
        if !(stage.cooling_power > 0.0) {
            return Err(ModelError::NonPositiveCoolingPower {
                stage: stage.id.clone(),
                value: stage.cooling_power,
            });
        }
        if !(stage.temperature >= 0.0) {
            return Err(ModelError::NegativeTemperature {
                stage: stage.id.clone(),
                value: stage.temperature,
            });
        }
    }

    let mut line_ids = HashSet::new();
    for line in &fridge.lines {
        if !line_ids.insert(line.id.as_str()) {
            return Err(ModelError::DuplicateId {
                kind: "line",
                id: line.id.clone(),
            });
        }
    }

    let mut cable_ids = HashSet::new();
    for cable in &fridge.cables {
        if !cable_ids.insert(cable.id.as_str()) {
            return Err(ModelError::DuplicateId {
                kind: "cable",
                id: cable.id.clone(),
            });
        }
    }

    let mut seen_pairs = HashSet::new();
    for segment in &fridge.segments {
        if !line_ids.contains(segment.line_id.as_str()) {
            return Err(ModelError::LineNotFound(segment.line_id.clone()));
        }
        if !stage_ids.contains(segment.stage_id.as_str()) {
            return Err(ModelError::StageNotFound(segment.stage_id.clone()));
        }
        if !seen_pairs.insert((segment.line_id.as_str(), segment.stage_id.as_str())) {
            return Err(ModelError::DuplicateSegment {
                line: segment.line_id.clone(),
                stage: segment.stage_id.clone(),
            });
        }
    }

    // Each line must be wired through every stage: the segments of a line form
    // its complete path from room temperature to the coldest stage.
    for line in &fridge.lines {
        for stage in &fridge.stages {
            if !seen_pairs.contains(&(line.id.as_str(), stage.id.as_str())) {
                return Err(ModelError::SegmentNotFound {
                    line: line.id.clone(),
                    stage: stage.id.clone(),
                });
            }
        }
    }

    Ok(())
}
