//! The fridge aggregate and derived-configuration builders.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::types::{Cable, Line, Segment, Stage, TempEstimationPoint};

/// A complete fridge wiring description.
///
/// The engine never mutates a `Fridge`; hypothetical sweep points are
/// represented by deriving new values with [`Fridge::with_line_attenuation`]
/// and [`Fridge::with_stage_temperatures`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fridge {
    pub stages: Vec<Stage>,
    pub cables: Vec<Cable>,
    pub lines: Vec<Line>,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub temperature_estimation_data: Vec<TempEstimationPoint>,
}

impl Fridge {
    /// Stages sorted warm to cold by `index`, regardless of declaration order.
    pub fn stages_ordered(&self) -> Vec<&Stage> {
        let mut stages: Vec<&Stage> = self.stages.iter().collect();
        stages.sort_by_key(|s| s.index);
        stages
    }

    /// Stage ids in warm-to-cold order.
    pub fn stage_ids(&self) -> Vec<String> {
        self.stages_ordered().iter().map(|s| s.id.clone()).collect()
    }

    /// Stage temperatures (K) in warm-to-cold order.
    pub fn stage_temperatures(&self) -> Vec<f64> {
        self.stages_ordered().iter().map(|s| s.temperature).collect()
    }

    /// Stage cooling powers (W) in warm-to-cold order.
    pub fn cooling_powers(&self) -> Vec<f64> {
        self.stages_ordered()
            .iter()
            .map(|s| s.cooling_power)
            .collect()
    }

    pub fn stage(&self, id: &str) -> ModelResult<&Stage> {
        self.stages
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ModelError::StageNotFound(id.to_string()))
    }

    pub fn line(&self, id: &str) -> ModelResult<&Line> {
        self.lines
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| ModelError::LineNotFound(id.to_string()))
    }

    pub fn cable(&self, id: &str) -> ModelResult<&Cable> {
        self.cables
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ModelError::CableNotFound(id.to_string()))
    }

    /// The segments of one line, ordered warm to cold by stage index.
    ///
    /// The returned slice is the physical path of the line from room
    /// temperature down to the coldest stage.
    pub fn line_segments(&self, line_id: &str) -> ModelResult<Vec<&Segment>> {
        let mut segments: Vec<&Segment> = self
            .segments
            .iter()
            .filter(|s| s.line_id == line_id)
            .collect();
        if segments.is_empty() {
            return Err(ModelError::NoSegments(line_id.to_string()));
        }

        // Order by the owning stage, not by insertion order.
        let order = |stage_id: &str| self.stage(stage_id).map(|s| s.index);
        for segment in &segments {
            order(&segment.stage_id)?;
        }
        segments.sort_by_key(|s| {
            // Lookup cannot fail: checked just above.
            self.stage(&s.stage_id).map(|stage| stage.index).unwrap_or(u32::MAX)
        });
        Ok(segments)
    }

    /// The segment wiring `line_id` through `stage_id`.
    pub fn segment(&self, line_id: &str, stage_id: &str) -> ModelResult<&Segment> {
        self.segments
            .iter()
            .find(|s| s.line_id == line_id && s.stage_id == stage_id)
            .ok_or_else(|| ModelError::SegmentNotFound {
                line: line_id.to_string(),
                stage: stage_id.to_string(),
            })
    }

    /// Every distinct cable used along one line, in path order.
    pub fn line_cables(&self, line_id: &str) -> ModelResult<Vec<&Cable>> {
        let segments = self.line_segments(line_id)?;
        let mut cables: Vec<&Cable> = Vec::new();
        for segment in segments {
            let cable = self.cable(&segment.cable_id)?;
            if !cables.iter().any(|c| c.id == cable.id) {
                cables.push(cable);
            }
        }
        if cables.is_empty() {
            return Err(ModelError::CableNotFound(line_id.to_string()));
        }
        Ok(cables)
    }

    /// The single cable of a line; errors if the line mixes cable types.
    ///
    /// Drive and Flux lines are single-cable by construction; only Output
    /// lines may legitimately use more than one (see `line_cables`).
    pub fn line_cable(&self, line_id: &str) -> ModelResult<&Cable> {
        let cables = self.line_cables(line_id)?;
        if cables.len() != 1 {
            return Err(ModelError::AmbiguousCable {
                line: line_id.to_string(),
                count: cables.len(),
            });
        }
        Ok(cables[0])
    }

    /// Derive a fridge with the target line's per-stage attenuation replaced.
    ///
    /// `config` holds one attenuation per stage in warm-to-cold order. Other
    /// lines and all stages/cables are carried over untouched; only the
    /// segment list is rebuilt.
    pub fn with_line_attenuation(&self, line_id: &str, config: &[f64]) -> ModelResult<Fridge> {
        let stage_ids = self.stage_ids();
        if config.len() != stage_ids.len() {
            return Err(ModelError::TemperatureCount {
                expected: stage_ids.len(),
                got: config.len(),
            });
        }

        let segments = self
            .segments
            .iter()
            .map(|segment| {
                let mut segment = segment.clone();
                if segment.line_id == line_id {
                    if let Some(pos) = stage_ids.iter().position(|s| *s == segment.stage_id) {
                        segment.attenuation = config[pos];
                    }
                }
                segment
            })
            .collect();

        Ok(Fridge {
            stages: self.stages.clone(),
            cables: self.cables.clone(),
            lines: self.lines.clone(),
            segments,
            temperature_estimation_data: self.temperature_estimation_data.clone(),
        })
    }

    /// Derive a fridge with new stage temperatures (warm-to-cold order).
    pub fn with_stage_temperatures(&self, temperatures: &[f64]) -> ModelResult<Fridge> {
        if temperatures.len() != self.stages.len() {
            return Err(ModelError::TemperatureCount {
                expected: self.stages.len(),
                got: temperatures.len(),
            });
        }

        let ordered_ids = self.stage_ids();
        let stages = self
            .stages
            .iter()
            .map(|stage| {
                let pos = ordered_ids
                    .iter()
                    .position(|id| *id == stage.id)
                    .unwrap_or(0);
                Stage {
                    id: stage.id.clone(),
                    index: stage.index,
                    temperature: temperatures[pos],
                    cooling_power: stage.cooling_power,
                }
            })
            .collect();

        Ok(Fridge {
            stages,
            cables: self.cables.clone(),
            lines: self.lines.clone(),
            segments: self.segments.clone(),
            temperature_estimation_data: self.temperature_estimation_data.clone(),
        })
    }
}
