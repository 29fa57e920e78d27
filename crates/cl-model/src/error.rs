//! Error types for topology lookups and validation.

use thiserror::Error;

/// Errors raised while resolving or validating a fridge topology.
///
/// Every variant names the offending id so a failed sweep can report exactly
/// which part of the configuration is broken.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Stage {0} cannot be found")]
    StageNotFound(String),

    #[error("Line {0} cannot be found")]
    LineNotFound(String),

    #[error("Cable {0} cannot be found")]
    CableNotFound(String),

    #[error("No segments found for line {0}")]
    NoSegments(String),

    #[error("No segment found for stage {stage} on line {line}")]
    SegmentNotFound { line: String, stage: String },

    #[error("Stage {0} has no matching segment")]
    MissingSegment(String),

    #[error("Line {line} uses {count} cables; exactly one is required here")]
    AmbiguousCable { line: String, count: usize },

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Duplicate segment for stage {stage} on line {line}")]
    DuplicateSegment { line: String, stage: String },

    #[error("Stage index {index} is used by more than one stage")]
    DuplicateStageIndex { index: u32 },

    #[error("Expected {expected} stage temperatures, got {got}")]
    TemperatureCount { expected: usize, got: usize },

    #[error("Stage {stage} has non-positive cooling power {value}")]
    NonPositiveCoolingPower { stage: String, value: f64 },

    #[error("Stage {stage} has negative temperature {value}")]
    NegativeTemperature { stage: String, value: f64 },
}

pub type ModelResult<T> = Result<T, ModelError>;
