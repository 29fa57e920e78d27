//! Error types for load aggregation.

use cl_model::ModelError;
use cl_physics::PhysicsError;
use thiserror::Error;

/// Errors that abort a load aggregation pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Topology error: {0}")]
    Model(#[from] ModelError),

    #[error("Physics evaluator error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Evaluator returned no value for stage {stage}")]
    MissingStageValue { stage: String },
}

pub type LoadResult<T> = Result<T, LoadError>;
