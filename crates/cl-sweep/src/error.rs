//! Error types for the sweep engines.

use cl_core::ClError;
use cl_loads::LoadError;
use cl_model::ModelError;
use cl_physics::PhysicsError;
use thiserror::Error;

/// Errors that abort a sweep.
///
/// Structural and evaluator failures are fatal for the whole sweep; purely
/// numerical trouble inside a 2D cell is reported through
/// [`crate::CellOutcome`] instead and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    #[error(transparent)]
    Core(#[from] ClError),

    #[error("Topology error: {0}")]
    Model(#[from] ModelError),

    #[error("Physics evaluator error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Load aggregation error: {0}")]
    Load(#[from] LoadError),

    #[error("A range needs at least 2 points, got {points}")]
    DegenerateRange { points: usize },

    #[error("Logarithmic ranges need positive endpoints, got {value}")]
    LogEndpoint { value: f64 },

    #[error("Constraint gives negative attenuation {value} at sample {sample}, stage {stage}")]
    NegativeConstraint {
        sample: usize,
        stage: usize,
        value: f64,
    },

    #[error("Expected {expected} per-stage values, got {got}")]
    StageCount { expected: usize, got: usize },

    #[error("Expected {expected} load rows, got {got}")]
    RowCount { expected: usize, got: usize },

    #[error("Sweep cancelled")]
    Cancelled,
}

pub type SweepResult<T> = Result<T, SweepError>;
