//! Error types for evaluator backends.

use thiserror::Error;

/// Errors raised by a physics or constraint evaluator.
///
/// Any of these aborts the sweep that triggered the evaluation; the engine
/// performs no retries and produces no partial output on evaluator failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("Evaluator failure: {what}")]
    Evaluation { what: String },

    #[error("Cannot parse expression `{expr}`: {what}")]
    Parse { expr: String, what: String },

    #[error("Unknown variable `{name}` in constraint expression")]
    UnknownVariable { name: String },

    #[error("Cable curve needs at least 2 points, got {got}")]
    DegenerateCurve { got: usize },
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
