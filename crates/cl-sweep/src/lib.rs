//! cl-sweep: parameter sweeps over fridge wiring configurations.
//!
//! Builds on `cl-loads` to evaluate whole attenuation sweeps: sampled axes
//! with constraint-driven per-stage configurations, the bounded stage
//! temperature response, a 1D sweep producing named plot series, and a 2D
//! sweep that converges the heat-load / temperature feedback per grid cell.

pub mod bounds;
pub mod error;
pub mod range;
pub mod shape;
pub mod sweep1d;
pub mod sweep2d;

pub use bounds::{StageBound, StageBounds};
pub use error::{SweepError, SweepResult};
pub use range::{Axis, linspace, logspace, validate_constraints};
pub use shape::rotate_2d;
pub use sweep1d::{Sweep1d, sweep_model};
pub use sweep2d::{CellOutcome, NoiseSummary, Sweep2d, Sweep2dOptions, sweep_model_2d};
