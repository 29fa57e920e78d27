//! cl-physics: evaluator seams for cryoline.
//!
//! The engine treats the actual cryogenic numerics as an external
//! collaborator behind the [`CryoModel`] trait, and user constraint
//! expressions as an opaque language behind [`ConstraintEvaluator`].
//! [`AnalyticModel`] and [`ExprEvaluator`] are closed-form reference
//! implementations, deterministic enough to test the whole engine against.

pub mod error;
pub mod eval;
pub mod expr;
pub mod model;
pub mod reference;

pub use error::{PhysicsError, PhysicsResult};
pub use eval::ConstraintEvaluator;
pub use expr::ExprEvaluator;
pub use model::{CryoModel, StageLoads, ThermalConductivity};
pub use reference::AnalyticModel;
