//! The constraint-expression evaluator seam.

use crate::error::PhysicsResult;

/// Evaluates user constraint expressions against numeric bindings.
///
/// The engine is deliberately decoupled from any particular expression
/// language: all it needs is `evaluate`. The provided methods build the
/// attenuation configurations the sweep engines consume.
pub trait ConstraintEvaluator: Send + Sync {
    /// Evaluate one expression with the given variable bindings.
    fn evaluate(&self, expr: &str, bindings: &[(&str, f64)]) -> PhysicsResult<f64>;

    /// Evaluate one expression per stage against every sample of `range`,
    /// binding the sweep variable as `x`. Returns a `range.len() x
    /// exprs.len()` matrix of attenuation overrides.
    fn constraint_generation(
        &self,
        exprs: &[String],
        range: &[f64],
    ) -> PhysicsResult<Vec<Vec<f64>>> {
        let mut configs = Vec::with_capacity(range.len());
        for &x in range {
            let mut row = Vec::with_capacity(exprs.len());
            for expr in exprs {
                row.push(self.evaluate(expr, &[("x", x)])?);
            }
            configs.push(row);
        }
        Ok(configs)
    }

    /// Evaluate the per-stage expressions once at a concrete (x, y) point.
    fn specific_constraint_generation(
        &self,
        exprs: &[String],
        x: f64,
        y: f64,
    ) -> PhysicsResult<Vec<f64>> {
        exprs
            .iter()
            .map(|expr| self.evaluate(expr, &[("x", x), ("y", y)]))
            .collect()
    }
}
