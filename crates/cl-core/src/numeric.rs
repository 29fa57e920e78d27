use crate::ClError;

/// Floating point type used throughout the engine.
pub type Real = f64;

/// Absolute-plus-relative comparison tolerances.
///
/// The absolute part handles values near zero, the relative part everything
/// else; a comparison passes when either does.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// True when `a` and `b` agree within this tolerance pair.
    ///
    /// NaN on either side never matches, including NaN against itself.
    pub fn matches(&self, a: Real, b: Real) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    tol.matches(a, b)
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, ClError> {
    if v.is_finite() {
        return Ok(v);
    }
    Err(ClError::NonFinite { what, value: v })
}
