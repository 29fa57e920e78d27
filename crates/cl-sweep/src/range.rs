//! Sweep axis ranges and constraint-matrix validation.

use cl_core::ensure_finite;

use crate::error::{SweepError, SweepResult};

/// One sweep axis: `points` samples from `start` to `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl Axis {
    pub fn new(start: f64, end: f64, points: usize) -> Self {
        Self { start, end, points }
    }

    /// Sample the axis, linearly or logarithmically.
    pub fn resolve(&self, linear: bool) -> SweepResult<Vec<f64>> {
        if linear {
            linspace(self.start, self.end, self.points)
        } else {
            logspace(self.start, self.end, self.points)
        }
    }
}

/// `points` evenly spaced samples; both endpoints exact.
pub fn linspace(start: f64, end: f64, points: usize) -> SweepResult<Vec<f64>> {
    if points < 2 {
        return Err(SweepError::DegenerateRange { points });
    }
    ensure_finite(start, "range start")?;
    ensure_finite(end, "range end")?;
    let step = (end - start) / (points - 1) as f64;
    let mut range: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
    // Pin the endpoint; accumulated rounding must not leak into the range.
    range[points - 1] = end;
    Ok(range)
}

/// `points` geometrically spaced samples; both endpoints exact and positive.
pub fn logspace(start: f64, end: f64, points: usize) -> SweepResult<Vec<f64>> {
    if points < 2 {
        return Err(SweepError::DegenerateRange { points });
    }
    ensure_finite(start, "range start")?;
    ensure_finite(end, "range end")?;
    for value in [start, end] {
        if value <= 0.0 {
            return Err(SweepError::LogEndpoint { value });
        }
    }
    let factor = (end / start).powf(1.0 / (points - 1) as f64);
    let mut range = Vec::with_capacity(points);
    range.push(start);
    for _ in 1..points - 1 {
        let last = *range.last().unwrap_or(&start);
        range.push(last * factor);
    }
    range.push(end);
    Ok(range)
}

/// Reject constraint matrices with negative attenuations before sweeping.
///
/// The 1D engine has no feasibility fallback, so a negative entry anywhere is
/// a caller error; the 2D engine instead degrades such cells (with a small
/// clamp window) and does not use this check.
pub fn validate_constraints(configs: &[Vec<f64>]) -> SweepResult<()> {
    for (sample, row) in configs.iter().enumerate() {
        for (stage, &value) in row.iter().enumerate() {
            if value < 0.0 {
                return Err(SweepError::NegativeConstraint {
                    sample,
                    stage,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn linspace_endpoints_and_spacing() {
        let range = linspace(0.0, 20.0, 3).unwrap();
        assert_eq!(range, vec![0.0, 10.0, 20.0]);

        let range = linspace(1.0, 2.0, 5).unwrap();
        assert_eq!(range[0], 1.0);
        assert_eq!(range[4], 2.0);
        for pair in range.windows(2) {
            assert!((pair[1] - pair[0] - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn linspace_supports_descending_ranges() {
        let range = linspace(10.0, 0.0, 3).unwrap();
        assert_eq!(range, vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn logspace_endpoints_are_exact() {
        let range = logspace(1.0, 1000.0, 4).unwrap();
        assert_eq!(range[0], 1.0);
        assert_eq!(range[3], 1000.0);
        assert!((range[1] - 10.0).abs() < 1e-9);
        assert!((range[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_endpoints_are_rejected() {
        assert!(linspace(f64::NAN, 1.0, 3).is_err());
        assert!(linspace(0.0, f64::INFINITY, 3).is_err());
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        assert!(matches!(
            linspace(0.0, 1.0, 1),
            Err(SweepError::DegenerateRange { points: 1 })
        ));
        assert!(matches!(
            logspace(0.0, 1.0, 3),
            Err(SweepError::LogEndpoint { .. })
        ));
    }

    #[test]
    fn negative_constraint_is_located() {
        let configs = vec![vec![0.0, 1.0], vec![2.0, -0.5]];
        let err = validate_constraints(&configs).unwrap_err();
        assert_eq!(
            err,
            SweepError::NegativeConstraint {
                sample: 1,
                stage: 1,
                value: -0.5,
            }
        );
    }

    proptest! {
        #[test]
        fn linspace_shape(start in -1e3f64..1e3, span in 1e-3f64..1e3, points in 2usize..64) {
            let end = start + span;
            let range = linspace(start, end, points).unwrap();
            prop_assert_eq!(range.len(), points);
            prop_assert_eq!(range[0], start);
            prop_assert_eq!(range[points - 1], end);
            for pair in range.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
        }

        #[test]
        fn logspace_is_monotone(start in 1e-3f64..1e2, ratio in 1.1f64..1e3, points in 2usize..64) {
            let range = logspace(start, start * ratio, points).unwrap();
            prop_assert_eq!(range.len(), points);
            for pair in range.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
        }
    }
}
