//! Central credible intervals: exact Beta vs. normal approximation.

use serde::Serialize;

use super::beta::{beta_cdf, beta_inv_cdf};
use super::posterior::PosteriorParameters;
use super::quadratic::QuadraticApproximation;
use crate::error::{ApproxError, Result};

/// Default interval mass (the 89% convention used in the walkthrough).
pub const DEFAULT_INTERVAL_MASS: f64 = 0.89;

/// A closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Exact and approximate central intervals at the same mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalComparison {
    pub mass: f64,
    /// From the Beta posterior's inverse CDF.
    pub exact: Interval,
    /// From the approximating normal's quantiles (may leave `[0, 1]`).
    pub approx: Interval,
    /// Exact posterior probability of the approximate interval.
    pub approx_coverage: f64,
}

/// Compare central intervals holding `mass` of each distribution.
pub fn compare_intervals(
    posterior: &PosteriorParameters,
    approx: &QuadraticApproximation,
    mass: f64,
) -> Result<IntervalComparison> {
    if !(mass > 0.0 && mass < 1.0) {
        return Err(ApproxError::invalid(
            "interval_mass",
            format!("must lie in (0, 1), got {}", mass),
        ));
    }
    let tail = 0.5 * (1.0 - mass);
    let exact = Interval {
        lower: beta_inv_cdf(tail, posterior.alpha, posterior.beta),
        upper: beta_inv_cdf(1.0 - tail, posterior.alpha, posterior.beta),
    };
    let (lower, upper) = approx.central_interval(mass);
    let approx_interval = Interval { lower, upper };
    let approx_coverage = beta_cdf(upper, posterior.alpha, posterior.beta)
        - beta_cdf(lower, posterior.alpha, posterior.beta);

    Ok(IntervalComparison {
        mass,
        exact,
        approx: approx_interval,
        approx_coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::grid::Grid;
    use crate::math::quadratic::build_quadratic_approximation;

    fn reference() -> (PosteriorParameters, QuadraticApproximation) {
        let post = PosteriorParameters {
            alpha: 21.0,
            beta: 11.0,
        };
        let approx = build_quadratic_approximation(21.0, 11.0, 2.0 / 3.0, &Grid::reference()).unwrap();
        (post, approx)
    }

    #[test]
    fn intervals_overlap_and_cover() {
        let (post, approx) = reference();
        let cmp = compare_intervals(&post, &approx, DEFAULT_INTERVAL_MASS).unwrap();

        assert!(cmp.exact.lower < cmp.exact.upper);
        assert!(cmp.approx.lower < cmp.approx.upper);
        assert!(cmp.exact.lower > 0.4 && cmp.exact.upper < 0.85);
        // Both intervals are roughly 2 * 1.6 sigma wide
        assert!((cmp.exact.width() - cmp.approx.width()).abs() < 0.03);
        assert!((cmp.approx_coverage - DEFAULT_INTERVAL_MASS).abs() < 0.03);
    }

    #[test]
    fn exact_interval_is_skewed_left() {
        // Beta(21, 11) has a longer left tail than its normal approximation
        let (post, approx) = reference();
        let cmp = compare_intervals(&post, &approx, 0.95).unwrap();
        assert!(cmp.exact.lower < cmp.approx.lower);
        assert!(cmp.exact.upper < cmp.approx.upper);
    }

    #[test]
    fn invalid_mass() {
        let (post, approx) = reference();
        assert!(compare_intervals(&post, &approx, 0.0).is_err());
        assert!(compare_intervals(&post, &approx, 1.0).is_err());
        assert!(compare_intervals(&post, &approx, f64::NAN).is_err());
    }
}
