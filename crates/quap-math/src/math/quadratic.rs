//! Quadratic (Laplace) approximation of a Beta posterior.
//!
//! A second-order Taylor expansion of the log-kernel around the mode `q*`
//! gives
//!
//! ```text
//! ln g(q) ≈ ln g(q*) + ½ · d2 · (q - q*)²
//! d2 = -(alpha-1)/q*² - (beta-1)/(1-q*)²
//! ```
//!
//! which is the log-density of `Normal(q*, -1/d2)` up to a constant. The
//! approximation is therefore fully determined by the mode and the
//! curvature there: mean = mode, variance = `-1 / d2`.

use serde::Serialize;

use super::grid::{DensitySeries, Grid};
use super::normal::{normal_pdf, normal_quantile};
use crate::error::{require_positive, ApproxError, Result};

/// Normal approximation `N(mean, sigma²)` and its density over a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadraticApproximation {
    /// Mean of the approximating normal (the posterior mode).
    pub mean: f64,
    /// Second derivative of the log-kernel at the mode (strictly negative).
    pub curvature: f64,
    /// `-1 / curvature`.
    pub variance: f64,
    /// `sqrt(variance)`.
    pub sigma: f64,
    /// `N(mean, sigma²)` evaluated on the shared grid.
    pub series: DensitySeries,
}

impl QuadraticApproximation {
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// The `(sigma, series)` pair handed to presentation code.
    pub fn into_parts(self) -> (f64, DensitySeries) {
        (self.sigma, self.series)
    }

    /// Density of the approximation at an arbitrary point.
    pub fn density(&self, x: f64) -> f64 {
        normal_pdf(x, self.mean, self.sigma)
    }

    /// Central interval holding `mass` of the approximating normal.
    pub fn central_interval(&self, mass: f64) -> (f64, f64) {
        let tail = 0.5 * (1.0 - mass);
        (
            normal_quantile(tail, self.mean, self.sigma),
            normal_quantile(1.0 - tail, self.mean, self.sigma),
        )
    }
}

/// Second derivative of the Beta log-kernel at `q`:
/// `-(alpha-1)/q² - (beta-1)/(1-q)²`.
pub fn log_kernel_curvature(q: f64, alpha: f64, beta: f64) -> f64 {
    let one_minus = 1.0 - q;
    -(alpha - 1.0) / (q * q) - (beta - 1.0) / (one_minus * one_minus)
}

/// Build the quadratic approximation of Beta(alpha, beta) around `mode`.
///
/// # Errors
///
/// - [`ApproxError::InvalidParameter`] when a shape parameter is not
///   positive or `mode` is outside `(0, 1)`.
/// - [`ApproxError::DegenerateApproximation`] when the curvature at `mode`
///   is not strictly negative (the point is not a genuine maximum).
///
/// # Example
/// ```
/// use quap_math::{build_quadratic_approximation, Grid};
///
/// let approx = build_quadratic_approximation(21.0, 11.0, 2.0 / 3.0, &Grid::reference()).unwrap();
/// assert!((approx.curvature + 135.0).abs() < 1e-9);
/// assert!((approx.sigma - 0.0861).abs() < 1e-4);
/// ```
pub fn build_quadratic_approximation(
    alpha: f64,
    beta: f64,
    mode: f64,
    grid: &Grid,
) -> Result<QuadraticApproximation> {
    require_positive("alpha", alpha)?;
    require_positive("beta", beta)?;
    if !(mode > 0.0 && mode < 1.0) {
        return Err(ApproxError::invalid(
            "mode",
            format!("must lie in the open interval (0, 1), got {}", mode),
        ));
    }

    let curvature = log_kernel_curvature(mode, alpha, beta);
    if !curvature.is_finite() || curvature >= 0.0 {
        return Err(ApproxError::DegenerateApproximation { curvature, mode });
    }

    let variance = -1.0 / curvature;
    let sigma = variance.sqrt();
    let series = grid.map(
        format!("Normal({:.4}, {:.4}²)", mode, sigma),
        |x| normal_pdf(x, mode, sigma),
    );

    Ok(QuadraticApproximation {
        mean: mode,
        curvature,
        variance,
        sigma,
        series,
    })
}
