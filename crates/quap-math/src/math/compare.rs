//! Numeric comparison of the exact posterior against its approximation.
//!
//! Grid points are grouped into bands by their distance from the mode in
//! units of the approximation's sigma:
//!
//! - `near_mode`: `|x - mode| <= sigma`
//! - `shoulders`: `sigma < |x - mode| <= 3 sigma`
//! - `tails`: `|x - mode| > 3 sigma`
//!
//! Absolute differences are largest in the shoulders, where the skew of
//! the Beta density is most visible; the log density ratio grows without
//! bound toward 0 and 1, where the normal's tails are far too heavy.

use serde::Serialize;

use super::grid::{DensitySeries, Grid};
use crate::error::{ApproxError, Result};

/// Trapezoidal estimate of the integral of `series` over `grid`.
///
/// Returns NaN when any value is infinite or NaN.
pub fn trapezoid(grid: &Grid, series: &DensitySeries) -> f64 {
    let xs = grid.points();
    let ys = series.values();
    if xs.len() != ys.len() || !series.is_finite() {
        return f64::NAN;
    }
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}

/// Statistics for one band of grid points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandStats {
    /// Number of grid points in the band.
    pub points: usize,
    /// Largest `|exact - approx|` in the band (0 for an empty band).
    pub max_abs_diff: f64,
    /// Largest `|ln approx - ln exact|` over points where both are positive.
    pub max_log_ratio: f64,
}

impl BandStats {
    fn empty() -> Self {
        BandStats {
            points: 0,
            max_abs_diff: 0.0,
            max_log_ratio: 0.0,
        }
    }

    fn record(&mut self, exact: f64, approx: f64) {
        self.points += 1;
        self.max_abs_diff = self.max_abs_diff.max((exact - approx).abs());
        if exact > 0.0 && approx > 0.0 {
            self.max_log_ratio = self.max_log_ratio.max((approx.ln() - exact.ln()).abs());
        }
    }
}

/// Summary of how far the approximation is from the exact density.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesComparison {
    /// Largest `|exact - approx|` over the whole grid.
    pub max_abs_diff: f64,
    /// Grid point where `max_abs_diff` occurs.
    pub worst_x: f64,
    pub near_mode: BandStats,
    pub shoulders: BandStats,
    pub tails: BandStats,
    /// Trapezoidal mass of the exact series.
    pub exact_mass: f64,
    /// Trapezoidal mass of the approximation (below 1 when the normal
    /// spills outside the grid).
    pub approx_mass: f64,
    /// Trapezoidal integral of `|exact - approx|`.
    pub l1_distance: f64,
}

/// Compare an exact density series against an approximation centred at
/// `mode` with scale `sigma`.
///
/// Both series must be finite and aligned with `grid`; evaluate on
/// [`Grid::interior`] when the exact density is singular at an endpoint.
pub fn compare_series(
    grid: &Grid,
    exact: &DensitySeries,
    approx: &DensitySeries,
    mode: f64,
    sigma: f64,
) -> Result<SeriesComparison> {
    for series in [exact, approx] {
        if series.len() != grid.len() {
            return Err(ApproxError::LengthMismatch {
                expected: grid.len(),
                actual: series.len(),
            });
        }
        if !series.is_finite() {
            return Err(ApproxError::invalid(
                series.name(),
                "series contains non-finite values; compare on an interior grid",
            ));
        }
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ApproxError::invalid(
            "sigma",
            format!("must be positive and finite, got {}", sigma),
        ));
    }

    let mut near_mode = BandStats::empty();
    let mut shoulders = BandStats::empty();
    let mut tails = BandStats::empty();
    let mut max_abs_diff = 0.0f64;
    let mut worst_x = mode;

    for ((&x, &e), &a) in grid.points().iter().zip(exact.values()).zip(approx.values()) {
        let diff = (e - a).abs();
        if diff > max_abs_diff {
            max_abs_diff = diff;
            worst_x = x;
        }
        let z = (x - mode).abs() / sigma;
        let band = if z <= 1.0 {
            &mut near_mode
        } else if z <= 3.0 {
            &mut shoulders
        } else {
            &mut tails
        };
        band.record(e, a);
    }

    let diff_series = DensitySeries::new(
        "abs_diff",
        exact
            .values()
            .iter()
            .zip(approx.values())
            .map(|(e, a)| (e - a).abs())
            .collect(),
    );

    Ok(SeriesComparison {
        max_abs_diff,
        worst_x,
        near_mode,
        shoulders,
        tails,
        exact_mass: trapezoid(grid, exact),
        approx_mass: trapezoid(grid, approx),
        l1_distance: trapezoid(grid, &diff_series),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::beta::evaluate_beta_density;
    use crate::math::quadratic::build_quadratic_approximation;

    #[test]
    fn trapezoid_of_constant() {
        let grid = Grid::reference();
        let ones = grid.map("one", |_| 1.0);
        assert!((trapezoid(&grid, &ones) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn trapezoid_of_singular_series_is_nan() {
        let grid = Grid::reference();
        let s = evaluate_beta_density(0.5, 0.5, &grid).unwrap();
        assert!(trapezoid(&grid, &s).is_nan());
    }

    #[test]
    fn reference_comparison_bands() {
        let grid = Grid::reference();
        let exact = evaluate_beta_density(21.0, 11.0, &grid).unwrap();
        let approx = build_quadratic_approximation(21.0, 11.0, 2.0 / 3.0, &grid).unwrap();
        let cmp = compare_series(&grid, &exact, &approx.series, approx.mean, approx.sigma).unwrap();

        assert!(cmp.near_mode.max_abs_diff < 0.3, "{:?}", cmp.near_mode);
        assert!(cmp.near_mode.max_log_ratio < cmp.shoulders.max_log_ratio);
        assert!(cmp.shoulders.max_log_ratio < cmp.tails.max_log_ratio);
        assert!(cmp.tails.max_abs_diff < cmp.shoulders.max_abs_diff);
        assert_eq!(
            cmp.near_mode.points + cmp.shoulders.points + cmp.tails.points,
            grid.len()
        );
        assert!((cmp.exact_mass - 1.0).abs() < 1e-3);
        assert!((cmp.approx_mass - 1.0).abs() < 1e-3);
        assert!(cmp.l1_distance > 0.0 && cmp.l1_distance < 0.2);
        assert!(cmp.max_abs_diff >= cmp.near_mode.max_abs_diff);
    }

    #[test]
    fn identical_series_have_zero_distance() {
        let grid = Grid::reference();
        let exact = evaluate_beta_density(5.0, 5.0, &grid).unwrap();
        let cmp = compare_series(&grid, &exact, &exact, 0.5, 0.15).unwrap();
        assert_eq!(cmp.max_abs_diff, 0.0);
        assert_eq!(cmp.l1_distance, 0.0);
        assert_eq!(cmp.tails.max_log_ratio, 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let grid = Grid::reference();
        let short = DensitySeries::new("short", vec![0.0; 10]);
        let exact = evaluate_beta_density(5.0, 5.0, &grid).unwrap();
        let err = compare_series(&grid, &exact, &short, 0.5, 0.1).unwrap_err();
        assert_eq!(
            err,
            ApproxError::LengthMismatch {
                expected: 1001,
                actual: 10
            }
        );
    }

    #[test]
    fn singular_series_are_rejected() {
        let grid = Grid::reference();
        let exact = evaluate_beta_density(0.5, 2.0, &grid).unwrap();
        let other = evaluate_beta_density(2.0, 2.0, &grid).unwrap();
        assert!(compare_series(&grid, &exact, &other, 0.5, 0.1).is_err());
        let interior = grid.interior();
        let exact = evaluate_beta_density(0.5, 2.0, &interior).unwrap();
        let other = evaluate_beta_density(2.0, 2.0, &interior).unwrap();
        assert!(compare_series(&interior, &exact, &other, 0.5, 0.1).is_ok());
    }
}
