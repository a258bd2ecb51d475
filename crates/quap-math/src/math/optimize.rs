//! Bounded scalar maximization.
//!
//! Brent's method (golden-section search accelerated by successive
//! parabolic interpolation) applied to `-f`. Only used to locate posterior
//! modes, over one dimension and a closed bracket.

use crate::error::{ApproxError, Result};

/// Golden-section ratio `(3 - sqrt(5)) / 2`.
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Settings for [`maximize_bounded`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximizeSettings {
    /// Absolute tolerance on the argmax.
    pub abs_tol: f64,
    /// Relative tolerance on the argmax (scaled by `|x|`).
    pub rel_tol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
}

impl Default for MaximizeSettings {
    fn default() -> Self {
        Self {
            abs_tol: 1e-10,
            rel_tol: f64::EPSILON.sqrt(),
            max_iter: 200,
        }
    }
}

/// Result of a bounded maximization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximumResult {
    /// Approximate argmax.
    pub x: f64,
    /// Objective at the argmax: `f(x)`.
    pub fx: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Number of objective evaluations.
    pub evals: usize,
}

/// Maximize `f` over the closed interval `[lower, upper]`.
///
/// Converges when the bracket around the best point shrinks below
/// `2 * (rel_tol * |x| + abs_tol / 3)`. Non-finite objective values are
/// treated as worse than any finite value, so `f` may be undefined at
/// isolated points without derailing the search.
///
/// # Errors
///
/// Returns [`ApproxError::InvalidParameter`] for an empty or non-finite
/// bracket and [`ApproxError::NoConvergence`] when `max_iter` is exhausted.
///
/// # Example
///
/// ```
/// use quap_math::math::optimize::{maximize_bounded, MaximizeSettings};
///
/// let r = maximize_bounded(|x| -(x - 0.3) * (x - 0.3), 0.0, 1.0, &MaximizeSettings::default())
///     .unwrap();
/// assert!((r.x - 0.3).abs() < 1e-7);
/// ```
pub fn maximize_bounded(
    mut f: impl FnMut(f64) -> f64,
    lower: f64,
    upper: f64,
    settings: &MaximizeSettings,
) -> Result<MaximumResult> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(ApproxError::invalid(
            "bracket",
            format!("requires finite lower < upper, got [{}, {}]", lower, upper),
        ));
    }

    let mut objective = |x: f64| {
        let y = -f(x);
        if y.is_nan() {
            f64::INFINITY
        } else {
            y
        }
    };

    let mut a = lower;
    let mut b = upper;
    let mut x = a + GOLDEN * (b - a);
    let mut w = x;
    let mut v = x;
    let mut fx = objective(x);
    let mut fw = fx;
    let mut fv = fx;
    let mut evals = 1usize;

    // d: current step, e: step before last
    let mut d = 0.0f64;
    let mut e = 0.0f64;

    for iter in 0..settings.max_iter {
        let m = 0.5 * (a + b);
        let tol1 = settings.rel_tol * x.abs() + settings.abs_tol / 3.0;
        let tol2 = 2.0 * tol1;

        if (x - m).abs() <= tol2 - 0.5 * (b - a) {
            return Ok(MaximumResult {
                x,
                fx: -fx,
                iterations: iter,
                evals,
            });
        }

        let mut golden = true;
        if e.abs() > tol1 {
            // Fit a parabola through (v, fv), (w, fw), (x, fx)
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }
            let e_prev = e;
            e = d;

            if p.abs() < (0.5 * q * e_prev).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if (u - a) < tol2 || (b - u) < tol2 {
                    d = if x < m { tol1 } else { -tol1 };
                }
                golden = false;
            }
        }

        if golden {
            e = if x < m { b - x } else { a - x };
            d = GOLDEN * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else if d > 0.0 {
            x + tol1
        } else {
            x - tol1
        };
        let fu = objective(u);
        evals += 1;

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    Err(ApproxError::NoConvergence {
        iterations: settings.max_iter,
    })
}
