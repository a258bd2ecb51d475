//! Evaluation grids and the density series aligned with them.
//!
//! A [`Grid`] is built once and shared read-only by every density
//! evaluator, so the prior, exact posterior, and approximation series are
//! always index-aligned.

use serde::Serialize;

use crate::error::{ApproxError, Result};

/// Step of the reference grid `0, 0.001, ..., 1`.
pub const REFERENCE_STEP: f64 = 0.001;

/// Upper bound on grid size; anything larger is a configuration mistake.
pub const MAX_GRID_POINTS: usize = 10_000_001;

/// Slack used when deciding whether the last step lands on `end`.
const STEP_SLACK: f64 = 1e-9;

/// Ordered, evenly spaced evaluation points inside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    start: f64,
    end: f64,
    step: f64,
    #[serde(skip)]
    points: Vec<f64>,
}

impl Grid {
    /// Build a grid from `start` to `end` (inclusive when the step divides
    /// the span) with a fixed `step`.
    ///
    /// Points are computed as `start + i * step` rather than accumulated,
    /// so there is no drift across long grids.
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ApproxError::invalid(
                "grid",
                format!("bounds must be finite, got [{}, {}]", start, end),
            ));
        }
        if start < 0.0 || end > 1.0 || start >= end {
            return Err(ApproxError::invalid(
                "grid",
                format!("bounds must satisfy 0 <= start < end <= 1, got [{}, {}]", start, end),
            ));
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(ApproxError::invalid(
                "grid.step",
                format!("must be positive and finite, got {}", step),
            ));
        }
        let span = end - start;
        if step > span {
            return Err(ApproxError::invalid(
                "grid.step",
                format!("step {} exceeds grid span {}", step, span),
            ));
        }

        let intervals = (span / step + STEP_SLACK).floor();
        if intervals + 1.0 > MAX_GRID_POINTS as f64 {
            return Err(ApproxError::invalid(
                "grid.step",
                format!("step {} yields more than {} points", step, MAX_GRID_POINTS),
            ));
        }
        let count = intervals as usize + 1;

        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            let x = start + i as f64 * step;
            points.push(if (end - x).abs() <= STEP_SLACK { end } else { x.min(end) });
        }

        Ok(Grid {
            start,
            end,
            step,
            points,
        })
    }

    /// Grid over the whole unit interval with the given step.
    pub fn unit(step: f64) -> Result<Self> {
        Grid::new(0.0, 1.0, step)
    }

    /// The reference grid `0, 0.001, ..., 1` (1001 points).
    pub fn reference() -> Self {
        let count = 1001;
        let points = (0..count).map(|i| i as f64 / 1000.0).collect();
        Grid {
            start: 0.0,
            end: 1.0,
            step: REFERENCE_STEP,
            points,
        }
    }

    /// Copy of this grid without the exact endpoints 0 and 1, where Beta
    /// densities with a shape below one diverge.
    pub fn interior(&self) -> Grid {
        let points: Vec<f64> = self
            .points
            .iter()
            .copied()
            .filter(|&x| x > 0.0 && x < 1.0)
            .collect();
        let start = points.first().copied().unwrap_or(self.start);
        let end = points.last().copied().unwrap_or(self.end);
        Grid {
            start,
            end,
            step: self.step,
            points,
        }
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Evaluate `f` at every grid point into a named series.
    pub fn map(&self, name: impl Into<String>, f: impl Fn(f64) -> f64) -> DensitySeries {
        DensitySeries::new(name, self.points.iter().map(|&x| f(x)).collect())
    }
}

/// Density values aligned 1:1 with a [`Grid`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensitySeries {
    name: String,
    values: Vec<f64>,
}

impl DensitySeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        DensitySeries {
            name: name.into(),
            values,
        }
    }

    /// Display name used by renderers ("prior", "posterior", ...).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when no entry is infinite or NaN (no boundary singularity).
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Index and value of the largest finite entry.
    pub fn argmax(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .fold(None, |best, (i, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((i, v)),
            })
    }

    /// Same values under a different name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
