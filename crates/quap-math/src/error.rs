//! Error types for posterior and approximation math.
//!
//! Every failure is a violated precondition detected at the point of use.
//! Computations are deterministic: the same inputs always produce the same
//! error.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for quap-math operations.
pub type Result<T> = std::result::Result<T, ApproxError>;

/// Errors raised by the posterior / approximation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApproxError {
    /// A prior, observation, grid, or shape parameter is out of range.
    #[error("invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },

    /// The Beta kernel is monotone or U-shaped, so it has no interior maximum.
    #[error("kernel Beta({alpha}, {beta}) has no interior mode (requires alpha > 1 and beta > 1)")]
    NoInteriorMode { alpha: f64, beta: f64 },

    /// The log-kernel is not strictly concave at the located mode.
    #[error("degenerate approximation: curvature {curvature} at q = {mode} is not strictly negative")]
    DegenerateApproximation { curvature: f64, mode: f64 },

    /// The mode is closer to 0 or 1 than `f64` can separate from the edge.
    #[error("mode of Beta({alpha}, {beta}) is not resolvable from the boundary (nearest estimate {estimate})")]
    UnresolvedMode { alpha: f64, beta: f64, estimate: f64 },

    /// The bounded maximizer hit its iteration cap.
    #[error("maximizer did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },

    /// Two series were compared over grids of different length.
    #[error("series length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl ApproxError {
    /// Shorthand for [`ApproxError::InvalidParameter`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApproxError::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable error code for structured reporting.
    pub fn code(&self) -> u32 {
        match self {
            ApproxError::InvalidParameter { .. } => 40,
            ApproxError::NoInteriorMode { .. } => 41,
            ApproxError::DegenerateApproximation { .. } => 42,
            ApproxError::NoConvergence { .. } => 43,
            ApproxError::LengthMismatch { .. } => 44,
            ApproxError::UnresolvedMode { .. } => 45,
        }
    }

    /// Short machine name for the error variant.
    pub fn name(&self) -> &'static str {
        match self {
            ApproxError::InvalidParameter { .. } => "invalid_parameter",
            ApproxError::NoInteriorMode { .. } => "no_interior_mode",
            ApproxError::DegenerateApproximation { .. } => "degenerate_approximation",
            ApproxError::NoConvergence { .. } => "no_convergence",
            ApproxError::LengthMismatch { .. } => "length_mismatch",
            ApproxError::UnresolvedMode { .. } => "unresolved_mode",
        }
    }
}

/// Require a strictly positive, finite value.
pub(crate) fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApproxError::invalid(
            field,
            format!("must be positive and finite, got {}", value),
        ));
    }
    Ok(())
}
