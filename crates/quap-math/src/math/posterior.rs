//! Beta-Binomial conjugate update.
//!
//! The model uses:
//! - Prior: `p ~ Beta(a, b)`
//! - Likelihood: `y | p ~ Binomial(n, p)`
//! - Posterior: `p | y, n ~ Beta(a + y, b + n - y)`
//!
//! The update is closed form, so the exact posterior is always available
//! for comparison against its quadratic approximation.

use serde::{Deserialize, Serialize};

use super::beta::{beta_mean, beta_mode, beta_var};
use crate::error::{require_positive, ApproxError, Result};

/// Beta prior shape parameters `Beta(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorParameters {
    pub alpha: f64,
    pub beta: f64,
}

impl PriorParameters {
    /// Create validated prior parameters.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        let prior = PriorParameters { alpha, beta };
        prior.validate()?;
        Ok(prior)
    }

    /// Beta(1, 1) uniform prior.
    pub fn uniform() -> Self {
        PriorParameters {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Check `alpha > 0` and `beta > 0` (both finite).
    pub fn validate(&self) -> Result<()> {
        require_positive("prior.alpha", self.alpha)?;
        require_positive("prior.beta", self.beta)
    }
}

impl Default for PriorParameters {
    fn default() -> Self {
        PriorParameters::uniform()
    }
}

/// Binomial data: `successes` out of `trials`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub trials: u64,
    pub successes: u64,
}

impl Observation {
    /// Create a validated observation.
    pub fn new(trials: u64, successes: u64) -> Result<Self> {
        let obs = Observation { trials, successes };
        obs.validate()?;
        Ok(obs)
    }

    /// Check `successes <= trials`.
    pub fn validate(&self) -> Result<()> {
        if self.successes > self.trials {
            return Err(ApproxError::invalid(
                "observation.successes",
                format!(
                    "successes ({}) exceed trials ({})",
                    self.successes, self.trials
                ),
            ));
        }
        Ok(())
    }

    /// `n - y`, clamped at zero for an observation that fails [`Self::validate`].
    pub fn failures(&self) -> u64 {
        self.trials.saturating_sub(self.successes)
    }

    /// Observed proportion `y / n`, or NaN with no trials.
    pub fn proportion(&self) -> f64 {
        if self.trials == 0 {
            return f64::NAN;
        }
        self.successes as f64 / self.trials as f64
    }
}

/// Shape parameters of the exact Beta posterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosteriorParameters {
    pub alpha: f64,
    pub beta: f64,
}

impl PosteriorParameters {
    /// Posterior mean `alpha / (alpha + beta)`.
    pub fn mean(&self) -> f64 {
        beta_mean(self.alpha, self.beta)
    }

    /// Posterior variance `alpha*beta / ((alpha+beta)^2 (alpha+beta+1))`.
    pub fn variance(&self) -> f64 {
        beta_var(self.alpha, self.beta)
    }

    pub fn sd(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Closed-form mode `(alpha-1)/(alpha+beta-2)`; NaN without an interior mode.
    pub fn closed_form_mode(&self) -> f64 {
        beta_mode(self.alpha, self.beta)
    }
}

/// Compute the exact conjugate posterior `Beta(a + y, b + n - y)`.
///
/// Fails fast with [`ApproxError::InvalidParameter`] when the prior has a
/// non-positive (or non-finite) shape or `y > n`.
///
/// # Example
/// ```
/// use quap_math::{compute_posterior_parameters, Observation, PriorParameters};
///
/// let posterior = compute_posterior_parameters(
///     &PriorParameters::uniform(),
///     &Observation::new(30, 20).unwrap(),
/// )
/// .unwrap();
/// assert_eq!((posterior.alpha, posterior.beta), (21.0, 11.0));
/// ```
pub fn compute_posterior_parameters(
    prior: &PriorParameters,
    obs: &Observation,
) -> Result<PosteriorParameters> {
    prior.validate()?;
    obs.validate()?;

    Ok(PosteriorParameters {
        alpha: prior.alpha + obs.successes as f64,
        beta: prior.beta + obs.failures() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_prior_update() {
        let post = compute_posterior_parameters(
            &PriorParameters::uniform(),
            &Observation {
                trials: 30,
                successes: 20,
            },
        )
        .unwrap();
        assert_eq!(post.alpha, 21.0);
        assert_eq!(post.beta, 11.0);
        assert!((post.closed_form_mode() - 2.0 / 3.0).abs() < 1e-15);
        assert!((post.mean() - 21.0 / 32.0).abs() < 1e-15);
    }

    #[test]
    fn informative_prior_update() {
        let prior = PriorParameters::new(2.5, 4.0).unwrap();
        let post = compute_posterior_parameters(&prior, &Observation::new(9, 6).unwrap()).unwrap();
        assert_eq!(post.alpha, 8.5);
        assert_eq!(post.beta, 7.0);
    }

    #[test]
    fn zero_trials_returns_prior() {
        let prior = PriorParameters::new(3.0, 5.0).unwrap();
        let post = compute_posterior_parameters(&prior, &Observation::new(0, 0).unwrap()).unwrap();
        assert_eq!(post.alpha, prior.alpha);
        assert_eq!(post.beta, prior.beta);
    }

    #[test]
    fn invalid_prior_fails_fast() {
        let bad = PriorParameters {
            alpha: -1.0,
            beta: 1.0,
        };
        let err = compute_posterior_parameters(&bad, &Observation::new(1, 0).unwrap()).unwrap_err();
        assert!(matches!(err, ApproxError::InvalidParameter { ref field, .. } if field == "prior.alpha"));

        assert!(PriorParameters::new(1.0, 0.0).is_err());
        assert!(PriorParameters::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn successes_beyond_trials_fail() {
        assert!(Observation::new(5, 6).is_err());
        let obs = Observation {
            trials: 5,
            successes: 6,
        };
        let err = compute_posterior_parameters(&PriorParameters::uniform(), &obs).unwrap_err();
        assert!(matches!(err, ApproxError::InvalidParameter { .. }));
        assert_eq!(obs.failures(), 0);
        assert_eq!(Observation::new(5, 2).unwrap().failures(), 3);
    }

    #[test]
    fn observation_proportion() {
        assert!((Observation::new(30, 20).unwrap().proportion() - 2.0 / 3.0).abs() < 1e-15);
        assert!(Observation::new(0, 0).unwrap().proportion().is_nan());
    }
}
