//! Exact Beta posteriors and their quadratic (Laplace) approximations.
//!
//! The pipeline is four pure steps over a shared [`Grid`]:
//!
//! 1. [`compute_posterior_parameters`]: conjugate Beta-Binomial update.
//! 2. [`evaluate_beta_density`]: exact density over the grid.
//! 3. [`find_posterior_mode`]: bounded maximization of the kernel.
//! 4. [`build_quadratic_approximation`]: normal density from the curvature
//!    of the log-kernel at the mode.
//!
//! ```
//! use quap_math::*;
//!
//! let grid = Grid::reference();
//! let post = compute_posterior_parameters(
//!     &PriorParameters::uniform(),
//!     &Observation::new(30, 20)?,
//! )?;
//! let exact = evaluate_beta_density(post.alpha, post.beta, &grid)?;
//! let mode = find_posterior_mode(post.alpha, post.beta)?;
//! let approx = build_quadratic_approximation(post.alpha, post.beta, mode, &grid)?;
//! assert_eq!(exact.len(), approx.series.len());
//! # Ok::<(), quap_math::ApproxError>(())
//! ```

pub mod error;
pub mod math;

pub use error::{ApproxError, Result};
pub use math::beta::{beta_cdf, beta_inv_cdf, beta_mean, beta_pdf, beta_var, evaluate_beta_density};
pub use math::compare::{compare_series, trapezoid, BandStats, SeriesComparison};
pub use math::grid::{DensitySeries, Grid, REFERENCE_STEP};
pub use math::interval::{compare_intervals, Interval, IntervalComparison, DEFAULT_INTERVAL_MASS};
pub use math::mode::{find_posterior_mode, find_posterior_mode_with, ModeEstimate, ModeSettings, ModeStrategy};
pub use math::normal::{normal_cdf, normal_pdf, normal_quantile};
pub use math::posterior::{compute_posterior_parameters, Observation, PosteriorParameters, PriorParameters};
pub use math::quadratic::{build_quadratic_approximation, QuadraticApproximation};
pub use math::stable::{log_beta, log_gamma};
