//! Property-based tests for quap-math.
//!
//! Uses proptest to verify the posterior / approximation pipeline across
//! many random priors and observations.

use proptest::prelude::*;
use quap_math::{
    build_quadratic_approximation, compute_posterior_parameters, evaluate_beta_density,
    find_posterior_mode, find_posterior_mode_with, trapezoid, ApproxError, Grid, ModeSettings,
    ModeStrategy, Observation, PriorParameters,
};

/// Agreement required between the numeric and closed-form modes.
const MODE_TOL: f64 = 1e-6;

/// Trapezoid mass tolerance on the 1001-point reference grid.
const MASS_TOL: f64 = 1e-3;

/// Random observation with `successes <= trials`.
fn observation() -> impl Strategy<Value = Observation> {
    (0u64..500).prop_flat_map(|n| (Just(n), 0..=n)).prop_map(|(trials, successes)| Observation {
        trials,
        successes,
    })
}

// ============================================================================
// Posterior parameters
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The conjugate update adds successes to alpha and failures to beta.
    #[test]
    fn posterior_adds_counts(a in 0.01..50.0f64, b in 0.01..50.0f64, obs in observation()) {
        let prior = PriorParameters::new(a, b).unwrap();
        let post = compute_posterior_parameters(&prior, &obs).unwrap();
        prop_assert_eq!(post.alpha, a + obs.successes as f64);
        prop_assert_eq!(post.beta, b + (obs.trials - obs.successes) as f64);
        prop_assert!(post.alpha > 0.0 && post.beta > 0.0);
    }

    /// Observations with more successes than trials are always rejected.
    #[test]
    fn posterior_rejects_impossible_counts(n in 0u64..100, extra in 1u64..50) {
        let obs = Observation { trials: n, successes: n + extra };
        let err = compute_posterior_parameters(&PriorParameters::uniform(), &obs).unwrap_err();
        let is_invalid = matches!(err, ApproxError::InvalidParameter { .. });
        prop_assert!(is_invalid);
    }
}

// ============================================================================
// Exact density
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The Beta density integrates to one over the reference grid.
    ///
    /// Shapes in (1, 2) have a vertical tangent at the boundary that the
    /// trapezoid rule cannot resolve at this step, so they start at 2.
    #[test]
    fn beta_density_integrates_to_one(a in 2.0..40.0f64, b in 2.0..40.0f64) {
        let grid = Grid::reference();
        let series = evaluate_beta_density(a, b, &grid).unwrap();
        let mass = trapezoid(&grid, &series);
        prop_assert!((mass - 1.0).abs() < MASS_TOL, "Beta({}, {}) mass = {}", a, b, mass);
    }

    /// Densities are non-negative everywhere on the interior grid.
    #[test]
    fn beta_density_non_negative(a in 0.1..40.0f64, b in 0.1..40.0f64) {
        let grid = Grid::reference().interior();
        let series = evaluate_beta_density(a, b, &grid).unwrap();
        prop_assert!(series.values().iter().all(|&v| v >= 0.0 && v.is_finite()));
    }
}

#[test]
fn unit_shape_densities_integrate_to_one() {
    let grid = Grid::reference();
    for (a, b) in [(1.0, 1.0), (1.0, 20.0), (20.0, 1.0)] {
        let series = evaluate_beta_density(a, b, &grid).unwrap();
        let mass = trapezoid(&grid, &series);
        assert!((mass - 1.0).abs() < MASS_TOL, "Beta({}, {}) mass = {}", a, b, mass);
    }
}

// ============================================================================
// Mode finder
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Numeric and closed-form modes agree.
    #[test]
    fn numeric_mode_matches_closed_form(a in 1.05..200.0f64, b in 1.05..200.0f64) {
        let numeric = find_posterior_mode(a, b).unwrap();
        let closed = find_posterior_mode_with(
            a,
            b,
            &ModeSettings::default().with_strategy(ModeStrategy::ClosedForm),
        )
        .unwrap();
        prop_assert!(numeric > 0.0 && numeric < 1.0);
        prop_assert!(
            (numeric - closed.mode).abs() < MODE_TOL,
            "Beta({}, {}): numeric {} vs closed {}", a, b, numeric, closed.mode
        );
    }

    /// Kernels peaking inside the boundary epsilon still match the closed
    /// form, and so does the approximation's sigma.
    #[test]
    fn lopsided_modes_match_closed_form(a in 1.5..10.0f64, exp in 3.0..14.0f64) {
        let b = 10f64.powf(exp);
        let numeric = find_posterior_mode(a, b).unwrap();
        let closed = (a - 1.0) / (a + b - 2.0);
        prop_assert!(
            ((numeric - closed) / closed).abs() < 1e-6,
            "Beta({}, {}): numeric {} vs closed {}", a, b, numeric, closed
        );

        let grid = Grid::new(0.0, 1.0, 0.5).unwrap();
        let s_num = build_quadratic_approximation(a, b, numeric, &grid).unwrap().sigma;
        let s_closed = build_quadratic_approximation(a, b, closed, &grid).unwrap().sigma;
        prop_assert!(((s_num - s_closed) / s_closed).abs() < 1e-5);
    }

    /// Shapes at or below one never report an interior mode.
    #[test]
    fn no_interior_mode_below_one(a in 0.01..=1.0f64, b in 0.01..50.0f64) {
        let is_no_mode = matches!(find_posterior_mode(a, b), Err(ApproxError::NoInteriorMode { .. }));
        prop_assert!(is_no_mode);
        let is_no_mode = matches!(find_posterior_mode(b + 1.0, a), Err(ApproxError::NoInteriorMode { .. }));
        prop_assert!(is_no_mode);
    }

    /// Repeated calls return bit-identical modes.
    #[test]
    fn mode_is_deterministic(a in 1.05..100.0f64, b in 1.05..100.0f64) {
        let first = find_posterior_mode(a, b).unwrap();
        let second = find_posterior_mode(a, b).unwrap();
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }
}

// ============================================================================
// Quadratic approximation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Curvature is negative at the mode and sigma is its reciprocal root.
    #[test]
    fn approximation_identity(a in 1.05..200.0f64, b in 1.05..200.0f64) {
        let mode = (a - 1.0) / (a + b - 2.0);
        let approx = build_quadratic_approximation(a, b, mode, &Grid::reference()).unwrap();
        prop_assert!(approx.curvature < 0.0);
        prop_assert_eq!(approx.mean, mode);
        prop_assert!((approx.sigma * approx.sigma - (-1.0 / approx.curvature)).abs() < 1e-12);
        prop_assert!(approx.series.values().iter().all(|&v| v >= 0.0 && v.is_finite()));
    }

    /// The whole pipeline is bit-reproducible.
    #[test]
    fn pipeline_is_deterministic(obs in observation()) {
        let grid = Grid::reference();
        let run = || {
            let post = compute_posterior_parameters(&PriorParameters::new(2.0, 2.0).unwrap(), &obs).unwrap();
            let exact = evaluate_beta_density(post.alpha, post.beta, &grid).unwrap();
            let mode = find_posterior_mode(post.alpha, post.beta).unwrap();
            let approx = build_quadratic_approximation(post.alpha, post.beta, mode, &grid).unwrap();
            (exact, approx)
        };
        let (exact_a, approx_a) = run();
        let (exact_b, approx_b) = run();
        prop_assert_eq!(exact_a, exact_b);
        prop_assert_eq!(approx_a.sigma.to_bits(), approx_b.sigma.to_bits());
        prop_assert_eq!(approx_a.series, approx_b.series);
    }
}

// ============================================================================
// End-to-end reference scenario
// ============================================================================

#[test]
fn reference_scenario_end_to_end() {
    let grid = Grid::reference();
    let post = compute_posterior_parameters(
        &PriorParameters::uniform(),
        &Observation::new(30, 20).unwrap(),
    )
    .unwrap();
    assert_eq!((post.alpha, post.beta), (21.0, 11.0));

    let mode = find_posterior_mode(post.alpha, post.beta).unwrap();
    assert!((mode - 0.6667).abs() < 1e-4);

    let approx = build_quadratic_approximation(post.alpha, post.beta, mode, &grid).unwrap();
    assert!((approx.curvature + 135.0).abs() < 1e-3);
    assert!((approx.variance - 0.00741).abs() < 1e-5);
    assert!((approx.sigma - 0.0861).abs() < 1e-4);

    let exact = evaluate_beta_density(post.alpha, post.beta, &grid).unwrap();
    let at = |x: f64| (x * 1000.0).round() as usize;
    let gap = |x: f64| (exact.values()[at(x)] - approx.series.values()[at(x)]).abs();
    let log_gap = |x: f64| (exact.values()[at(x)].ln() - approx.series.values()[at(x)].ln()).abs();

    assert!(gap(0.667) < 0.3);
    // relative divergence grows toward both boundaries
    assert!(log_gap(0.667) < log_gap(0.4));
    assert!(log_gap(0.4) < log_gap(0.2));
    assert!(log_gap(0.2) < log_gap(0.05));
    assert!(log_gap(0.8) < log_gap(0.9));
    assert!(log_gap(0.9) < log_gap(0.99));
}
