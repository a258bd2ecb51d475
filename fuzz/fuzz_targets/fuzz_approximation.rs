//! Fuzz target for the posterior to approximation pipeline.
//!
//! Any prior and observation must yield either an approximation or
//! one of the typed errors. A NaN sigma is a bug.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quap_math::{
    build_quadratic_approximation, compute_posterior_parameters, evaluate_beta_density,
    find_posterior_mode, Grid, Observation, PriorParameters,
};

#[derive(Debug, Arbitrary)]
struct Input {
    alpha: f64,
    beta: f64,
    trials: u32,
    successes: u32,
}

fuzz_target!(|input: Input| {
    let prior = PriorParameters {
        alpha: input.alpha,
        beta: input.beta,
    };
    let obs = Observation {
        trials: u64::from(input.trials),
        successes: u64::from(input.successes),
    };
    let Ok(post) = compute_posterior_parameters(&prior, &obs) else {
        return;
    };

    let Ok(grid) = Grid::unit(0.01) else {
        return;
    };
    let _ = evaluate_beta_density(post.alpha, post.beta, &grid);

    if let Ok(mode) = find_posterior_mode(post.alpha, post.beta) {
        if let Ok(approx) = build_quadratic_approximation(post.alpha, post.beta, mode, &grid) {
            assert!(!approx.sigma.is_nan() && approx.sigma > 0.0);
        }
    }
});
