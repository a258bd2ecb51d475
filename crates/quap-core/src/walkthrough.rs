//! The walkthrough pipeline: one scenario from prior to approximation.
//!
//! Each step is a pure function from `quap-math`; this module wires them
//! together, records what each produced, and logs a structured event per
//! stage so a JSONL log reads as a trace of the derivation.

use quap_config::{ConfigError, ScenarioFile, ScenarioSpec};
use quap_math::{
    build_quadratic_approximation, compare_intervals, compare_series,
    compute_posterior_parameters, evaluate_beta_density, find_posterior_mode_with, DensitySeries,
    Grid, IntervalComparison, ModeEstimate, ModeSettings, ModeStrategy, Observation,
    PriorParameters, SeriesComparison, DEFAULT_INTERVAL_MASS,
};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::log_event;
use crate::logging::{event_names, generate_run_id, LogContext, Stage};

/// A named prior + observation pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub prior: PriorParameters,
    pub observation: Observation,
}

impl Scenario {
    pub fn new(name: impl Into<String>, prior: PriorParameters, observation: Observation) -> Self {
        Scenario {
            name: name.into(),
            prior,
            observation,
        }
    }

    /// Build a validated scenario from its config form.
    pub fn from_spec(spec: &ScenarioSpec) -> Result<Self> {
        let prior = PriorParameters::new(spec.prior.alpha, spec.prior.beta)?;
        let observation =
            Observation::new(spec.observation.trials, spec.observation.successes)?;
        Ok(Scenario::new(spec.name.clone(), prior, observation))
    }
}

/// Grid and mode settings shared by every scenario in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughSettings {
    pub grid: Grid,
    pub mode: ModeSettings,
    /// Mass of the central credible intervals compared.
    pub interval_mass: f64,
}

impl Default for WalkthroughSettings {
    fn default() -> Self {
        WalkthroughSettings {
            grid: Grid::reference(),
            mode: ModeSettings::default(),
            interval_mass: DEFAULT_INTERVAL_MASS,
        }
    }
}

impl WalkthroughSettings {
    /// Settings from a scenario file's shared grid/mode/interval fields.
    pub fn from_config(file: &ScenarioFile) -> Result<Self> {
        let grid = Grid::new(file.grid.start, file.grid.end, file.grid.step)?;
        let strategy: ModeStrategy =
            file.mode_strategy
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    field: "mode_strategy".to_string(),
                    message,
                })?;
        Ok(WalkthroughSettings {
            grid,
            mode: ModeSettings::default().with_strategy(strategy),
            interval_mass: file.interval_mass,
        })
    }
}

/// Exact posterior summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PosteriorSummary {
    pub alpha: f64,
    pub beta: f64,
    pub mean: f64,
    pub sd: f64,
}

/// Parameters of the normal approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApproximationSummary {
    pub mean: f64,
    /// Second derivative of the log-kernel at the mode.
    pub curvature: f64,
    pub variance: f64,
    pub sigma: f64,
}

/// Density series produced along the way, all over the report's grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughSeries {
    pub prior: DensitySeries,
    pub exact: DensitySeries,
    pub approx: DensitySeries,
}

/// Everything one walkthrough computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkthroughReport {
    pub scenario: String,
    pub prior: PriorParameters,
    pub observation: Observation,
    pub posterior: PosteriorSummary,
    pub mode: ModeEstimate,
    pub approximation: ApproximationSummary,
    pub comparison: SeriesComparison,
    pub intervals: IntervalComparison,
    pub grid: Grid,
    #[serde(skip)]
    pub series: WalkthroughSeries,
}

impl WalkthroughReport {
    /// Prior, exact posterior, and approximation, in that order.
    pub fn series_refs(&self) -> [&DensitySeries; 3] {
        [&self.series.prior, &self.series.exact, &self.series.approx]
    }
}

/// Outcome of one scenario in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    Ok {
        mode: f64,
        sigma: f64,
        max_abs_diff: f64,
        l1_distance: f64,
        tail_log_ratio: f64,
        interval_coverage: f64,
    },
    Error {
        code: u32,
        kind: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepEntry {
    pub scenario: String,
    pub trials: u64,
    pub successes: u64,
    #[serde(flatten)]
    pub outcome: SweepOutcome,
}

/// Side-by-side comparison across scenarios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SweepOutcome::Error { .. }))
            .count()
    }
}

/// Runs scenarios through the posterior → approximation pipeline.
#[derive(Debug, Clone)]
pub struct Walkthrough {
    settings: WalkthroughSettings,
    ctx: LogContext,
}

impl Walkthrough {
    pub fn new(settings: WalkthroughSettings) -> Self {
        Walkthrough {
            settings,
            ctx: LogContext::new(generate_run_id()),
        }
    }

    /// Use an existing log context (so CLI and pipeline share a run id).
    pub fn with_context(mut self, ctx: LogContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn settings(&self) -> &WalkthroughSettings {
        &self.settings
    }

    /// Walk one scenario through all four steps and compare the results.
    pub fn run(&self, scenario: &Scenario) -> Result<WalkthroughReport> {
        let ctx = self.ctx.for_scenario(&scenario.name);
        let grid = &self.settings.grid;
        log_event!(
            ctx,
            INFO,
            event_names::RUN_STARTED,
            Stage::Init,
            "starting walkthrough",
            trials = scenario.observation.trials,
            successes = scenario.observation.successes,
            grid_points = grid.len()
        );

        // 1. Conjugate update
        let posterior = compute_posterior_parameters(&scenario.prior, &scenario.observation)?;
        log_event!(
            ctx,
            DEBUG,
            event_names::POSTERIOR_COMPUTED,
            Stage::Posterior,
            "posterior parameters computed",
            alpha = posterior.alpha,
            beta = posterior.beta
        );

        // 2. Exact densities
        let prior_series = evaluate_beta_density(scenario.prior.alpha, scenario.prior.beta, grid)?
            .renamed("prior");
        let exact =
            evaluate_beta_density(posterior.alpha, posterior.beta, grid)?.renamed("posterior");
        log_event!(
            ctx,
            DEBUG,
            event_names::DENSITY_EVALUATED,
            Stage::Density,
            "exact densities evaluated",
            points = exact.len(),
            finite = exact.is_finite()
        );

        // 3. Mode
        let estimate = find_posterior_mode_with(posterior.alpha, posterior.beta, &self.settings.mode)
            .inspect_err(|e| {
                let message = e.to_string();
                log_event!(
                    ctx,
                    WARN,
                    event_names::MODE_FAILED,
                    Stage::Mode,
                    message.as_str(),
                    code = e.code()
                );
            })?;
        let strategy = estimate.strategy.to_string();
        log_event!(
            ctx,
            DEBUG,
            event_names::MODE_FOUND,
            Stage::Mode,
            "posterior mode located",
            mode = estimate.mode,
            strategy = strategy.as_str(),
            iterations = estimate.iterations
        );

        // 4. Quadratic approximation
        let approx =
            build_quadratic_approximation(posterior.alpha, posterior.beta, estimate.mode, grid)
                .inspect_err(|e| {
                    let message = e.to_string();
                    log_event!(
                        ctx,
                        WARN,
                        event_names::APPROX_FAILED,
                        Stage::Approximate,
                        message.as_str(),
                        code = e.code()
                    );
                })?;
        log_event!(
            ctx,
            DEBUG,
            event_names::APPROX_BUILT,
            Stage::Approximate,
            "quadratic approximation built",
            curvature = approx.curvature,
            sigma = approx.sigma
        );

        let comparison = compare_series(grid, &exact, &approx.series, approx.mean, approx.sigma)?;
        let intervals = compare_intervals(&posterior, &approx, self.settings.interval_mass)?;
        log_event!(
            ctx,
            DEBUG,
            event_names::COMPARE_FINISHED,
            Stage::Compare,
            "exact and approximate densities compared",
            max_abs_diff = comparison.max_abs_diff,
            l1_distance = comparison.l1_distance,
            tail_log_ratio = comparison.tails.max_log_ratio
        );

        let approximation = ApproximationSummary {
            mean: approx.mean,
            curvature: approx.curvature,
            variance: approx.variance,
            sigma: approx.sigma,
        };
        let report = WalkthroughReport {
            scenario: scenario.name.clone(),
            prior: scenario.prior,
            observation: scenario.observation,
            posterior: PosteriorSummary {
                alpha: posterior.alpha,
                beta: posterior.beta,
                mean: posterior.mean(),
                sd: posterior.sd(),
            },
            mode: estimate,
            approximation,
            comparison,
            intervals,
            grid: grid.clone(),
            series: WalkthroughSeries {
                prior: prior_series,
                exact,
                approx: approx.series.renamed("approximation"),
            },
        };

        log_event!(
            ctx,
            INFO,
            event_names::RUN_FINISHED,
            Stage::Compare,
            "walkthrough finished",
            mode = report.mode.mode,
            sigma = report.approximation.sigma
        );
        Ok(report)
    }

    /// Run every scenario, recording failures instead of stopping at the
    /// first one.
    pub fn sweep(&self, scenarios: &[Scenario]) -> SweepReport {
        let entries = scenarios
            .iter()
            .map(|scenario| {
                let outcome = match self.run(scenario) {
                    Ok(report) => SweepOutcome::Ok {
                        mode: report.mode.mode,
                        sigma: report.approximation.sigma,
                        max_abs_diff: report.comparison.max_abs_diff,
                        l1_distance: report.comparison.l1_distance,
                        tail_log_ratio: report.comparison.tails.max_log_ratio,
                        interval_coverage: report.intervals.approx_coverage,
                    },
                    Err(e) => SweepOutcome::Error {
                        code: e.code(),
                        kind: error_kind(&e).to_string(),
                        message: e.to_string(),
                    },
                };
                SweepEntry {
                    scenario: scenario.name.clone(),
                    trials: scenario.observation.trials,
                    successes: scenario.observation.successes,
                    outcome,
                }
            })
            .collect();
        SweepReport { entries }
    }
}

/// Short machine name for an error.
pub fn error_kind(error: &CoreError) -> &'static str {
    match error {
        CoreError::Approx(e) => e.name(),
        CoreError::Config(_) => "config",
        CoreError::Io(_) => "io",
        CoreError::Serialize(_) => "serialize",
        CoreError::UnknownScenario(_) => "unknown_scenario",
        CoreError::InvalidArgument { .. } => "invalid_argument",
    }
}

/// Scenarios from a validated scenario file.
pub fn scenarios_from_config(file: &ScenarioFile) -> Result<Vec<Scenario>> {
    file.scenarios.iter().map(Scenario::from_spec).collect()
}
