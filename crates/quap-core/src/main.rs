//! quap - exact Beta posterior vs. its quadratic approximation
//!
//! Entry point for the `quap` CLI:
//! - `run`: walk one scenario from prior to normal approximation
//! - `sweep`: compare every scenario in the scenario file
//! - `series`: dump the prior, posterior, and approximation densities
//! - `config`: show or validate the scenario file

use clap::{Args, Parser, Subcommand};
use quap_config::{load_resolved, resolve_config, validate_scenarios, ScenarioFile};
use quap_core::exit_codes::ExitCode;
use quap_core::log_event;
use quap_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, Stage,
};
use quap_core::output::{self, OutputFormat, RenderKind};
use quap_core::walkthrough::scenarios_from_config;
use quap_core::{CoreError, Scenario, Walkthrough, WalkthroughSettings, SCHEMA_VERSION};
use quap_math::{ApproxError, Grid, ModeStrategy, Observation, PriorParameters};
use std::path::{Path, PathBuf};

/// Exact Beta posterior vs. its quadratic (Laplace) approximation
#[derive(Parser)]
#[command(name = "quap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config directory to search for scenarios.json / scenarios.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Scenario file (JSON or TOML)
    #[arg(long, global = true)]
    scenarios: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk one scenario through the posterior and its approximation
    Run(RunArgs),

    /// Compare every scenario in the scenario file
    Sweep(SettingsArgs),

    /// Print the prior, posterior, and approximation density series
    Series(SeriesArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

/// Which scenario to run.
#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Named scenario from the scenario file
    #[arg(long, conflicts_with_all = ["trials", "successes", "prior_alpha", "prior_beta"])]
    scenario: Option<String>,

    /// Prior alpha (pseudo-successes)
    #[arg(long, default_value_t = 1.0)]
    prior_alpha: f64,

    /// Prior beta (pseudo-failures)
    #[arg(long, default_value_t = 1.0)]
    prior_beta: f64,

    /// Number of trials observed
    #[arg(long, required_unless_present = "scenario")]
    trials: Option<u64>,

    /// Number of successes observed
    #[arg(long, required_unless_present = "scenario")]
    successes: Option<u64>,

    /// Label for an ad hoc scenario
    #[arg(long, default_value = "cli")]
    name: String,
}

/// Overrides for the shared grid, mode, and interval settings.
#[derive(Args, Debug)]
struct SettingsArgs {
    /// Grid step on [0, 1]
    #[arg(long)]
    step: Option<f64>,

    /// Mode finder: numeric or closed-form
    #[arg(long)]
    strategy: Option<ModeStrategy>,

    /// Mass of the compared central intervals
    #[arg(long)]
    interval_mass: Option<f64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Series rendering
    #[arg(long, default_value = "json")]
    render: RenderKind,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved scenario file
    Show,

    /// Validate a scenario file
    Validate {
        /// Path to the file (defaults to the resolved one)
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    // JSON on stdout pairs with JSONL on stderr unless QUAP_LOG_FORMAT says otherwise
    let paired_format = match cli.global.format {
        OutputFormat::Json => LogFormat::Jsonl,
        _ => LogFormat::Human,
    };
    let log_config = LogConfig::from_env(
        LogConfig::cli_level(cli.global.verbose, cli.global.quiet),
        paired_format,
    );
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());

    let result = match &cli.command {
        Commands::Run(args) => cmd_run(&cli.global, &ctx, args),
        Commands::Sweep(args) => cmd_sweep(&cli.global, &ctx, args),
        Commands::Series(args) => cmd_series(&cli.global, &ctx, args),
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => cmd_config_show(&cli.global, &ctx),
            ConfigCommands::Validate { path } => {
                cmd_config_validate(&cli.global, &ctx, path.as_deref())
            }
        },
        Commands::Version => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => {
            let message = err.to_string();
            log_event!(
                ctx,
                ERROR,
                event_names::RUN_FINISHED,
                Stage::Render,
                message.as_str(),
                code = err.code()
            );
            eprintln!(
                "{}",
                output::format_error(cli.global.format, &ctx.run_id, &err)
            );
            err.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Resolve, load, and validate the scenario file.
fn load_scenarios(global: &GlobalOpts, ctx: &LogContext) -> Result<ScenarioFile, CoreError> {
    let paths = resolve_config(global.scenarios.as_deref(), global.config.as_deref());
    let source = paths.source.to_string();

    let file = match load_resolved(&paths) {
        Ok(file) => file,
        Err(err) => {
            let message = err.to_string();
            log_event!(
                ctx,
                ERROR,
                event_names::CONFIG_ERROR,
                Stage::Init,
                message.as_str(),
                source = source.as_str()
            );
            return Err(err.into());
        }
    };

    match &paths.scenarios {
        Some(path) => {
            let path = path.display().to_string();
            log_event!(
                ctx,
                INFO,
                event_names::CONFIG_LOADED,
                Stage::Init,
                "scenario file loaded",
                source = source.as_str(),
                path = path.as_str(),
                scenarios = file.scenarios.len() as u64
            );
        }
        None => {
            log_event!(
                ctx,
                INFO,
                event_names::CONFIG_DEFAULT_USED,
                Stage::Init,
                "no scenario file found, using builtin scenarios",
                scenarios = file.scenarios.len() as u64
            );
        }
    }
    Ok(file)
}

fn invalid_argument(flag: &str, message: impl Into<String>) -> CoreError {
    CoreError::InvalidArgument {
        flag: flag.to_string(),
        message: message.into(),
    }
}

/// Shared settings with CLI overrides applied, checked before any stage runs.
fn settings_for(file: &ScenarioFile, args: &SettingsArgs) -> Result<WalkthroughSettings, CoreError> {
    let mut settings = WalkthroughSettings::from_config(file)?;
    if let Some(step) = args.step {
        settings.grid = Grid::new(file.grid.start, file.grid.end, step).map_err(|e| match e {
            ApproxError::InvalidParameter { message, .. } => invalid_argument("step", message),
            other => other.into(),
        })?;
    }
    if let Some(strategy) = args.strategy {
        settings.mode = settings.mode.with_strategy(strategy);
    }
    if let Some(mass) = args.interval_mass {
        if !(mass > 0.0 && mass < 1.0) {
            return Err(invalid_argument(
                "interval-mass",
                format!("must lie in (0, 1), got {}", mass),
            ));
        }
        settings.interval_mass = mass;
    }
    Ok(settings)
}

fn scenario_for(file: &ScenarioFile, args: &ScenarioArgs) -> Result<Scenario, CoreError> {
    if let Some(name) = &args.scenario {
        let spec = file
            .scenario(name)
            .ok_or_else(|| CoreError::UnknownScenario(name.clone()))?;
        return Scenario::from_spec(spec);
    }
    let prior = PriorParameters::new(args.prior_alpha, args.prior_beta)?;
    let observation = Observation::new(
        args.trials.unwrap_or_default(),
        args.successes.unwrap_or_default(),
    )?;
    Ok(Scenario::new(args.name.clone(), prior, observation))
}

fn emit(ctx: &LogContext, command: &str, payload: &str) {
    println!("{}", payload);
    log_event!(
        ctx,
        DEBUG,
        event_names::RENDER_FINISHED,
        Stage::Render,
        "output written",
        command = command,
        bytes = payload.len() as u64
    );
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_run(global: &GlobalOpts, ctx: &LogContext, args: &RunArgs) -> Result<ExitCode, CoreError> {
    let file = load_scenarios(global, ctx)?;
    let settings = settings_for(&file, &args.settings)?;
    let scenario = scenario_for(&file, &args.scenario)?;

    let report = Walkthrough::new(settings)
        .with_context(ctx.clone())
        .run(&scenario)?;

    let out = output::format_report(global.format, &ctx.run_id, &report)?;
    emit(ctx, "run", &out);
    Ok(ExitCode::Clean)
}

fn cmd_sweep(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &SettingsArgs,
) -> Result<ExitCode, CoreError> {
    let file = load_scenarios(global, ctx)?;
    let settings = settings_for(&file, args)?;
    let scenarios = scenarios_from_config(&file)?;

    let sweep = Walkthrough::new(settings)
        .with_context(ctx.clone())
        .sweep(&scenarios);

    let out = output::format_sweep(global.format, &ctx.run_id, &sweep)?;
    emit(ctx, "sweep", &out);

    if sweep.failures() > 0 {
        log_event!(
            ctx,
            WARN,
            event_names::RUN_FINISHED,
            Stage::Render,
            "sweep finished with failing scenarios",
            failures = sweep.failures() as u64
        );
        Ok(ExitCode::NumericError)
    } else {
        Ok(ExitCode::Clean)
    }
}

fn cmd_series(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &SeriesArgs,
) -> Result<ExitCode, CoreError> {
    let file = load_scenarios(global, ctx)?;
    let settings = settings_for(&file, &args.settings)?;
    let scenario = scenario_for(&file, &args.scenario)?;

    let report = Walkthrough::new(settings)
        .with_context(ctx.clone())
        .run(&scenario)?;

    let out = args
        .render
        .renderer()
        .render(&report.grid, &report.series_refs())?;
    emit(ctx, "series", out.trim_end());
    Ok(ExitCode::Clean)
}

fn cmd_config_show(global: &GlobalOpts, ctx: &LogContext) -> Result<ExitCode, CoreError> {
    let paths = resolve_config(global.scenarios.as_deref(), global.config.as_deref());
    let file = load_scenarios(global, ctx)?;
    let path = paths.scenarios.as_ref().map(|p| p.display().to_string());

    let out = match global.format {
        OutputFormat::Json => output::envelope(
            "config show",
            &ctx.run_id,
            serde_json::json!({
                "source": {
                    "kind": paths.source.to_string(),
                    "path": path,
                    "using_defaults": paths.scenarios.is_none(),
                },
                "config": file,
            }),
        )?,
        _ => {
            let mut lines = vec![format!(
                "scenario file: {} ({})",
                path.as_deref().unwrap_or("<builtin>"),
                paths.source
            )];
            lines.push(format!(
                "grid: [{}, {}] step {}; mode strategy {}; interval mass {}",
                file.grid.start, file.grid.end, file.grid.step, file.mode_strategy, file.interval_mass
            ));
            for s in &file.scenarios {
                lines.push(format!(
                    "  {}: Beta({}, {}) prior, {} of {}",
                    s.name, s.prior.alpha, s.prior.beta, s.observation.successes, s.observation.trials
                ));
            }
            lines.join("\n")
        }
    };
    emit(ctx, "config show", &out);
    Ok(ExitCode::Clean)
}

fn cmd_config_validate(
    global: &GlobalOpts,
    ctx: &LogContext,
    path: Option<&Path>,
) -> Result<ExitCode, CoreError> {
    let file = match path {
        Some(path) => {
            let file = ScenarioFile::from_file(path)?;
            validate_scenarios(&file)?;
            file
        }
        None => load_scenarios(global, ctx)?,
    };
    let shown = path.map(|p| p.display().to_string());

    let out = match global.format {
        OutputFormat::Json => output::envelope(
            "config validate",
            &ctx.run_id,
            serde_json::json!({
                "valid": true,
                "path": shown,
                "schema_version": file.schema_version,
                "scenarios": file.scenarios.len(),
            }),
        )?,
        _ => format!(
            "{}: valid ({} scenarios)",
            shown.as_deref().unwrap_or("<resolved>"),
            file.scenarios.len()
        ),
    };
    emit(ctx, "config validate", &out);
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "quap_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{:#}", info);
        }
        _ => {
            println!("quap {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
