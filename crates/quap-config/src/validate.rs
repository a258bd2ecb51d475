//! Configuration errors and semantic validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::scenarios::{GridSpec, ScenarioFile, ScenarioSpec};

/// Configuration result type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::IoError(_) => 60,
            ConfigError::ParseError(_) => 61,
            ConfigError::SemanticError(_) => 63,
            ConfigError::InvalidValue { .. } => 65,
            ConfigError::VersionMismatch { .. } => 66,
        }
    }

    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Mode strategies accepted in `mode_strategy`.
pub const MODE_STRATEGIES: [&str; 2] = ["numeric", "closed-form"];

/// Validate a scenario file semantically.
pub fn validate_scenarios(file: &ScenarioFile) -> ConfigResult<()> {
    // Check schema version
    if file.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ConfigError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: file.schema_version.clone(),
        });
    }

    validate_grid(&file.grid)?;

    if !MODE_STRATEGIES.contains(&file.mode_strategy.as_str()) {
        return Err(ConfigError::invalid(
            "mode_strategy",
            format!(
                "Must be one of {:?}, got {:?}",
                MODE_STRATEGIES, file.mode_strategy
            ),
        ));
    }

    if !(file.interval_mass > 0.0 && file.interval_mass < 1.0) {
        return Err(ConfigError::invalid(
            "interval_mass",
            format!("Must be in (0, 1), got {}", file.interval_mass),
        ));
    }

    if file.scenarios.is_empty() {
        return Err(ConfigError::SemanticError(
            "scenarios must contain at least one entry".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (idx, scenario) in file.scenarios.iter().enumerate() {
        validate_scenario(idx, scenario)?;
        if !seen.insert(scenario.name.as_str()) {
            return Err(ConfigError::SemanticError(format!(
                "duplicate scenario name {:?}",
                scenario.name
            )));
        }
    }

    Ok(())
}

/// Validate the grid bounds and step.
fn validate_grid(grid: &GridSpec) -> ConfigResult<()> {
    let finite = grid.start.is_finite() && grid.end.is_finite() && grid.step.is_finite();
    if !finite || grid.start < 0.0 || grid.end > 1.0 || grid.start >= grid.end {
        return Err(ConfigError::invalid(
            "grid",
            format!(
                "Must satisfy 0 <= start < end <= 1, got [{}, {}]",
                grid.start, grid.end
            ),
        ));
    }

    if grid.step <= 0.0 || grid.step > grid.end - grid.start {
        return Err(ConfigError::invalid(
            "grid.step",
            format!(
                "Must be positive and no wider than the grid, got {}",
                grid.step
            ),
        ));
    }

    Ok(())
}

/// Validate a single scenario.
fn validate_scenario(idx: usize, scenario: &ScenarioSpec) -> ConfigResult<()> {
    if scenario.name.trim().is_empty() {
        return Err(ConfigError::invalid(
            format!("scenarios[{}].name", idx),
            "Must not be empty",
        ));
    }

    let field = |leaf: &str| format!("scenarios.{}.{}", scenario.name, leaf);

    for (leaf, value) in [
        ("prior.alpha", scenario.prior.alpha),
        ("prior.beta", scenario.prior.beta),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::invalid(
                field(leaf),
                format!("Must be positive and finite, got {}", value),
            ));
        }
    }

    let obs = scenario.observation;
    if obs.successes > obs.trials {
        return Err(ConfigError::invalid(
            field("observation.successes"),
            format!(
                "Must not exceed trials ({}), got {}",
                obs.trials, obs.successes
            ),
        ));
    }

    Ok(())
}
