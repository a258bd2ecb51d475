//! Scenario file types.
//!
//! A scenario file lists the prior/observation pairs to walk through, plus
//! the grid and mode settings shared by all of them. Files are JSON or TOML,
//! chosen by extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::validate::{ConfigError, ConfigResult};

/// Complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub grid: GridSpec,

    /// `"numeric"` or `"closed-form"`.
    #[serde(default = "default_mode_strategy")]
    pub mode_strategy: String,

    /// Mass of the central credible intervals to compare.
    #[serde(default = "default_interval_mass")]
    pub interval_mass: f64,

    pub scenarios: Vec<ScenarioSpec>,
}

/// Evaluation grid over the parameter axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            start: 0.0,
            end: 1.0,
            step: 0.001,
        }
    }
}

/// One prior + observation pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub prior: PriorSpec,

    pub observation: ObservationSpec,
}

/// Beta prior hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorSpec {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for PriorSpec {
    fn default() -> Self {
        PriorSpec {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

/// Binomial observation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpec {
    pub trials: u64,
    pub successes: u64,
}

fn default_mode_strategy() -> String {
    "numeric".to_string()
}

fn default_interval_mass() -> f64 {
    0.89
}

impl ScenarioFile {
    /// Load a scenario file, parsing TOML for `.toml` files and JSON otherwise.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse a scenario file from a JSON string.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse a scenario file from a TOML string.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Look up a scenario by name.
    pub fn scenario(&self, name: &str) -> Option<&ScenarioSpec> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// The builtin globe-tossing scenarios: 2/3 water at growing sample
    /// sizes under a flat prior.
    pub fn builtin_default() -> Self {
        let globe = |name: &str, trials: u64, successes: u64, description: &str| ScenarioSpec {
            name: name.to_string(),
            description: Some(description.to_string()),
            prior: PriorSpec::default(),
            observation: ObservationSpec { trials, successes },
        };

        ScenarioFile {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: Some("Globe tossing: 2/3 water under a flat prior".to_string()),
            grid: GridSpec::default(),
            mode_strategy: default_mode_strategy(),
            interval_mass: default_interval_mass(),
            scenarios: vec![
                globe("globe-9", 9, 6, "nine tosses"),
                globe("globe-18", 18, 12, "sample doubled"),
                globe("globe-36", 36, 24, "sample quadrupled"),
                globe("globe-30", 30, 20, "Beta(21, 11) reference posterior"),
            ],
        }
    }
}
