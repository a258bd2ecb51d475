//! quap scenario configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for scenarios.json / scenarios.toml
//! - Config resolution (CLI → env → XDG → /etc → builtin)
//! - Semantic validation with stable error codes

pub mod resolve;
pub mod scenarios;
pub mod validate;

pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use scenarios::{GridSpec, ObservationSpec, PriorSpec, ScenarioFile, ScenarioSpec};
pub use validate::{validate_scenarios, ConfigError, ConfigResult};

/// Schema version for scenario files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Load, parse, and validate the scenario file chosen by `paths`.
///
/// Falls back to [`ScenarioFile::builtin_default`] when no file was found.
pub fn load_resolved(paths: &ConfigPaths) -> ConfigResult<ScenarioFile> {
    let file = match &paths.scenarios {
        Some(path) => ScenarioFile::from_file(path)?,
        None => ScenarioFile::builtin_default(),
    };
    validate_scenarios(&file)?;
    Ok(file)
}
