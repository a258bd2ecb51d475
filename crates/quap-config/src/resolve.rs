//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI arguments → environment variables → XDG paths →
//! system config → builtin defaults.

use std::path::{Path, PathBuf};

/// Discovered scenario file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the scenario file (or None if not found).
    pub scenarios: Option<PathBuf>,

    /// Where the scenario file came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/quap/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_SCENARIOS_PATH: &str = "QUAP_SCENARIOS";
pub const ENV_CONFIG_DIR: &str = "QUAP_CONFIG_DIR";

/// Scenario file names searched in config directories, in order.
const SCENARIO_FILENAMES: [&str; 2] = ["scenarios.json", "scenarios.toml"];

/// Application name for XDG directories.
const APP_NAME: &str = "quap";

/// Resolve the scenario file path using the standard resolution order.
///
/// 1. Explicit CLI file (`--scenarios`), used even if it does not exist so
///    that loading reports the missing file instead of silently falling back
/// 2. Explicit CLI directory (`--config DIR`) + filename
/// 3. `QUAP_SCENARIOS` environment variable
/// 4. `QUAP_CONFIG_DIR` environment variable + filename
/// 5. XDG config directory (~/.config/quap/)
/// 6. System config (/etc/quap/)
/// 7. Built-in defaults (None)
pub fn resolve_config(cli_file: Option<&Path>, cli_dir: Option<&Path>) -> ConfigPaths {
    // 1. CLI file
    if let Some(path) = cli_file {
        return found(path.to_path_buf(), ConfigSource::CliArgument);
    }

    // 2. CLI config dir
    if let Some(path) = cli_dir.and_then(find_in_dir) {
        return found(path, ConfigSource::CliArgument);
    }

    // 3. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_SCENARIOS_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 4. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            return found(path, ConfigSource::Environment);
        }
    }

    // 5. XDG config directory
    if let Some(path) = xdg_config_dir().as_deref().and_then(find_in_dir) {
        return found(path, ConfigSource::XdgConfig);
    }

    // 6. System config
    if let Some(path) = find_in_dir(&system_config_dir()) {
        return found(path, ConfigSource::SystemConfig);
    }

    // 7. Built-in default
    ConfigPaths::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPaths {
    ConfigPaths {
        scenarios: Some(path),
        source,
    }
}

/// First scenario file present in `dir`.
fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    SCENARIO_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Get the XDG config directory for quap.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
