//! Logging configuration.
//!
//! Level and format are settled once at startup. The level comes from the
//! `-v`/`-q` flags, then `QUAP_LOG`, then the most verbose `RUST_LOG`
//! directive, then info. The format comes from `QUAP_LOG_FORMAT`, falling
//! back to the format paired with stdout (JSONL beside JSON output, human
//! text otherwise).

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "QUAP_LOG";

/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "QUAP_LOG_FORMAT";

/// Generic tracing filter, consulted when `QUAP_LOG` is unset.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One [`super::LogEvent`] per line.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format '{}' (expected human or jsonl)", other)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Minimum level written. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    // Strings double as `EnvFilter` directives.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        })
    }
}

/// Most verbose level named by a `RUST_LOG` value such as
/// `quap_core=debug,warn`. Bare target directives are skipped.
fn most_verbose_directive(rust_log: &str) -> Option<LogLevel> {
    rust_log
        .split(',')
        .filter_map(|directive| directive.rsplit('=').next()?.parse::<LogLevel>().ok())
        .min()
}

/// Resolved logging setup handed to [`super::init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// Resolve against the process environment.
    ///
    /// `paired_format` is the format matching the stdout payload; it only
    /// applies when `QUAP_LOG_FORMAT` is unset or unreadable.
    pub fn from_env(cli_level: Option<LogLevel>, paired_format: LogFormat) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), cli_level, paired_format)
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn resolve<F>(env: F, cli_level: Option<LogLevel>, paired_format: LogFormat) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = cli_level
            .or_else(|| env(ENV_LOG_LEVEL).and_then(|v| v.parse().ok()))
            .or_else(|| env(ENV_RUST_LOG).as_deref().and_then(most_verbose_directive))
            .unwrap_or_default();
        let format = env(ENV_LOG_FORMAT)
            .and_then(|v| v.parse().ok())
            .unwrap_or(paired_format);
        LogConfig { format, level }
    }

    /// Level implied by the CLI verbosity flags, if any were given.
    pub fn cli_level(verbose: u8, quiet: bool) -> Option<LogLevel> {
        if quiet {
            return Some(LogLevel::Error);
        }
        match verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}
