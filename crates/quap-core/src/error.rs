//! Top-level error type for the walkthrough pipeline and CLI.

use quap_config::ConfigError;
use quap_math::ApproxError;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Result alias for quap-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A numeric precondition failed in the math layer.
    #[error(transparent)]
    Approx(#[from] ApproxError),

    /// Scenario configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),

    /// A command-line flag holds a value the run cannot use.
    #[error("invalid value for --{flag}: {message}")]
    InvalidArgument { flag: String, message: String },
}

impl CoreError {
    /// Stable error code for JSON envelopes.
    pub fn code(&self) -> u32 {
        match self {
            CoreError::Approx(e) => e.code(),
            CoreError::Config(e) => e.code(),
            CoreError::Io(_) => 21,
            CoreError::Serialize(_) => 20,
            CoreError::UnknownScenario(_) | CoreError::InvalidArgument { .. } => 10,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CoreError::Approx(_) => ExitCode::NumericError,
            CoreError::Config(ConfigError::IoError(_)) => ExitCode::IoError,
            CoreError::Config(_) => ExitCode::ConfigError,
            CoreError::Io(_) => ExitCode::IoError,
            CoreError::Serialize(_) => ExitCode::InternalError,
            CoreError::UnknownScenario(_) | CoreError::InvalidArgument { .. } => ExitCode::ArgsError,
        }
    }
}
