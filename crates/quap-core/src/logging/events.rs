//! Structured event definitions for logging.
//!
//! Events follow a consistent schema for machine-parseable JSONL output.
//! All events carry the run id, the scenario being walked through (when
//! there is one), and the pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of the walkthrough pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and scenario configuration.
    Init,
    /// Conjugate posterior update.
    Posterior,
    /// Exact Beta density over the grid.
    Density,
    /// Locating the posterior mode.
    Mode,
    /// Building the quadratic approximation.
    Approximate,
    /// Comparing exact and approximate densities.
    Compare,
    /// Rendering payloads to stdout.
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Posterior => "posterior",
            Stage::Density => "density",
            Stage::Mode => "mode",
            Stage::Approximate => "approximate",
            Stage::Compare => "compare",
            Stage::Render => "render",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(Stage::Init),
            "posterior" => Ok(Stage::Posterior),
            "density" => Ok(Stage::Density),
            "mode" => Ok(Stage::Mode),
            "approximate" => Ok(Stage::Approximate),
            "compare" => Ok(Stage::Compare),
            "render" => Ok(Stage::Render),
            _ => Err(format!("unknown stage: {}", s)),
        }
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Walkthrough stages
    pub const POSTERIOR_COMPUTED: &str = "posterior.computed";
    pub const DENSITY_EVALUATED: &str = "density.evaluated";
    pub const MODE_FOUND: &str = "mode.found";
    pub const MODE_FAILED: &str = "mode.failed";
    pub const APPROX_BUILT: &str = "approximate.built";
    pub const APPROX_FAILED: &str = "approximate.failed";
    pub const COMPARE_FINISHED: &str = "compare.finished";

    // Output
    pub const RENDER_FINISHED: &str = "render.finished";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";
}

/// A structured log event for JSONL output.
///
/// This is the line schema written by [`super::JsonlLayer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// Log level.
    pub level: Level,

    /// Event name (e.g., "run.started", "mode.found").
    pub event: String,

    /// Unique ID for this invocation of quap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// Scenario being walked through, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    /// Pipeline stage, when the event belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,

    /// Additional structured fields (stable keys).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent {
    /// Create a new log event with no correlation ids.
    pub fn new(level: Level, event: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: None,
            scenario: None,
            stage: None,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Correlation ids attached to every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
    /// Scenario name (None outside a walkthrough).
    pub scenario: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            scenario: None,
        }
    }

    /// Copy of this context scoped to one scenario.
    pub fn for_scenario(&self, scenario: impl Into<String>) -> Self {
        LogContext {
            run_id: self.run_id.clone(),
            scenario: Some(scenario.into()),
        }
    }

    /// Scenario name for log fields (`"-"` outside a walkthrough).
    pub fn scenario_label(&self) -> &str {
        self.scenario.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let ctx = LogContext::new("run-12345").for_scenario("globe-30");
        let mut event = LogEvent::new(Level::Info, "run.started", "Starting walkthrough");
        event.run_id = Some(ctx.run_id.clone());
        event.scenario.clone_from(&ctx.scenario);
        event.stage = Some(Stage::Init);
        event.fields.insert("trials".into(), serde_json::json!(30));

        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"run.started""#));
        assert!(json.contains(r#""level":"info""#));
        assert!(json.contains(r#""stage":"init""#));
        assert!(json.contains(r#""run_id":"run-12345""#));
        assert!(json.contains(r#""scenario":"globe-30""#));
        assert!(json.contains(r#""trials":30"#));
    }

    #[test]
    fn test_bare_event_omits_context() {
        let json = LogEvent::new(Level::Warn, "config.error", "bad file").to_jsonl();
        assert!(!json.contains("run_id"));
        assert!(!json.contains("stage"));
        assert!(!json.contains("fields"));
    }

    #[test]
    fn test_log_context() {
        let root = LogContext::new("run-abc");
        assert_eq!(root.scenario_label(), "-");
        let ctx = root.for_scenario("globe-9");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.scenario_label(), "globe-9");
    }

    #[test]
    fn test_stage_display_round_trips() {
        for stage in [
            Stage::Init,
            Stage::Posterior,
            Stage::Density,
            Stage::Mode,
            Stage::Approximate,
            Stage::Compare,
            Stage::Render,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
            assert_eq!(stage.to_string().parse::<Stage>().unwrap(), stage);
        }
        assert!("scan".parse::<Stage>().is_err());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::RUN_STARTED, "run.started");
        assert_eq!(event_names::MODE_FOUND, "mode.found");
        assert_eq!(event_names::APPROX_BUILT, "approximate.built");
    }
}
