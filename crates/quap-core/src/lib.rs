//! quap core library.
//!
//! Walks a Beta-Binomial posterior through its quadratic approximation:
//! posterior update, exact density, mode, normal approximation, and a
//! numeric comparison of the two, with structured logging along the way.

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod walkthrough;

pub use error::{CoreError, Result};
pub use walkthrough::{Scenario, Walkthrough, WalkthroughReport, WalkthroughSettings};

/// Schema version for JSON payloads written to stdout.
pub const SCHEMA_VERSION: &str = "1.0.0";
