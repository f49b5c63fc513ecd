//! Error types for `melonfx`.
//!
//! The choreography core itself cannot fail: out-of-phase pulses are dropped
//! and host effects are fire-and-forget. Errors come from the layers around
//! it: loading configuration, reading gesture scripts, and checking replay
//! expectations.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `melonfx` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Gesture script could not be read or parsed
    pub const SCRIPT_ERROR: i32 = 4;

    /// Replay finished but did not match the script's expectations
    pub const EXPECTATION_FAILED: i32 = 5;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `melonfx` operations.
#[derive(Debug, Error)]
pub enum MelonError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Gesture script error
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MelonError {
    /// Returns the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Script(ScriptError::ExpectationFailed { .. }) => ExitCode::EXPECTATION_FAILED,
            Self::Script(_) => ExitCode::SCRIPT_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", format_issues(.errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "simulation.cut_animation")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported, but loading continues
    Warning,
}

// ============================================================================
// Script Errors
// ============================================================================

/// Errors reading pulse input or replaying gesture scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A pulse name is not one of the seven known pulse kinds
    #[error("unknown pulse '{name}'{}", did_you_mean(.suggestion))]
    UnknownPulse {
        /// Name as written
        name: String,
        /// Closest known pulse name, if any is close
        suggestion: Option<String>,
    },

    /// Script file could not be parsed
    #[error("parse error in {path}: {message}")]
    Parse {
        /// Path to the script
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Script has no steps
    #[error("script {path} has no steps")]
    Empty {
        /// Path to the script
        path: PathBuf,
    },

    /// Replay outcome differs from the script's `expect` block
    #[error("{script}: expected {what} {expected}, got {actual}")]
    ExpectationFailed {
        /// Script name or path
        script: String,
        /// Which expectation failed ("triggers" or "phase")
        what: &'static str,
        /// Expected value, rendered
        expected: String,
        /// Actual value, rendered
        actual: String,
    },
}

#[allow(clippy::ref_option)]
fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}
