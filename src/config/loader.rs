//! Configuration loader.
//!
//! Pipeline:
//! 1. File size check
//! 2. Environment variable expansion on the raw text
//! 3. YAML parsing into the typed [`Config`]
//! 4. Validation (errors abort, warnings are returned)

use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, Severity, ValidationIssue};

use super::Config;

/// Default size limit for configuration files (1 MiB).
pub const DEFAULT_MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Simulated delays above this are reported as a warning.
const LONG_DELAY: Duration = Duration::from_secs(10 * 60);

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("MELONFX_MAX_CONFIG_SIZE", DEFAULT_MAX_CONFIG_SIZE),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Config,
    /// Warnings encountered during loading.
    pub warnings: Vec<ValidationIssue>,
}

/// Loads and validates YAML configuration files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, if an
    /// environment reference cannot be resolved, if the YAML does not match
    /// the schema, or if validation finds an error-level issue.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw, path)
    }

    /// Loads configuration from already-read text; `path` is used for
    /// error messages only.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load), minus the file system checks.
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let mut warnings = Vec::new();

        let expanded = expand_env(raw, path, &mut warnings, |var| std::env::var(var).ok())?;

        let config: Config = if expanded.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let (errors, issues): (Vec<_>, Vec<_>) = validate(&config)
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);

        if !errors.is_empty() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors,
            });
        }

        warnings.extend(issues);
        Ok(LoadResult { config, warnings })
    }
}

/// Checks a parsed configuration for suspicious values.
#[must_use]
pub fn validate(config: &Config) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let simulation = &config.simulation;

    for (path, delay) in [
        ("simulation.entry_animation", simulation.entry_animation),
        ("simulation.cut_animation", simulation.cut_animation),
    ] {
        if delay > LONG_DELAY {
            issues.push(ValidationIssue {
                path: path.to_string(),
                message: format!(
                    "delay of {} is unusually long",
                    humantime::format_duration(delay)
                ),
                severity: Severity::Warning,
            });
        }
    }

    if let Some(events_file) = &config.output.events_file {
        if events_file.as_os_str().is_empty() {
            issues.push(ValidationIssue {
                path: "output.events_file".to_string(),
                message: "path is empty".to_string(),
                severity: Severity::Error,
            });
        }
    }

    issues
}

/// Expands `${VAR}`, `${VAR:-default}` and `${VAR:?message}` references;
/// `$$` is a literal `$`.
///
/// An unset `${VAR}` expands to the empty string and adds a warning.
fn expand_env(
    raw: &str,
    path: &Path,
    warnings: &mut Vec<ValidationIssue>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
        } else if let Some(body) = tail.strip_prefix('{') {
            let Some(close) = body.find('}') else {
                return Err(ConfigError::ParseError {
                    path: path.to_path_buf(),
                    message: format!("unclosed environment reference: ${{{body}"),
                });
            };
            let spec = &body[..close];
            rest = &body[close + 1..];

            let (var, fallback) = match spec.split_once(':') {
                Some((var, modifier)) => (var, Some(modifier)),
                None => (spec, None),
            };

            match (lookup(var), fallback) {
                (Some(value), _) => out.push_str(&value),
                (None, Some(modifier)) if modifier.starts_with('-') => out.push_str(&modifier[1..]),
                (None, Some(modifier)) if modifier.starts_with('?') => {
                    return Err(ConfigError::EnvVarNotSet {
                        var: var.to_string(),
                        location: format!("{}: {}", path.display(), &modifier[1..]),
                    });
                }
                (None, _) => warnings.push(ValidationIssue {
                    path: path.display().to_string(),
                    message: format!("environment variable '{var}' is not set, using empty string"),
                    severity: Severity::Warning,
                }),
            }
        } else {
            out.push('$');
            rest = tail;
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
