//! `validate`: check scripts and configuration files without running them.
//!
//! A YAML mapping with a `steps` key is a gesture script; anything else is
//! read as configuration.

use std::path::Path;

use serde_json::json;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{ConfigError, MelonError, Severity, ValidationIssue};
use crate::script::Script;

/// What kind of file was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Gesture script.
    Script,
    /// Configuration file.
    Config,
}

impl FileKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Config => "config",
        }
    }
}

/// Validates every file and reports each result on stdout.
///
/// # Errors
///
/// Returns the first failure. With `--strict`, a file with warnings fails
/// too.
pub fn run(args: &ValidateArgs) -> Result<(), MelonError> {
    let mut first_failure = None;

    for path in &args.files {
        let result = validate_file(path).and_then(|(kind, warnings)| {
            if args.strict && !warnings.is_empty() {
                return Err(ConfigError::ValidationError {
                    path: path.display().to_string(),
                    errors: warnings,
                }
                .into());
            }
            Ok((kind, warnings))
        });

        match result {
            Ok((kind, warnings)) => report_ok(args.format, path, kind, &warnings),
            Err(e) => {
                report_err(args.format, path, &e);
                first_failure.get_or_insert(e);
            }
        }
    }

    first_failure.map_or(Ok(()), Err)
}

/// Validates one file and returns its kind and warnings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn validate_file(path: &Path) -> Result<(FileKind, Vec<ValidationIssue>), MelonError> {
    if !path.exists() {
        return Err(MelonError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }
    tracing::info!(file = %path.display(), "validating");

    let raw = std::fs::read_to_string(path)?;
    if looks_like_script(&raw) {
        let script = Script::load(path)?;
        Ok((FileKind::Script, script_warnings(&script)))
    } else {
        let result = ConfigLoader::new(LoaderOptions::default()).load(path)?;
        Ok((FileKind::Config, result.warnings))
    }
}

fn looks_like_script(raw: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(raw)
        .ok()
        .and_then(|value| value.as_mapping().map(|m| m.contains_key("steps")))
        .unwrap_or(false)
}

fn script_warnings(script: &Script) -> Vec<ValidationIssue> {
    let warning = |path: &str, message: &str| ValidationIssue {
        path: path.to_string(),
        message: message.to_string(),
        severity: Severity::Warning,
    };

    let mut warnings = Vec::new();
    match &script.expect {
        None => warnings.push(warning("expect", "script has no expect block")),
        Some(expect) if expect.triggers.is_none() && expect.phase.is_none() => {
            warnings.push(warning("expect", "expect block checks nothing"));
        }
        Some(_) => {}
    }
    warnings
}

fn report_ok(format: OutputFormat, path: &Path, kind: FileKind, warnings: &[ValidationIssue]) {
    match format {
        OutputFormat::Human => {
            println!("OK {} ({})", path.display(), kind.as_str());
            for warning in warnings {
                println!("  {warning}");
            }
        }
        OutputFormat::Json => println!(
            "{}",
            json!({
                "file": path.display().to_string(),
                "kind": kind.as_str(),
                "valid": true,
                "warnings": warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })
        ),
    }
}

fn report_err(format: OutputFormat, path: &Path, error: &MelonError) {
    match format {
        OutputFormat::Human => println!("INVALID {}: {error}", path.display()),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "file": path.display().to_string(),
                "valid": false,
                "error": error.to_string(),
            })
        ),
    }
}
