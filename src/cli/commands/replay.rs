//! `replay`: run gesture scripts on a virtual clock.

use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, info};

use crate::cli::args::{OutputFormat, ReplayArgs};
use crate::config::SimulationConfig;
use crate::error::MelonError;
use crate::host::RecordingHost;
use crate::script::{self, ReplayOutcome, Script};

/// Replays every script and reports each result on stdout.
///
/// All scripts run even when an earlier one fails.
///
/// # Errors
///
/// Returns the first failure: a script that cannot be loaded, or an
/// outcome that does not match its `expect` block.
pub fn run(args: &ReplayArgs) -> Result<(), MelonError> {
    let config = super::load_config(args.config.as_deref())?;
    let mut simulation = config.simulation;
    simulation.auto_confirm |= args.auto_confirm;

    let mut first_failure = None;
    let mut passed = 0_usize;
    let paths = expand(&args.scripts)?;

    for path in &paths {
        match replay_one(path, &simulation) {
            Ok(outcome) => {
                passed += 1;
                report_pass(args.format, path, &outcome);
            }
            Err(e) => {
                report_fail(args.format, path, &e);
                first_failure.get_or_insert(e);
            }
        }
    }

    info!(total = paths.len(), passed, "replay finished");
    first_failure.map_or(Ok(()), Err)
}

fn replay_one(path: &Path, simulation: &SimulationConfig) -> Result<ReplayOutcome, MelonError> {
    let script = Script::load(path)?;
    let (outcome, host) = script::replay(&script, simulation, RecordingHost::new());
    for line in host.logs() {
        debug!(target: "melonfx::host", script = %outcome.name, "{line}");
    }
    if let Some(expect) = &script.expect {
        outcome.check(expect)?;
    }
    Ok(outcome)
}

/// Replaces directory arguments with the scripts they contain.
fn expand(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, MelonError> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(script::discover(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn report_pass(format: OutputFormat, path: &Path, outcome: &ReplayOutcome) {
    match format {
        OutputFormat::Human => println!(
            "PASS {} ({} triggers, phase {}, {} pulses dropped)",
            outcome.name,
            outcome.triggers.len(),
            outcome.phase,
            outcome.dropped
        ),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "script": path.display().to_string(),
                "name": outcome.name,
                "passed": true,
                "triggers": outcome.triggers,
                "phase": outcome.phase,
                "pulses": outcome.pulses,
                "dropped": outcome.dropped,
                "elapsed_ms": u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            })
        ),
    }
}

fn report_fail(format: OutputFormat, path: &Path, error: &MelonError) {
    match format {
        OutputFormat::Human => println!("FAIL {}: {error}", path.display()),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "script": path.display().to_string(),
                "passed": false,
                "error": error.to_string(),
                "exit_code": error.exit_code(),
            })
        ),
    }
}
