//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod replay;
pub mod run;
pub mod validate;
pub mod version;

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::config::{Config, ConfigLoader, LoaderOptions};
use crate::error::MelonError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), MelonError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Replay(args) => replay::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the configuration at `path`, or the defaults when there is none.
///
/// Warnings are logged.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, MelonError> {
    let Some(path) = path else {
        tracing::debug!("no configuration file, using defaults");
        return Ok(Config::default());
    };

    tracing::info!(config = %path.display(), "loading configuration");
    let load_result = ConfigLoader::new(LoaderOptions::default()).load(path)?;
    for warning in &load_result.warnings {
        tracing::warn!(location = %warning.path, "{}", warning.message);
    }
    Ok(load_result.config)
}
