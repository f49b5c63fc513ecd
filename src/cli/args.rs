//! CLI argument definitions.
//!
//! All Clap derive structs for `melonfx` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::host::TriggerFormat;
use crate::observability::{ColorChoice, LogFormat};

// ============================================================================
// Root CLI
// ============================================================================

/// Gesture-driven watermelon choreography.
#[derive(Parser, Debug)]
#[command(name = "melonfx", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "MELONFX_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "MELONFX_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read pulse names line by line and write triggers to stdout.
    Run(RunArgs),

    /// Replay gesture scripts on a virtual clock and check their expectations.
    Replay(ReplayArgs),

    /// Validate gesture scripts and configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run / Replay / Validate
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read pulses from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "MELONFX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Simulate the host's animation-complete pulses.
    #[arg(long)]
    pub auto_confirm: bool,

    /// Trigger line format on stdout (overrides config).
    #[arg(short, long)]
    pub format: Option<TriggerFormat>,

    /// Write the JSONL event stream to this file (overrides config).
    #[arg(long, env = "MELONFX_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "MELONFX_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script files, or directories of `.yaml` scripts.
    #[arg(required = true)]
    pub scripts: Vec<PathBuf>,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "MELONFX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Simulate confirmations for scripts that do not say otherwise.
    #[arg(long)]
    pub auto_confirm: bool,

    /// Report format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Script or configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Report format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
