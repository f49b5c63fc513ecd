//! Configuration for the `melonfx` host adapters.
//!
//! Only the surroundings are configurable: whether host confirmations are
//! simulated and how long each simulated animation takes, and where triggers
//! and events are written. The choreography itself is fixed.
//!
//! ```yaml
//! simulation:
//!   auto_confirm: true
//!   entry_animation: 1500ms
//!   cut_animation: 800ms
//! output:
//!   format: json
//!   events_file: events.jsonl
//! ```

pub mod loader;

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::host::TriggerFormat;

pub use loader::{ConfigLoader, LoadResult, LoaderOptions};

/// Default length of the watermelon entry animation.
pub const DEFAULT_ENTRY_ANIMATION: Duration = Duration::from_millis(1500);

/// Default length of the cut animation.
pub const DEFAULT_CUT_ANIMATION: Duration = Duration::from_millis(800);

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Simulated host behaviour.
    pub simulation: SimulationConfig,
    /// Trigger and event output.
    pub output: OutputConfig,
}

/// Simulated host confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fire `watermelonAnimatedIn` / `watermelonCut` automatically after the
    /// matching trigger.
    pub auto_confirm: bool,
    /// Delay before `watermelonAnimatedIn`.
    #[serde(deserialize_with = "duration_str::deserialize")]
    pub entry_animation: Duration,
    /// Delay before `watermelonCut`.
    #[serde(deserialize_with = "duration_str::deserialize")]
    pub cut_animation: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auto_confirm: false,
            entry_animation: DEFAULT_ENTRY_ANIMATION,
            cut_animation: DEFAULT_CUT_ANIMATION,
        }
    }
}

/// Where triggers and events go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Trigger line format on stdout.
    pub format: TriggerFormat,
    /// Optional JSONL event stream.
    pub events_file: Option<PathBuf>,
}

/// Human-readable durations (`"1500ms"`, `"2s"`) via `humantime`.
pub mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    /// Deserializes a `humantime` duration string.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a string or not a valid duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
