//! Gesture scripts.
//!
//! A gesture script is a YAML file naming a pulse sequence and, optionally,
//! the outcome it should produce:
//!
//! ```yaml
//! name: early cut
//! auto_confirm: false
//! steps:
//!   - pulse: bothHandsUp
//!   - pulse: bothHandsDown
//!   - wait: 200ms
//!   - oneHandUp
//!   - pulse: bothHandsDown
//!   - pulse: watermelonAnimatedIn
//! expect:
//!   triggers: [animateInWatermelon, cutWatermelon]
//!   phase: CutWatermelon
//! ```
//!
//! A bare string step is shorthand for `pulse:`. Scripts replay on a virtual
//! clock: `wait` advances it and delivers every simulated confirmation that
//! falls due along the way. When the steps run out, the clock keeps running
//! until no confirmation is pending.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::ScriptError;
use crate::host::{Driver, Host};
use crate::phase::Phase;
use crate::pulse::{PulseKind, Trigger};

/// Largest script file accepted.
pub const MAX_SCRIPT_SIZE: u64 = 1024 * 1024;

// ============================================================================
// Script model
// ============================================================================

/// One step of a gesture script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Deliver a pulse.
    Pulse(PulseKind),
    /// Advance the virtual clock.
    Wait(Duration),
}

/// Expected replay outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Exact trigger sequence.
    pub triggers: Option<Vec<Trigger>>,
    /// Phase at the end of the replay.
    pub phase: Option<Phase>,
}

/// A parsed gesture script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Display name; the file path when the script has none.
    pub name: String,
    /// Overrides the configured `auto_confirm` when set.
    pub auto_confirm: Option<bool>,
    /// Steps in order.
    pub steps: Vec<Step>,
    /// Outcome to check after replay.
    pub expect: Option<Expectation>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScript {
    name: Option<String>,
    auto_confirm: Option<bool>,
    #[serde(default)]
    steps: Vec<RawStep>,
    expect: Option<Expectation>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStep {
    Bare(String),
    Pulse {
        pulse: String,
    },
    Wait {
        #[serde(deserialize_with = "crate::config::duration_str::deserialize")]
        wait: Duration,
    },
}

impl Script {
    /// Reads and parses a script file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read, and a
    /// [`ScriptError`] when it is too large, malformed, names an unknown
    /// pulse, or has no steps.
    pub fn load(path: &Path) -> Result<Self, crate::error::MelonError> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_SCRIPT_SIZE {
            return Err(ScriptError::Parse {
                path: path.to_path_buf(),
                message: format!("{size} bytes exceeds the {MAX_SCRIPT_SIZE} byte limit"),
            }
            .into());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::parse(&raw, path)?)
    }

    /// Parses script text; `path` is used for the default name and errors.
    ///
    /// # Errors
    ///
    /// Returns a [`ScriptError`] when the text is malformed, names an
    /// unknown pulse, or has no steps.
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ScriptError> {
        let raw: RawScript = serde_yaml::from_str(raw).map_err(|e| ScriptError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if raw.steps.is_empty() {
            return Err(ScriptError::Empty {
                path: path.to_path_buf(),
            });
        }

        let steps = raw
            .steps
            .into_iter()
            .map(|step| match step {
                RawStep::Bare(name) | RawStep::Pulse { pulse: name } => {
                    name.parse().map(Step::Pulse)
                }
                RawStep::Wait { wait } => Ok(Step::Wait(wait)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: raw.name.unwrap_or_else(|| path.display().to_string()),
            auto_confirm: raw.auto_confirm,
            steps,
            expect: raw.expect,
        })
    }
}

/// Parses one line of pulse input.
///
/// Blank lines and `#` comments yield `Ok(None)`; trailing comments are
/// stripped.
///
/// # Errors
///
/// Returns [`ScriptError::UnknownPulse`] for anything else that is not a
/// pulse name.
pub fn parse_pulse_line(line: &str) -> Result<Option<PulseKind>, ScriptError> {
    let content = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if content.is_empty() {
        return Ok(None);
    }
    content.parse().map(Some)
}

// ============================================================================
// Replay
// ============================================================================

/// What a replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Script name.
    pub name: String,
    /// Every emitted trigger, in order.
    pub triggers: Vec<Trigger>,
    /// Phase at the end of the replay.
    pub phase: Phase,
    /// Pulses delivered, confirmations included.
    pub pulses: usize,
    /// Pulses the current phase had no handler for.
    pub dropped: usize,
    /// Virtual time at the end of the replay.
    pub elapsed: Duration,
}

impl ReplayOutcome {
    /// Compares the outcome with `expect`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::ExpectationFailed`] on the first mismatch,
    /// triggers before phase.
    pub fn check(&self, expect: &Expectation) -> Result<(), ScriptError> {
        if let Some(triggers) = &expect.triggers {
            if *triggers != self.triggers {
                return Err(self.mismatch("triggers", List(triggers), List(&self.triggers)));
            }
        }
        if let Some(phase) = expect.phase {
            if phase != self.phase {
                return Err(self.mismatch("phase", phase, self.phase));
            }
        }
        Ok(())
    }

    fn mismatch(
        &self,
        what: &'static str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> ScriptError {
        ScriptError::ExpectationFailed {
            script: self.name.clone(),
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

struct List<'a>(&'a [Trigger]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, trigger) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{trigger}")?;
        }
        f.write_str("]")
    }
}

/// Replays `script` against `host` and returns the outcome and the host.
///
/// Expectations are not checked here; see [`ReplayOutcome::check`].
pub fn replay<H: Host>(
    script: &Script,
    simulation: &SimulationConfig,
    host: H,
) -> (ReplayOutcome, H) {
    let auto_confirm = script.auto_confirm.unwrap_or(simulation.auto_confirm);
    let mut driver = Driver::new(host, simulation, auto_confirm);
    for step in &script.steps {
        match *step {
            Step::Pulse(kind) => driver.deliver(kind),
            Step::Wait(duration) => driver.advance_by(duration),
        }
    }
    driver.settle();

    let outcome = ReplayOutcome {
        name: script.name.clone(),
        triggers: driver.triggers().to_vec(),
        phase: driver.phase(),
        pulses: driver.pulses(),
        dropped: driver.dropped(),
        elapsed: driver.now(),
    };
    if outcome.dropped > 0 {
        debug!(script = %outcome.name, dropped = outcome.dropped, "pulses dropped");
    }
    if !outcome.phase.is_terminal() {
        info!(script = %outcome.name, phase = %outcome.phase, "replay ended before the final phase");
    }
    (outcome, driver.into_host())
}

/// Paths of every `.yaml`/`.yml` script in `dir`, sorted.
///
/// # Errors
///
/// Returns an I/O error when the directory cannot be read.
pub fn discover(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    fn parse(raw: &str) -> Result<Script, ScriptError> {
        Script::parse(raw, Path::new("test.yaml"))
    }

    fn simulation(auto_confirm: bool) -> SimulationConfig {
        SimulationConfig {
            auto_confirm,
            entry_animation: Duration::from_millis(100),
            cut_animation: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_parse_mixed_steps() {
        let script = parse(
            "name: demo\nsteps:\n  - pulse: bothHandsUp\n  - bothHandsDown\n  - wait: 250ms\n",
        )
        .unwrap();

        assert_eq!(script.name, "demo");
        assert_eq!(
            script.steps,
            vec![
                Step::Pulse(PulseKind::BothHandsUp),
                Step::Pulse(PulseKind::BothHandsDown),
                Step::Wait(Duration::from_millis(250)),
            ]
        );
        assert_eq!(script.auto_confirm, None);
        assert_eq!(script.expect, None);
    }

    #[test]
    fn test_name_defaults_to_path() {
        let script = parse("steps: [bothHandsUp]\n").unwrap();
        assert_eq!(script.name, "test.yaml");
    }

    #[test]
    fn test_unknown_pulse_in_step() {
        let err = parse("steps:\n  - pulse: bothHandsUpp\n").unwrap_err();
        assert!(
            matches!(err, ScriptError::UnknownPulse { ref suggestion, .. } if suggestion.as_deref() == Some("bothHandsUp")),
            "{err}"
        );
    }

    #[test]
    fn test_empty_script_rejected() {
        assert!(matches!(parse("name: nothing\n"), Err(ScriptError::Empty { .. })));
        assert!(matches!(parse("steps: []\n"), Err(ScriptError::Empty { .. })));
    }

    #[test]
    fn test_malformed_script_rejected() {
        assert!(matches!(
            parse("steps:\n  - dance: true\n"),
            Err(ScriptError::Parse { .. })
        ));
        assert!(matches!(
            parse("steps: [bothHandsUp]\nrepeat: 3\n"),
            Err(ScriptError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_pulse_line() {
        assert_eq!(parse_pulse_line("  oneHandUp  ").unwrap(), Some(PulseKind::OneHandUp));
        assert_eq!(
            parse_pulse_line("bothHandsLeft # swipe").unwrap(),
            Some(PulseKind::BothHandsLeft)
        );
        assert_eq!(parse_pulse_line("").unwrap(), None);
        assert_eq!(parse_pulse_line("   # just a comment").unwrap(), None);
        assert!(parse_pulse_line("wave").is_err());
    }

    #[test]
    fn test_replay_without_confirmation_stalls_in_start() {
        let script = parse("steps: [bothHandsUp, bothHandsDown]\n").unwrap();
        let (outcome, host) = replay(&script, &simulation(false), RecordingHost::new());

        assert_eq!(outcome.triggers, vec![Trigger::AnimateInWatermelon]);
        assert_eq!(outcome.phase, Phase::Start);
        assert_eq!(outcome.elapsed, Duration::ZERO);
        assert_eq!(host.triggers(), [Trigger::AnimateInWatermelon]);
    }

    #[test]
    fn test_replay_auto_confirm_settles_pending_confirmations() {
        let script = parse("steps: [bothHandsUp, bothHandsDown]\n").unwrap();
        let (outcome, _) = replay(&script, &simulation(true), RecordingHost::new());

        assert_eq!(outcome.phase, Phase::CutWatermelon);
        assert_eq!(outcome.pulses, 3);
        assert_eq!(outcome.elapsed, Duration::from_millis(100));
    }

    #[test]
    fn test_wait_delivers_confirmation_before_next_pulse() {
        let script = parse(
            "auto_confirm: true\nsteps:\n  - bothHandsUp\n  - bothHandsDown\n  - wait: 150ms\n  - oneHandUp\n  - bothHandsDown\n  - wait: 50ms\n  - bothHandsLeft\n  - bothHandsRight\n  - bothHandsUp\n  - bothHandsDown\n",
        )
        .unwrap();
        let (outcome, _) = replay(&script, &simulation(false), RecordingHost::new());

        assert_eq!(outcome.triggers, Trigger::ALL.to_vec());
        assert_eq!(outcome.phase, Phase::ShowTaijitu);
        assert_eq!(outcome.elapsed, Duration::from_millis(200));
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_short_wait_leaves_confirmation_pending() {
        let script = parse(
            "auto_confirm: true\nsteps:\n  - bothHandsUp\n  - bothHandsDown\n  - wait: 40ms\n  - bothHandsLeft\n",
        )
        .unwrap();
        let (outcome, _) = replay(&script, &simulation(false), RecordingHost::new());

        // bothHandsLeft lands while still in Start and is dropped.
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.phase, Phase::CutWatermelon);
        assert_eq!(outcome.elapsed, Duration::from_millis(100));
    }

    #[test]
    fn test_check_expectations() {
        let outcome = ReplayOutcome {
            name: "demo".into(),
            triggers: vec![Trigger::AnimateInWatermelon],
            phase: Phase::Start,
            pulses: 2,
            dropped: 0,
            elapsed: Duration::ZERO,
        };

        assert!(outcome.check(&Expectation::default()).is_ok());
        assert!(
            outcome
                .check(&Expectation {
                    triggers: Some(vec![Trigger::AnimateInWatermelon]),
                    phase: Some(Phase::Start),
                })
                .is_ok()
        );

        let err = outcome
            .check(&Expectation {
                triggers: Some(vec![Trigger::AnimateInWatermelon, Trigger::CutWatermelon]),
                phase: None,
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "demo: expected triggers [animateInWatermelon, cutWatermelon], got [animateInWatermelon]"
        );

        let err = outcome
            .check(&Expectation {
                triggers: None,
                phase: Some(Phase::ShowTaijitu),
            })
            .unwrap_err();
        assert!(matches!(err, ScriptError::ExpectationFailed { what: "phase", .. }));
    }

    #[test]
    fn test_discover_sorts_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "steps: [oneHandUp]\n").unwrap();
        std::fs::write(dir.path().join("a.yml"), "steps: [oneHandUp]\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let found = discover(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.yml", "b.yaml"]);
    }
}
