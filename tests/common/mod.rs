//! Shared integration-test helpers: library sessions and spawning the
//! `melonfx` binary.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use melonfx::host::{RecordingHost, Session};
use melonfx::pulse::PulseKind;

/// Pulse sequence that walks the whole choreography with manual
/// confirmations.
pub const FULL_RUN: [PulseKind; 10] = [
    PulseKind::BothHandsUp,
    PulseKind::BothHandsDown,
    PulseKind::WatermelonAnimatedIn,
    PulseKind::OneHandUp,
    PulseKind::BothHandsDown,
    PulseKind::WatermelonCut,
    PulseKind::BothHandsLeft,
    PulseKind::BothHandsRight,
    PulseKind::BothHandsUp,
    PulseKind::BothHandsDown,
];

/// Creates a fresh session over a recording host.
pub fn session() -> Session<RecordingHost> {
    Session::new(RecordingHost::new())
}

/// Fires every pulse in order.
pub fn fire_all(session: &mut Session<RecordingHost>, pulses: &[PulseKind]) {
    for pulse in pulses {
        session.fire(*pulse);
    }
}

/// A `melonfx` command with the environment overrides cleared.
pub fn melonfx() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_melonfx"));
    for var in [
        "MELONFX_CONFIG",
        "MELONFX_EVENTS_FILE",
        "MELONFX_METRICS_PORT",
        "MELONFX_LOG_LEVEL",
        "MELONFX_LOG_FORMAT",
        "MELONFX_COLOR",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Runs `melonfx` with `args` and no stdin.
#[allow(clippy::missing_panics_doc)]
pub fn run_command(args: &[&str]) -> Output {
    melonfx()
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to spawn melonfx")
}

/// Runs `melonfx` with `args`, writing `input` to its stdin.
#[allow(clippy::missing_panics_doc)]
pub fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = melonfx()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn melonfx");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for melonfx")
}

/// Non-empty stdout lines.
pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Stderr as text, for assertion messages.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Writes `contents` to `name` inside `dir`.
#[allow(clippy::missing_panics_doc)]
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}
