//! Console host: triggers to a stream, logs to `tracing`.

use std::io::Write;

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};
use crate::phase::{Phase, PhaseTransition};
use crate::pulse::{PulseKind, Trigger};

use super::Host;

/// How emitted triggers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerFormat {
    /// One trigger name per line.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

#[derive(Serialize)]
struct TriggerLine {
    trigger: Trigger,
    phase: Phase,
}

/// Host that writes triggers to a stream and records events and metrics.
///
/// Write failures on the trigger stream are logged and otherwise ignored;
/// emission never fails the caller.
pub struct ConsoleHost {
    out: Box<dyn Write + Send>,
    format: TriggerFormat,
    events: EventEmitter,
    phase: Phase,
    emitted: Vec<Trigger>,
}

impl std::fmt::Debug for ConsoleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleHost")
            .field("format", &self.format)
            .field("phase", &self.phase)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

impl ConsoleHost {
    /// Creates a host writing triggers to `out`.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>, format: TriggerFormat, events: EventEmitter) -> Self {
        Self {
            out,
            format,
            events,
            phase: Phase::Start,
            emitted: Vec::new(),
        }
    }

    /// Creates a host writing triggers to stdout.
    #[must_use]
    pub fn stdout(format: TriggerFormat, events: EventEmitter) -> Self {
        Self::new(Box::new(std::io::stdout()), format, events)
    }

    /// Every trigger emitted so far.
    #[must_use]
    pub fn emitted(&self) -> &[Trigger] {
        &self.emitted
    }

    /// Records the start of a session.
    pub fn started(&self, source: &str, auto_confirm: bool) {
        info!(source, auto_confirm, "session started");
        self.events.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            source: source.to_string(),
            auto_confirm,
        });
    }

    /// Records the end of a session.
    pub fn stopped(&self, reason: &str) {
        info!(reason, triggers = self.emitted.len(), "session stopped");
        self.events.emit(Event::SessionStopped {
            timestamp: Utc::now(),
            reason: reason.to_string(),
            triggers_emitted: self.emitted.len(),
        });
    }

    fn write_trigger(&mut self, trigger: Trigger) -> std::io::Result<()> {
        match self.format {
            TriggerFormat::Human => writeln!(self.out, "{trigger}")?,
            TriggerFormat::Json => {
                let line = serde_json::to_string(&TriggerLine {
                    trigger,
                    phase: self.phase,
                })
                .map_err(std::io::Error::other)?;
                writeln!(self.out, "{line}")?;
            }
        }
        self.out.flush()
    }
}

impl Host for ConsoleHost {
    fn emit_trigger(&mut self, trigger: Trigger) {
        if let Err(e) = self.write_trigger(trigger) {
            warn!(%trigger, error = %e, "failed to write trigger");
        }
        metrics::record_trigger(trigger);
        self.events.emit(Event::TriggerEmitted {
            timestamp: Utc::now(),
            trigger,
            phase: self.phase,
        });
        self.emitted.push(trigger);
    }

    fn log(&mut self, message: &str) {
        info!(target: "melonfx::host", "{message}");
    }

    fn phase_entered(&mut self, transition: PhaseTransition) {
        self.phase = transition.to;
        metrics::record_transition(transition.to);
        self.events.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            from: transition.from,
            to: transition.to,
        });
        self.log(&format!("STATE: {}", transition.to));
    }

    fn pulse_received(&mut self, pulse: PulseKind, phase: Phase, handled: bool) {
        metrics::record_pulse(pulse, handled);
        self.events.emit(Event::PulseReceived {
            timestamp: Utc::now(),
            pulse,
            phase,
            handled,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_human_format_writes_names() {
        let buf = SharedBuf::default();
        let mut host = ConsoleHost::new(
            Box::new(buf.clone()),
            TriggerFormat::Human,
            EventEmitter::noop(),
        );

        host.emit_trigger(Trigger::AnimateInWatermelon);
        host.emit_trigger(Trigger::CutWatermelon);

        assert_eq!(buf.contents(), "animateInWatermelon\ncutWatermelon\n");
    }

    #[test]
    fn test_json_format_includes_phase() {
        let buf = SharedBuf::default();
        let mut host = ConsoleHost::new(
            Box::new(buf.clone()),
            TriggerFormat::Json,
            EventEmitter::noop(),
        );

        host.phase_entered(PhaseTransition {
            from: Phase::CutWatermelon,
            to: Phase::PushOutHalves,
        });
        host.emit_trigger(Trigger::AnimateOutWatermelonLeft);

        let parsed: serde_json::Value = serde_json::from_str(buf.contents().trim()).unwrap();
        assert_eq!(parsed["trigger"], "animateOutWatermelonLeft");
        assert_eq!(parsed["phase"], "PushOutHalves");
    }

    #[test]
    fn test_events_recorded() {
        let events = SharedBuf::default();
        let mut host = ConsoleHost::new(
            Box::new(std::io::sink()),
            TriggerFormat::Human,
            EventEmitter::new(Box::new(events.clone())),
        );

        host.started("test", false);
        host.pulse_received(PulseKind::BothHandsUp, Phase::Start, true);
        host.emit_trigger(Trigger::AnimateInWatermelon);
        host.stopped("done");

        let types: Vec<String> = events
            .contents()
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            types,
            [
                "SessionStarted",
                "PulseReceived",
                "TriggerEmitted",
                "SessionStopped"
            ]
        );
    }
}
