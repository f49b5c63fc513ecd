//! In-memory host.

use crate::phase::PhaseTransition;
use crate::pulse::Trigger;

use super::Host;

/// Host that keeps every effect in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    triggers: Vec<Trigger>,
    logs: Vec<String>,
    transitions: Vec<PhaseTransition>,
}

impl RecordingHost {
    /// Creates an empty recording host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers emitted so far.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Log lines written so far, including `STATE:` lines.
    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Phase transitions observed so far.
    #[must_use]
    pub fn transitions(&self) -> &[PhaseTransition] {
        &self.transitions
    }

    /// How many times `trigger` has been emitted.
    #[must_use]
    pub fn count(&self, trigger: Trigger) -> usize {
        self.triggers.iter().filter(|t| **t == trigger).count()
    }
}

impl Host for RecordingHost {
    fn emit_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    fn log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }

    fn phase_entered(&mut self, transition: PhaseTransition) {
        self.transitions.push(transition);
        self.log(&format!("STATE: {}", transition.to));
    }
}
