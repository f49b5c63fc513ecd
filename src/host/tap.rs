//! Trigger tap: a pass-through host that remembers what was emitted.

use crate::phase::{Phase, PhaseTransition};
use crate::pulse::{PulseKind, Trigger};

use super::Host;

/// Wraps a host and keeps the triggers emitted since the last
/// [`take_fresh`](Self::take_fresh).
///
/// Drivers use this to react to emissions (scheduling a simulated
/// confirmation, say) without the wrapped host knowing about it.
#[derive(Debug, Clone, Default)]
pub struct TriggerTap<H> {
    inner: H,
    fresh: Vec<Trigger>,
    total: usize,
}

impl<H: Host> TriggerTap<H> {
    /// Wraps `inner`.
    pub const fn new(inner: H) -> Self {
        Self {
            inner,
            fresh: Vec::new(),
            total: 0,
        }
    }

    /// Triggers emitted since the previous call, in emission order.
    pub fn take_fresh(&mut self) -> Vec<Trigger> {
        std::mem::take(&mut self.fresh)
    }

    /// Number of triggers emitted through the tap.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// The wrapped host.
    #[must_use]
    pub const fn inner(&self) -> &H {
        &self.inner
    }

    /// The wrapped host, mutably.
    pub const fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    /// Unwraps the host.
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Host> Host for TriggerTap<H> {
    fn emit_trigger(&mut self, trigger: Trigger) {
        self.inner.emit_trigger(trigger);
        self.fresh.push(trigger);
        self.total += 1;
    }

    fn log(&mut self, message: &str) {
        self.inner.log(message);
    }

    fn session_started(&mut self, phase: Phase) {
        self.inner.session_started(phase);
    }

    fn phase_entered(&mut self, transition: PhaseTransition) {
        self.inner.phase_entered(transition);
    }

    fn pulse_received(&mut self, kind: PulseKind, phase: Phase, handled: bool) {
        self.inner.pulse_received(kind, phase, handled);
    }
}
