//! Session driver with simulated confirmations.

use std::time::Duration;

use tracing::debug;

use crate::config::SimulationConfig;
use crate::phase::Phase;
use crate::pulse::{PulseKind, Trigger};

use super::{ConfirmationScheduler, Host, Session, TriggerTap};

/// Drives a [`Session`] along a clock.
///
/// The clock is an offset from the start of the session and only moves
/// forward. Callers move it: a replay jumps it by `wait` steps, the live
/// `run` loop sets it from the wall clock. Moving it delivers every
/// simulated confirmation that falls due on the way, in deadline order.
#[derive(Debug)]
pub struct Driver<H: Host> {
    session: Session<TriggerTap<H>>,
    scheduler: ConfirmationScheduler,
    auto_confirm: bool,
    now: Duration,
    triggers: Vec<Trigger>,
    pulses: usize,
    dropped: usize,
}

impl<H: Host> Driver<H> {
    /// Creates a driver around `host` at time zero.
    pub fn new(host: H, simulation: &SimulationConfig, auto_confirm: bool) -> Self {
        Self {
            session: Session::new(TriggerTap::new(host)),
            scheduler: ConfirmationScheduler::from_config(simulation),
            auto_confirm,
            now: Duration::ZERO,
            triggers: Vec::new(),
            pulses: 0,
            dropped: 0,
        }
    }

    /// Delivers one pulse at the current time.
    pub fn deliver(&mut self, kind: PulseKind) {
        self.pulses += 1;
        if !self.session.fire(kind) {
            self.dropped += 1;
        }
        for trigger in self.session.host_mut().take_fresh() {
            self.triggers.push(trigger);
            if self.auto_confirm {
                self.scheduler.schedule(trigger, self.now);
            }
        }
    }

    /// Moves the clock to `until`, delivering confirmations due by then.
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(due) = self.scheduler.next_due() {
            if due > until {
                break;
            }
            self.now = self.now.max(due);
            while let Some(kind) = self.scheduler.pop_due(self.now) {
                debug!(pulse = %kind, at_ms = self.now.as_millis(), "simulated confirmation");
                self.deliver(kind);
            }
        }
        self.now = self.now.max(until);
    }

    /// Moves the clock forward by `duration`.
    pub fn advance_by(&mut self, duration: Duration) {
        self.advance_to(self.now.saturating_add(duration));
    }

    /// Delivers every pending confirmation, moving the clock as needed.
    pub fn settle(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            self.advance_to(due);
        }
    }

    /// Due time of the next simulated confirmation.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Current clock value.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Every trigger emitted so far.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Pulses delivered so far, confirmations included.
    #[must_use]
    pub const fn pulses(&self) -> usize {
        self.pulses
    }

    /// Pulses that reached a phase with no handler for them.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// The driven host.
    #[must_use]
    pub const fn host(&self) -> &H {
        self.session.host().inner()
    }

    /// Ends the drive and hands the host back.
    pub fn into_host(self) -> H {
        self.session.into_host().into_inner()
    }
}
