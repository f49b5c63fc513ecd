//! A running choreography: machine, subscriptions and host in one place.

use tracing::debug;

use crate::phase::{Phase, PhaseMachine, router};
use crate::pulse::PulseKind;

use super::{Dispatch, Host, PulseSource};

/// Owns the machine and the host and acts as the pulse source the router
/// binds to.
///
/// [`Session::new`] binds the router exactly once. Each [`fire`](Self::fire)
/// runs every dispatch function subscribed to that pulse, to completion,
/// before returning.
#[derive(Debug)]
pub struct Session<H: Host> {
    machine: PhaseMachine,
    host: H,
    subscriptions: [Vec<Dispatch>; PulseKind::ALL.len()],
}

impl<H: Host> Session<H> {
    /// Creates a session in `Start`, reports the initial phase to the host
    /// and binds the router.
    pub fn new(host: H) -> Self {
        let mut session = Self {
            machine: PhaseMachine::new(),
            host,
            subscriptions: Default::default(),
        };
        session.host.session_started(session.machine.phase());
        router::bind(&mut session);
        session
    }

    /// Delivers one pulse.
    ///
    /// Returns whether the phase current at delivery had a handler for it.
    pub fn fire(&mut self, kind: PulseKind) -> bool {
        let phase = self.machine.phase();
        let handled = router::is_handled(phase, kind);
        debug!(pulse = %kind, %phase, handled, "pulse");
        self.host.pulse_received(kind, phase, handled);

        for dispatch in &self.subscriptions[kind.index()] {
            dispatch(&mut self.machine, &mut self.host);
        }
        handled
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// The machine.
    #[must_use]
    pub const fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Ends the session and hands the host back.
    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H: Host> PulseSource for Session<H> {
    fn subscribe(&mut self, kind: PulseKind, dispatch: Dispatch) {
        self.subscriptions[kind.index()].push(dispatch);
    }
}
