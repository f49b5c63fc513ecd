//! Host capability interface.
//!
//! The choreography core never talks to a scene graph or an animation system
//! directly. It receives pulses through a [`PulseSource`] and reaches back out
//! through a [`Host`]: emit a trigger, write a log line, report a phase change.
//!
//! # Adapters
//!
//! - [`RecordingHost`]: in-memory capture, for tests and embedding
//! - [`ConsoleHost`]: writes triggers to a stream, logs via `tracing`,
//!   records JSONL events and metrics
//! - [`TriggerTap`]: pass-through wrapper that collects fresh emissions
//! - [`Session`]: owns a machine and a host and acts as the pulse source
//! - [`Driver`]: a session plus simulated confirmations on a clock
//! - [`ConfirmationScheduler`]: simulates the host's animation-complete pulses

pub mod console;
pub mod driver;
pub mod recording;
pub mod scheduler;
pub mod session;
pub mod tap;

pub use console::{ConsoleHost, TriggerFormat};
pub use driver::Driver;
pub use recording::RecordingHost;
pub use scheduler::ConfirmationScheduler;
pub use session::Session;
pub use tap::TriggerTap;

use crate::phase::{Phase, PhaseMachine, PhaseTransition};
use crate::pulse::{PulseKind, Trigger};

/// Effects the core performs on its host.
///
/// All calls are fire-and-forget: nothing is returned and nothing can fail.
pub trait Host {
    /// Fires a one-shot animation trigger.
    fn emit_trigger(&mut self, trigger: Trigger);

    /// Best-effort diagnostic output.
    fn log(&mut self, message: &str);

    /// Called once when a session starts, before any pulse is subscribed.
    ///
    /// The default writes a `STATE: <phase>` log line for the initial phase.
    fn session_started(&mut self, phase: Phase) {
        self.log(&format!("STATE: {phase}"));
    }

    /// Called after the current phase changed.
    ///
    /// The default writes a `STATE: <phase>` log line.
    fn phase_entered(&mut self, transition: PhaseTransition) {
        self.log(&format!("STATE: {}", transition.to));
    }

    /// Called before a pulse is routed. `handled` says whether `phase` has a
    /// handler for it.
    ///
    /// The default does nothing.
    fn pulse_received(&mut self, kind: PulseKind, phase: Phase, handled: bool) {
        let _ = (kind, phase, handled);
    }
}

/// A fixed dispatch function bound to a pulse source.
pub type Dispatch = fn(&mut PhaseMachine, &mut dyn Host);

/// Registry of pulse sources the core can subscribe to.
pub trait PulseSource {
    /// Runs `dispatch` on every future firing of `kind`.
    fn subscribe(&mut self, kind: PulseKind, dispatch: Dispatch);
}
