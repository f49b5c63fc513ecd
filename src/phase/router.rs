//! Event router.
//!
//! Binds each pulse source once to a fixed dispatch function. A dispatch
//! function looks up the handler table of the *current* phase and invokes the
//! slot for its pulse kind when one is registered. Empty slots drop the pulse.

use tracing::trace;

use crate::host::{Dispatch, Host, PulseSource};
use crate::pulse::PulseKind;

use super::machine::PhaseMachine;
use super::state::Phase;

/// A phase-specific pulse handler.
pub type Handler = fn(&mut PhaseMachine, &mut dyn Host);

/// One optional handler slot per pulse kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerSet {
    /// `bothHandsUp`
    pub both_hands_up: Option<Handler>,
    /// `bothHandsDown`
    pub both_hands_down: Option<Handler>,
    /// `oneHandUp`
    pub one_hand_up: Option<Handler>,
    /// `bothHandsLeft`
    pub both_hands_left: Option<Handler>,
    /// `bothHandsRight`
    pub both_hands_right: Option<Handler>,
    /// `watermelonAnimatedIn`
    pub watermelon_animated_in: Option<Handler>,
    /// `watermelonCut`
    pub watermelon_cut: Option<Handler>,
}

impl HandlerSet {
    const EMPTY: Self = Self {
        both_hands_up: None,
        both_hands_down: None,
        one_hand_up: None,
        both_hands_left: None,
        both_hands_right: None,
        watermelon_animated_in: None,
        watermelon_cut: None,
    };

    /// Returns the handler registered for `kind`, if any.
    #[must_use]
    pub const fn slot(&self, kind: PulseKind) -> Option<Handler> {
        match kind {
            PulseKind::BothHandsUp => self.both_hands_up,
            PulseKind::BothHandsDown => self.both_hands_down,
            PulseKind::OneHandUp => self.one_hand_up,
            PulseKind::BothHandsLeft => self.both_hands_left,
            PulseKind::BothHandsRight => self.both_hands_right,
            PulseKind::WatermelonAnimatedIn => self.watermelon_animated_in,
            PulseKind::WatermelonCut => self.watermelon_cut,
        }
    }
}

static START: HandlerSet = HandlerSet {
    one_hand_up: Some(PhaseMachine::start_one_hand_up),
    both_hands_up: Some(PhaseMachine::start_both_hands_up),
    both_hands_down: Some(PhaseMachine::start_both_hands_down),
    watermelon_animated_in: Some(PhaseMachine::start_watermelon_animated_in),
    ..HandlerSet::EMPTY
};

static CUT_WATERMELON: HandlerSet = HandlerSet {
    one_hand_up: Some(PhaseMachine::cut_one_hand_up),
    both_hands_down: Some(PhaseMachine::cut_both_hands_down),
    watermelon_cut: Some(PhaseMachine::cut_watermelon_cut),
    ..HandlerSet::EMPTY
};

static PUSH_OUT_HALVES: HandlerSet = HandlerSet {
    both_hands_left: Some(PhaseMachine::push_out_both_hands_left),
    both_hands_right: Some(PhaseMachine::push_out_both_hands_right),
    ..HandlerSet::EMPTY
};

static SHOW_TAIJITU: HandlerSet = HandlerSet {
    both_hands_up: Some(PhaseMachine::taijitu_both_hands_up),
    both_hands_down: Some(PhaseMachine::taijitu_both_hands_down),
    ..HandlerSet::EMPTY
};

/// Returns the handler table for `phase`.
#[must_use]
pub const fn handlers(phase: Phase) -> &'static HandlerSet {
    match phase {
        Phase::Start => &START,
        Phase::CutWatermelon => &CUT_WATERMELON,
        Phase::PushOutHalves => &PUSH_OUT_HALVES,
        Phase::ShowTaijitu => &SHOW_TAIJITU,
    }
}

/// Returns whether `kind` has a handler in `phase`.
#[must_use]
pub const fn is_handled(phase: Phase, kind: PulseKind) -> bool {
    handlers(phase).slot(kind).is_some()
}

/// Subscribes one dispatch function per pulse kind on `source`.
///
/// Call exactly once per source; every call adds another full set of
/// subscriptions.
pub fn bind(source: &mut impl PulseSource) {
    for kind in PulseKind::ALL {
        source.subscribe(kind, dispatcher(kind));
    }
}

/// Returns the fixed dispatch function for `kind`.
#[must_use]
pub const fn dispatcher(kind: PulseKind) -> Dispatch {
    match kind {
        PulseKind::BothHandsUp => on_both_hands_up,
        PulseKind::BothHandsDown => on_both_hands_down,
        PulseKind::OneHandUp => on_one_hand_up,
        PulseKind::BothHandsLeft => on_both_hands_left,
        PulseKind::BothHandsRight => on_both_hands_right,
        PulseKind::WatermelonAnimatedIn => on_watermelon_animated_in,
        PulseKind::WatermelonCut => on_watermelon_cut,
    }
}

/// Routes one pulse to the current phase's handler.
///
/// Returns `true` if a handler ran.
pub fn dispatch(kind: PulseKind, machine: &mut PhaseMachine, host: &mut dyn Host) -> bool {
    host.log(&format!("SIGNAL: {kind}"));

    let phase = machine.phase();
    let Some(handler) = handlers(phase).slot(kind) else {
        trace!(pulse = %kind, %phase, "no handler for pulse in current phase");
        return false;
    };
    handler(machine, host);
    true
}

fn on_both_hands_up(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::BothHandsUp, machine, host);
}

fn on_both_hands_down(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::BothHandsDown, machine, host);
}

fn on_one_hand_up(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::OneHandUp, machine, host);
}

fn on_both_hands_left(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::BothHandsLeft, machine, host);
}

fn on_both_hands_right(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::BothHandsRight, machine, host);
}

fn on_watermelon_animated_in(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::WatermelonAnimatedIn, machine, host);
}

fn on_watermelon_cut(machine: &mut PhaseMachine, host: &mut dyn Host) {
    dispatch(PulseKind::WatermelonCut, machine, host);
}
