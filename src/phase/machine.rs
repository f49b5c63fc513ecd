//! Phase machine (gesture-to-animation sequencer).
//!
//! Every handler runs to completion on an exclusive borrow of the machine:
//! it updates progress flags, emits at most one trigger and performs at most
//! one transition before returning. The router decides which handler, if any,
//! a pulse reaches; see [`super::router`].

use tracing::{debug, warn};

use crate::host::Host;
use crate::pulse::Trigger;

use super::state::{Phase, PhaseTransition, Progress};

/// Current phase plus the progress flags of every phase.
///
/// Created once in [`Phase::Start`] with all flags cleared. Flags only ever
/// go from `false` to `true`, and the phase only ever moves forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseMachine {
    phase: Phase,
    progress: Progress,
}

impl PhaseMachine {
    /// Creates a machine in `Start` with every flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the progress records of all phases.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Returns whether the terminal phase has been reached.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    // ------------------------------------------------------------------------
    // Start
    // ------------------------------------------------------------------------

    /// `Start` / `oneHandUp`.
    ///
    /// Once the raise-lower gesture is done we are only waiting for the
    /// entry animation to finish; a hand raised now already counts toward
    /// the cut gesture.
    pub fn start_one_hand_up(&mut self, _host: &mut dyn Host) {
        if self.progress.start.is_complete() {
            debug!("early capture: one hand up while watermelon animates in");
            self.progress.cut.saw_one_hand_up = true;
        }
    }

    /// `Start` / `bothHandsUp`.
    pub fn start_both_hands_up(&mut self, _host: &mut dyn Host) {
        self.progress.start.saw_both_hands_up = true;
    }

    /// `Start` / `bothHandsDown`.
    ///
    /// Either completes the raise-lower gesture and starts the entry
    /// animation, or, while that animation is still playing, records the
    /// second half of an early cut gesture. Never both.
    pub fn start_both_hands_down(&mut self, host: &mut dyn Host) {
        let start = self.progress.start;
        let cut = self.progress.cut;

        if start.saw_both_hands_up && !start.saw_both_hands_down {
            self.progress.start.saw_both_hands_down = true;
            emit(host, Trigger::AnimateInWatermelon);
        } else if start.is_complete() && cut.saw_one_hand_up && !cut.saw_both_hands_down {
            debug!("early capture: cut gesture finished while watermelon animates in");
            self.progress.cut.saw_both_hands_down = true;
        }
    }

    /// `Start` / `watermelonAnimatedIn`.
    ///
    /// Enters `CutWatermelon` and replays a cut gesture that was completed
    /// while the entry animation was still playing.
    pub fn start_watermelon_animated_in(&mut self, host: &mut dyn Host) {
        self.enter(Phase::CutWatermelon, host);

        if self.progress.cut.is_complete() {
            emit(host, Trigger::CutWatermelon);
        }
    }

    // ------------------------------------------------------------------------
    // CutWatermelon
    // ------------------------------------------------------------------------

    /// `CutWatermelon` / `oneHandUp`.
    pub fn cut_one_hand_up(&mut self, _host: &mut dyn Host) {
        self.progress.cut.saw_one_hand_up = true;
    }

    /// `CutWatermelon` / `bothHandsDown`.
    pub fn cut_both_hands_down(&mut self, host: &mut dyn Host) {
        let cut = self.progress.cut;
        if cut.saw_one_hand_up && !cut.saw_both_hands_down {
            self.progress.cut.saw_both_hands_down = true;
            emit(host, Trigger::CutWatermelon);
        }
    }

    /// `CutWatermelon` / `watermelonCut`.
    pub fn cut_watermelon_cut(&mut self, host: &mut dyn Host) {
        self.enter(Phase::PushOutHalves, host);
    }

    // ------------------------------------------------------------------------
    // PushOutHalves
    // ------------------------------------------------------------------------

    /// `PushOutHalves` / `bothHandsLeft`.
    pub fn push_out_both_hands_left(&mut self, host: &mut dyn Host) {
        if self.progress.push_out.animated_left {
            return;
        }
        self.progress.push_out.animated_left = true;
        emit(host, Trigger::AnimateOutWatermelonLeft);

        if self.progress.push_out.animated_right {
            self.enter(Phase::ShowTaijitu, host);
        }
    }

    /// `PushOutHalves` / `bothHandsRight`.
    pub fn push_out_both_hands_right(&mut self, host: &mut dyn Host) {
        if self.progress.push_out.animated_right {
            return;
        }
        self.progress.push_out.animated_right = true;
        emit(host, Trigger::AnimateOutWatermelonRight);

        if self.progress.push_out.animated_left {
            self.enter(Phase::ShowTaijitu, host);
        }
    }

    // ------------------------------------------------------------------------
    // ShowTaijitu
    // ------------------------------------------------------------------------

    /// `ShowTaijitu` / `bothHandsUp`.
    pub fn taijitu_both_hands_up(&mut self, _host: &mut dyn Host) {
        self.progress.taijitu.saw_both_hands_up = true;
    }

    /// `ShowTaijitu` / `bothHandsDown`. Terminal; no transition follows.
    pub fn taijitu_both_hands_down(&mut self, host: &mut dyn Host) {
        let taijitu = self.progress.taijitu;
        if taijitu.saw_both_hands_up && !taijitu.saw_both_hands_down {
            self.progress.taijitu.saw_both_hands_down = true;
            emit(host, Trigger::AnimateInTaijitu);
        }
    }

    /// Moves to `to` and tells the host. Backward moves are refused.
    fn enter(&mut self, to: Phase, host: &mut dyn Host) {
        let from = self.phase;
        if to < from {
            warn!(%from, %to, "refusing backward phase transition");
            return;
        }
        self.phase = to;
        debug!(%from, %to, "phase transition");
        host.phase_entered(PhaseTransition { from, to });
    }
}

/// Logs and fires a trigger.
fn emit(host: &mut dyn Host, trigger: Trigger) {
    host.log(&format!("ANIMATION: {trigger}"));
    host.emit_trigger(trigger);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    fn machine_in(phase: Phase) -> PhaseMachine {
        PhaseMachine {
            phase,
            progress: Progress::default(),
        }
    }

    #[test]
    fn test_new_machine() {
        let machine = PhaseMachine::new();
        assert_eq!(machine.phase(), Phase::Start);
        assert_eq!(*machine.progress(), Progress::default());
        assert!(!machine.is_terminal());
    }

    #[test]
    fn test_start_both_hands_down_requires_up_first() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_down(&mut host);

        assert!(host.triggers().is_empty());
        assert!(!machine.progress().start.saw_both_hands_down);
    }

    #[test]
    fn test_start_raise_lower_emits_animate_in_once() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_both_hands_down(&mut host);

        assert_eq!(host.triggers(), [Trigger::AnimateInWatermelon]);
        assert_eq!(machine.phase(), Phase::Start);
        assert!(host.logs().contains(&"ANIMATION: animateInWatermelon".to_string()));
    }

    #[test]
    fn test_start_one_hand_up_ignored_before_raise_lower() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_one_hand_up(&mut host);

        assert!(!machine.progress().cut.saw_one_hand_up);
    }

    #[test]
    fn test_start_early_capture_records_cut_flags() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_one_hand_up(&mut host);
        machine.start_both_hands_down(&mut host);

        assert!(machine.progress().cut.is_complete());
        assert_eq!(machine.phase(), Phase::Start);
        // Cut trigger waits for the entry animation to finish
        assert_eq!(host.triggers(), [Trigger::AnimateInWatermelon]);
    }

    #[test]
    fn test_start_early_down_without_one_hand_is_noop() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_both_hands_down(&mut host);
        let before = machine.clone();
        machine.start_both_hands_down(&mut host);

        assert_eq!(machine, before);
    }

    #[test]
    fn test_animated_in_without_early_cut() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_watermelon_animated_in(&mut host);

        assert_eq!(machine.phase(), Phase::CutWatermelon);
        assert_eq!(host.triggers(), [Trigger::AnimateInWatermelon]);
        assert_eq!(
            host.transitions(),
            [PhaseTransition {
                from: Phase::Start,
                to: Phase::CutWatermelon,
            }]
        );
    }

    #[test]
    fn test_animated_in_replays_early_cut() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_one_hand_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_watermelon_animated_in(&mut host);

        assert_eq!(machine.phase(), Phase::CutWatermelon);
        assert_eq!(
            host.triggers(),
            [Trigger::AnimateInWatermelon, Trigger::CutWatermelon]
        );
    }

    #[test]
    fn test_cut_gesture() {
        let mut machine = machine_in(Phase::CutWatermelon);
        let mut host = RecordingHost::new();

        machine.cut_both_hands_down(&mut host);
        assert!(host.triggers().is_empty());

        machine.cut_one_hand_up(&mut host);
        machine.cut_both_hands_down(&mut host);
        machine.cut_both_hands_down(&mut host);

        assert_eq!(host.triggers(), [Trigger::CutWatermelon]);
        assert_eq!(machine.phase(), Phase::CutWatermelon);
    }

    #[test]
    fn test_cut_does_not_reemit_after_early_capture() {
        let mut machine = PhaseMachine::new();
        let mut host = RecordingHost::new();

        machine.start_both_hands_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_one_hand_up(&mut host);
        machine.start_both_hands_down(&mut host);
        machine.start_watermelon_animated_in(&mut host);
        machine.cut_one_hand_up(&mut host);
        machine.cut_both_hands_down(&mut host);

        let cuts = host
            .triggers()
            .iter()
            .filter(|t| **t == Trigger::CutWatermelon)
            .count();
        assert_eq!(cuts, 1);
    }

    #[test]
    fn test_watermelon_cut_enters_push_out() {
        let mut machine = machine_in(Phase::CutWatermelon);
        let mut host = RecordingHost::new();

        machine.cut_watermelon_cut(&mut host);

        assert_eq!(machine.phase(), Phase::PushOutHalves);
        assert!(host.logs().contains(&"STATE: PushOutHalves".to_string()));
    }

    #[test]
    fn test_push_out_left_then_right() {
        let mut machine = machine_in(Phase::PushOutHalves);
        let mut host = RecordingHost::new();

        machine.push_out_both_hands_left(&mut host);
        assert_eq!(machine.phase(), Phase::PushOutHalves);
        machine.push_out_both_hands_left(&mut host);
        machine.push_out_both_hands_right(&mut host);

        assert_eq!(
            host.triggers(),
            [
                Trigger::AnimateOutWatermelonLeft,
                Trigger::AnimateOutWatermelonRight
            ]
        );
        assert_eq!(machine.phase(), Phase::ShowTaijitu);
        assert_eq!(host.transitions().len(), 1);
    }

    #[test]
    fn test_push_out_right_then_left() {
        let mut machine = machine_in(Phase::PushOutHalves);
        let mut host = RecordingHost::new();

        machine.push_out_both_hands_right(&mut host);
        machine.push_out_both_hands_right(&mut host);
        machine.push_out_both_hands_left(&mut host);

        assert_eq!(
            host.triggers(),
            [
                Trigger::AnimateOutWatermelonRight,
                Trigger::AnimateOutWatermelonLeft
            ]
        );
        assert_eq!(machine.phase(), Phase::ShowTaijitu);
    }

    #[test]
    fn test_taijitu_gesture_is_terminal() {
        let mut machine = machine_in(Phase::ShowTaijitu);
        let mut host = RecordingHost::new();

        machine.taijitu_both_hands_down(&mut host);
        assert!(host.triggers().is_empty());

        machine.taijitu_both_hands_up(&mut host);
        machine.taijitu_both_hands_down(&mut host);
        machine.taijitu_both_hands_up(&mut host);
        machine.taijitu_both_hands_down(&mut host);

        assert_eq!(host.triggers(), [Trigger::AnimateInTaijitu]);
        assert_eq!(machine.phase(), Phase::ShowTaijitu);
        assert!(machine.is_terminal());
    }

    #[test]
    fn test_backward_transition_refused() {
        let mut machine = machine_in(Phase::PushOutHalves);
        let mut host = RecordingHost::new();

        machine.enter(Phase::CutWatermelon, &mut host);

        assert_eq!(machine.phase(), Phase::PushOutHalves);
        assert!(host.transitions().is_empty());
    }
}
