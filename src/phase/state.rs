//! Phase and progress state.
//!
//! The whole choreography state is one owned value: the current [`Phase`]
//! plus one progress record per phase. Records for every phase exist from the
//! start, so a later phase's flags can be written before it becomes current.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of the choreography.
///
/// Variants are declared in choreography order; the derived `Ord` is the
/// forward direction of travel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Phase {
    /// Waiting for both hands to go up and down.
    #[default]
    Start,
    /// Watermelon is in the scene, waiting for the cut gesture.
    CutWatermelon,
    /// Watermelon is cut, waiting for both halves to be pushed out.
    PushOutHalves,
    /// Halves are gone, waiting for the closing gesture.
    ShowTaijitu,
}

impl Phase {
    /// Every phase, in choreography order.
    pub const ALL: [Self; 4] = [
        Self::Start,
        Self::CutWatermelon,
        Self::PushOutHalves,
        Self::ShowTaijitu,
    ];

    /// Name used in log lines and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::CutWatermelon => "CutWatermelon",
            Self::PushOutHalves => "PushOutHalves",
            Self::ShowTaijitu => "ShowTaijitu",
        }
    }

    /// Zero-based position in the choreography.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the phase has no outgoing transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ShowTaijitu)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "Raise both hands, then lower them" progress, used by `Start` and
/// `ShowTaijitu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaiseLowerProgress {
    /// Both hands were seen up.
    pub saw_both_hands_up: bool,
    /// Both hands were seen down after being up.
    pub saw_both_hands_down: bool,
}

impl RaiseLowerProgress {
    /// Both halves of the gesture have been seen.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.saw_both_hands_up && self.saw_both_hands_down
    }
}

/// Cut gesture progress: one hand up, then both hands down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CutProgress {
    /// One hand was seen up.
    pub saw_one_hand_up: bool,
    /// Both hands were seen down after the single hand went up.
    pub saw_both_hands_down: bool,
}

impl CutProgress {
    /// Both halves of the cut gesture have been seen.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.saw_one_hand_up && self.saw_both_hands_down
    }
}

/// Which halves have already been animated out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushOutProgress {
    /// `animateOutWatermelonLeft` was emitted.
    pub animated_left: bool,
    /// `animateOutWatermelonRight` was emitted.
    pub animated_right: bool,
}

impl PushOutProgress {
    /// Both halves are out.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.animated_left && self.animated_right
    }
}

/// Progress records for all four phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// `Start` flags.
    pub start: RaiseLowerProgress,
    /// `CutWatermelon` flags; may be written early while still in `Start`.
    pub cut: CutProgress,
    /// `PushOutHalves` flags.
    pub push_out: PushOutProgress,
    /// `ShowTaijitu` flags.
    pub taijitu: RaiseLowerProgress,
}

/// Record of a phase transition, handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    /// Phase we left.
    pub from: Phase,
    /// Phase we entered.
    pub to: Phase,
}
