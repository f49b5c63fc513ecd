//! Pulse and trigger vocabulary.
//!
//! A [`PulseKind`] is one of the seven payload-less signals the host delivers
//! (five gestures plus two animation-complete confirmations). A [`Trigger`] is
//! one of the five animation-start signals sent back to the host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

/// A named pulse source at the host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PulseKind {
    /// Both hands raised.
    BothHandsUp,
    /// Both hands lowered.
    BothHandsDown,
    /// Exactly one hand raised.
    OneHandUp,
    /// Both hands swiped to the left.
    BothHandsLeft,
    /// Both hands swiped to the right.
    BothHandsRight,
    /// The host finished playing `animateInWatermelon`.
    WatermelonAnimatedIn,
    /// The host finished playing `cutWatermelon`.
    WatermelonCut,
}

impl PulseKind {
    /// Every pulse kind, in subscription order.
    pub const ALL: [Self; 7] = [
        Self::BothHandsUp,
        Self::BothHandsDown,
        Self::OneHandUp,
        Self::BothHandsLeft,
        Self::BothHandsRight,
        Self::WatermelonAnimatedIn,
        Self::WatermelonCut,
    ];

    /// Wire name of the pulse as the host knows it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BothHandsUp => "bothHandsUp",
            Self::BothHandsDown => "bothHandsDown",
            Self::OneHandUp => "oneHandUp",
            Self::BothHandsLeft => "bothHandsLeft",
            Self::BothHandsRight => "bothHandsRight",
            Self::WatermelonAnimatedIn => "watermelonAnimatedIn",
            Self::WatermelonCut => "watermelonCut",
        }
    }

    /// Dense index into per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the pulse reports completion of a host animation rather than
    /// a user gesture.
    #[must_use]
    pub const fn is_confirmation(self) -> bool {
        matches!(self, Self::WatermelonAnimatedIn | Self::WatermelonCut)
    }
}

impl fmt::Display for PulseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PulseKind {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ScriptError::UnknownPulse {
                name: name.to_string(),
                suggestion: suggest(name),
            })
    }
}

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Returns the closest known pulse name, if any is reasonably close.
fn suggest(name: &str) -> Option<String> {
    PulseKind::ALL
        .into_iter()
        .map(|kind| (kind, strsim::jaro_winkler(name, kind.as_str())))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(kind, _)| kind.as_str().to_string())
}

/// A named animation-start signal sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// Play the watermelon entry animation.
    AnimateInWatermelon,
    /// Play the cut animation.
    CutWatermelon,
    /// Push the left half out.
    AnimateOutWatermelonLeft,
    /// Push the right half out.
    AnimateOutWatermelonRight,
    /// Play the closing taijitu animation.
    AnimateInTaijitu,
}

impl Trigger {
    /// Every trigger, in choreography order.
    pub const ALL: [Self; 5] = [
        Self::AnimateInWatermelon,
        Self::CutWatermelon,
        Self::AnimateOutWatermelonLeft,
        Self::AnimateOutWatermelonRight,
        Self::AnimateInTaijitu,
    ];

    /// Wire name of the trigger as the host knows it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnimateInWatermelon => "animateInWatermelon",
            Self::CutWatermelon => "cutWatermelon",
            Self::AnimateOutWatermelonLeft => "animateOutWatermelonLeft",
            Self::AnimateOutWatermelonRight => "animateOutWatermelonRight",
            Self::AnimateInTaijitu => "animateInTaijitu",
        }
    }

    /// The pulse the host fires once this trigger's animation has finished,
    /// for the triggers the choreography waits on.
    #[must_use]
    pub const fn confirmation(self) -> Option<PulseKind> {
        match self {
            Self::AnimateInWatermelon => Some(PulseKind::WatermelonAnimatedIn),
            Self::CutWatermelon => Some(PulseKind::WatermelonCut),
            Self::AnimateOutWatermelonLeft
            | Self::AnimateOutWatermelonRight
            | Self::AnimateInTaijitu => None,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
