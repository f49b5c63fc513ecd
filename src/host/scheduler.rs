//! Simulated host confirmations.
//!
//! A real host reports the end of `animateInWatermelon` and `cutWatermelon`
//! with a pulse of its own. Without one, this scheduler stands in: each
//! confirmable trigger schedules its confirmation pulse a fixed delay later.
//!
//! Time is an offset from the start of the session, so the same scheduler
//! drives both the wall-clock `run` loop and the virtual clock of a replay.

use std::time::Duration;

use tracing::debug;

use crate::config::SimulationConfig;
use crate::pulse::{PulseKind, Trigger};

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Duration,
    seq: u64,
    pulse: PulseKind,
}

/// Pending confirmation pulses, ordered by due time then scheduling order.
#[derive(Debug, Clone)]
pub struct ConfirmationScheduler {
    entry_animation: Duration,
    cut_animation: Duration,
    pending: Vec<Pending>,
    next_seq: u64,
}

impl ConfirmationScheduler {
    /// Creates a scheduler with the given animation lengths.
    #[must_use]
    pub const fn new(entry_animation: Duration, cut_animation: Duration) -> Self {
        Self {
            entry_animation,
            cut_animation,
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Creates a scheduler from the simulation settings.
    #[must_use]
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.entry_animation, config.cut_animation)
    }

    /// Animation length for a confirmable trigger.
    #[must_use]
    pub const fn delay_for(&self, trigger: Trigger) -> Option<Duration> {
        match trigger {
            Trigger::AnimateInWatermelon => Some(self.entry_animation),
            Trigger::CutWatermelon => Some(self.cut_animation),
            _ => None,
        }
    }

    /// Schedules the confirmation of `trigger`, emitted at `now`.
    ///
    /// Returns the scheduled pulse, or `None` for triggers nobody waits on.
    pub fn schedule(&mut self, trigger: Trigger, now: Duration) -> Option<PulseKind> {
        let pulse = trigger.confirmation()?;
        let delay = self.delay_for(trigger)?;
        let due = now.saturating_add(delay);
        let entry = Pending {
            due,
            seq: self.next_seq,
            pulse,
        };
        self.next_seq += 1;

        let at = self
            .pending
            .partition_point(|p| (p.due, p.seq) <= (entry.due, entry.seq));
        self.pending.insert(at, entry);

        debug!(%trigger, %pulse, due_ms = due.as_millis(), "confirmation scheduled");
        Some(pulse)
    }

    /// Due time of the earliest pending confirmation.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|p| p.due)
    }

    /// Removes and returns the earliest confirmation if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<PulseKind> {
        if self.pending.first()?.due <= now {
            Some(self.pending.remove(0).pulse)
        } else {
            None
        }
    }

    /// Number of pending confirmations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_only_confirmable_triggers_are_scheduled() {
        let mut scheduler = ConfirmationScheduler::new(ms(100), ms(50));
        assert_eq!(
            scheduler.schedule(Trigger::AnimateInWatermelon, ms(0)),
            Some(PulseKind::WatermelonAnimatedIn)
        );
        assert_eq!(scheduler.schedule(Trigger::AnimateOutWatermelonLeft, ms(0)), None);
        assert_eq!(scheduler.schedule(Trigger::AnimateInTaijitu, ms(0)), None);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_pop_due_respects_deadline() {
        let mut scheduler = ConfirmationScheduler::new(ms(100), ms(50));
        scheduler.schedule(Trigger::AnimateInWatermelon, ms(10));

        assert_eq!(scheduler.next_due(), Some(ms(110)));
        assert_eq!(scheduler.pop_due(ms(109)), None);
        assert_eq!(
            scheduler.pop_due(ms(110)),
            Some(PulseKind::WatermelonAnimatedIn)
        );
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pop_due(ms(1000)), None);
    }

    #[test]
    fn test_earlier_deadline_pops_first() {
        let mut scheduler = ConfirmationScheduler::new(ms(100), ms(50));
        scheduler.schedule(Trigger::AnimateInWatermelon, ms(0));
        scheduler.schedule(Trigger::CutWatermelon, ms(10));

        assert_eq!(scheduler.pop_due(ms(200)), Some(PulseKind::WatermelonCut));
        assert_eq!(
            scheduler.pop_due(ms(200)),
            Some(PulseKind::WatermelonAnimatedIn)
        );
    }

    #[test]
    fn test_ties_keep_scheduling_order() {
        let mut scheduler = ConfirmationScheduler::new(ms(50), ms(50));
        scheduler.schedule(Trigger::CutWatermelon, ms(0));
        scheduler.schedule(Trigger::AnimateInWatermelon, ms(0));

        assert_eq!(scheduler.pop_due(ms(50)), Some(PulseKind::WatermelonCut));
        assert_eq!(
            scheduler.pop_due(ms(50)),
            Some(PulseKind::WatermelonAnimatedIn)
        );
    }

    #[test]
    fn test_from_config() {
        let scheduler = ConfirmationScheduler::from_config(&SimulationConfig::default());
        assert_eq!(
            scheduler.delay_for(Trigger::AnimateInWatermelon),
            Some(crate::config::DEFAULT_ENTRY_ANIMATION)
        );
        assert_eq!(
            scheduler.delay_for(Trigger::CutWatermelon),
            Some(crate::config::DEFAULT_CUT_ANIMATION)
        );
    }
}
