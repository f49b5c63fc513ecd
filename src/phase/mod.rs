//! Gesture choreography core.
//!
//! Sequences pulses into animation triggers across four linear phases:
//! `Start` → `CutWatermelon` → `PushOutHalves` → `ShowTaijitu`.
//!
//! # Architecture
//!
//! - [`PhaseMachine`]: owned state (current phase plus every phase's
//!   progress flags) and one handler per meaningful (phase, pulse) pair
//! - [`router`]: phase-keyed handler table and the fixed dispatch functions
//!   bound to each pulse source
//! - [`state`]: phase enum, progress records, transition records
//!
//! Everything runs synchronously on the caller's thread. A pulse is handled
//! to completion before the next one is looked at, so the state needs no
//! synchronization.

pub mod machine;
pub mod router;
pub mod state;

pub use machine::PhaseMachine;
pub use router::{HandlerSet, bind, dispatch};
pub use state::{Phase, PhaseTransition, Progress};
