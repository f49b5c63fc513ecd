//! `melonfx` - gesture-driven watermelon choreography
//!
//! Turns a stream of hand-gesture pulses into a fixed sequence of animation
//! triggers: the watermelon flies in, is cut, its halves are pushed out, and
//! a taijitu closes the show. The core ([`phase`]) is synchronous and
//! host-agnostic; [`host`] provides adapters for consoles, tests and
//! simulated animation confirmations.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod observability;
pub mod phase;
pub mod pulse;
pub mod script;
