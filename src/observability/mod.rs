//! Observability: logging, metrics, and the structured event stream.
//!
//! Everything here is best-effort. A failed write or an uninstalled metrics
//! recorder never interrupts pulse handling.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{ColorChoice, LogFormat, init_logging};
pub use metrics::init_metrics;
