//! Prometheus-compatible metrics.
//!
//! Label values come from the fixed pulse, trigger and phase vocabularies,
//! so label cardinality is bounded by construction.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::MelonError;
use crate::phase::Phase;
use crate::pulse::{PulseKind, Trigger};

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>` (this needs a running Tokio runtime). When `None`, the
/// recorder is installed without an HTTP endpoint.
///
/// # Errors
///
/// Returns `MelonError::Io` if the recorder or listener cannot be installed
/// (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), MelonError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| MelonError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!("melonfx_pulses_total", "Pulses delivered to the router");
    describe_counter!("melonfx_triggers_total", "Animation triggers emitted");
    describe_counter!(
        "melonfx_phase_transitions_total",
        "Phase transitions performed"
    );
    describe_gauge!(
        "melonfx_current_phase",
        "Index of the current phase (0 = Start)"
    );
}

/// Records a delivered pulse.
pub fn record_pulse(pulse: PulseKind, handled: bool) {
    counter!(
        "melonfx_pulses_total",
        "pulse" => pulse.as_str(),
        "handled" => if handled { "true" } else { "false" },
    )
    .increment(1);
}

/// Records an emitted trigger.
pub fn record_trigger(trigger: Trigger) {
    counter!("melonfx_triggers_total", "trigger" => trigger.as_str()).increment(1);
}

/// Records a phase transition and updates the current-phase gauge.
#[allow(clippy::cast_precision_loss)]
pub fn record_transition(to: Phase) {
    counter!("melonfx_phase_transitions_total", "to" => to.as_str()).increment(1);
    gauge!("melonfx_current_phase").set(to.index() as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_pulse(PulseKind::BothHandsUp, true);
        record_pulse(PulseKind::WatermelonCut, false);
        record_trigger(Trigger::AnimateInTaijitu);
        record_transition(Phase::ShowTaijitu);
    }
}
