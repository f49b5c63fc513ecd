//! `run`: live pulse loop.
//!
//! Pulse names arrive one per line on stdin (or `--input`). Each line is
//! routed as soon as it is read and every emitted trigger goes straight to
//! stdout. Simulated confirmations share the same task, so pulse handling
//! never overlaps.

use std::future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::args::RunArgs;
use crate::error::MelonError;
use crate::host::{ConsoleHost, Driver, Host};
use crate::observability::{EventEmitter, init_metrics};
use crate::script::parse_pulse_line;

/// Why the pulse loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Input closed and nothing was pending.
    EndOfInput,
    /// Shutdown was requested.
    Cancelled,
}

impl StopReason {
    /// Name used in the `SessionStopped` event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndOfInput => "end_of_input",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Runs the live pulse loop.
///
/// # Errors
///
/// Returns an error if the configuration, input, or events file cannot be
/// opened, if the metrics endpoint cannot start, or if reading input fails.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), MelonError> {
    let config = super::load_config(args.config.as_deref())?;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let auto_confirm = args.auto_confirm || config.simulation.auto_confirm;
    let format = args.format.unwrap_or(config.output.format);
    let events = match args
        .events_file
        .as_deref()
        .or(config.output.events_file.as_deref())
    {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let (reader, source): (Box<dyn AsyncBufRead + Unpin + Send>, String) = match &args.input {
        Some(path) => (
            Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
            path.display().to_string(),
        ),
        None => (Box::new(BufReader::new(tokio::io::stdin())), "stdin".into()),
    };

    let host = ConsoleHost::stdout(format, events);
    let mut driver = Driver::new(host, &config.simulation, auto_confirm);
    driver.host().started(&source, auto_confirm);

    let reason = drive(&mut driver, reader, &cancel).await?;

    driver.host().stopped(reason.as_str());
    info!(
        phase = %driver.phase(),
        pulses = driver.pulses(),
        dropped = driver.dropped(),
        "pulse loop finished"
    );
    Ok(())
}

/// Feeds `reader` into `driver` until input ends and no simulated
/// confirmation is pending, or until `cancel` fires.
///
/// # Errors
///
/// Returns an I/O error if reading fails.
pub async fn drive<H, R>(
    driver: &mut Driver<H>,
    reader: R,
    cancel: &CancellationToken,
) -> Result<StopReason, MelonError>
where
    H: Host,
    R: AsyncBufRead + Unpin,
{
    let started = Instant::now();
    let mut lines = reader.lines();
    let mut input_open = true;
    let mut line_no = 0_usize;

    loop {
        if !input_open && driver.next_due().is_none() {
            return Ok(StopReason::EndOfInput);
        }
        let deadline = driver.next_due().map(|due| started + due);

        tokio::select! {
            () = cancel.cancelled() => return Ok(StopReason::Cancelled),
            () = sleep_until(deadline) => driver.advance_to(started.elapsed()),
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    line_no += 1;
                    driver.advance_to(started.elapsed());
                    match parse_pulse_line(&line) {
                        Ok(Some(kind)) => driver.deliver(kind),
                        Ok(None) => {}
                        Err(e) => warn!(line = line_no, "{e}, skipped"),
                    }
                }
                None => {
                    debug!(lines = line_no, "input closed");
                    input_open = false;
                }
            },
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::host::RecordingHost;
    use crate::phase::Phase;
    use crate::pulse::Trigger;

    fn instant_animations() -> SimulationConfig {
        SimulationConfig {
            auto_confirm: true,
            entry_animation: Duration::ZERO,
            cut_animation: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_drive_skips_comments_and_unknown_names() {
        let input: &[u8] = b"# warm up\nbothHandsUp\n\nwave\nbothHandsDown\n";
        let mut driver = Driver::new(RecordingHost::new(), &instant_animations(), false);

        let reason = drive(&mut driver, input, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reason, StopReason::EndOfInput);
        assert_eq!(driver.pulses(), 2);
        assert_eq!(driver.triggers(), [Trigger::AnimateInWatermelon]);
        assert_eq!(driver.phase(), Phase::Start);
    }

    #[tokio::test]
    async fn test_drive_waits_for_pending_confirmations() {
        let input: &[u8] = b"bothHandsUp\nbothHandsDown\noneHandUp\nbothHandsDown\n";
        let mut driver = Driver::new(RecordingHost::new(), &instant_animations(), true);

        let reason = drive(&mut driver, input, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reason, StopReason::EndOfInput);
        assert_eq!(driver.phase(), Phase::PushOutHalves);
        assert_eq!(
            driver.triggers(),
            [Trigger::AnimateInWatermelon, Trigger::CutWatermelon]
        );
    }

    #[tokio::test]
    async fn test_drive_stops_on_cancel() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut driver = Driver::new(RecordingHost::new(), &instant_animations(), true);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reason = drive(&mut driver, BufReader::new(reader), &cancel)
            .await
            .unwrap();

        assert_eq!(reason, StopReason::Cancelled);
        assert_eq!(driver.pulses(), 0);
    }
}
