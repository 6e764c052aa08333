//! Continuous polling mode: fixed-delay capture cycles until cancelled.

use std::time::Duration;

use namespot_types::{DetectError, DetectResult, MonitoringSession};
use tokio_util::sync::CancellationToken;

use crate::pipeline::DetectionPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoringSummary {
    pub captures: u64,
    pub detections: u64,
}

/// Runs reduced capture cycles until the token is cancelled or an optional
/// capture limit is reached.
///
/// The interval is a fixed delay after each iteration's work, not a fixed
/// rate, and the wait is interruptible: cancellation during the delay exits
/// promptly rather than at the next cycle boundary. Iteration failures are
/// logged and tolerated; only an unavailable capability ends the loop with
/// an error.
pub async fn run(
    pipeline: &mut DetectionPipeline,
    interval: Duration,
    max_captures: Option<u64>,
    cancel: CancellationToken,
) -> DetectResult<MonitoringSummary> {
    if interval.is_zero() {
        return Err(DetectError::configuration(
            "monitoring interval must be positive",
        ));
    }

    let mut session = MonitoringSession::new(interval);
    let mut detections = 0u64;
    log::info!("monitoring every {:?} (ctrl-c to stop)", session.interval);

    while session.running {
        if cancel.is_cancelled() {
            break;
        }

        match pipeline.monitor_cycle() {
            Ok(Some(result)) => {
                detections += 1;
                log::info!(
                    "capture {} found {} name(s): {}",
                    result.timestamp_id,
                    result.names.len(),
                    result.names.join(", ")
                );
            }
            Ok(None) => log::debug!("capture yielded no names"),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => log::warn!("capture failed, continuing: {err}"),
        }
        session.capture_count += 1;

        if let Some(limit) = max_captures {
            if session.capture_count >= limit {
                break;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(session.interval) => {}
            _ = cancel.cancelled() => break,
        }
    }

    session.running = false;
    log::info!(
        "monitoring stopped after {} capture(s), {} with names",
        session.capture_count,
        detections
    );
    Ok(MonitoringSummary {
        captures: session.capture_count,
        detections,
    })
}
