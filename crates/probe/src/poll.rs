use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;
use vigil_core::{Expectation, ProbeError, WaitOutcome};

/// Run `check` until it yields a value or `timeout` elapses.
///
/// `check` always runs at least once. Transient driver errors (lost execution
/// context while the page navigates) are retried; any other error ends the poll.
pub async fn poll_until<T, F, Fut>(
    label: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<T, ProbeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ProbeError>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => {
                debug!(label, error = %e, "transient driver error, retrying");
            }
            Err(e) => return Err(e),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(ProbeError::timeout_error(format!(
                "Timeout waiting for {} after {}ms",
                label,
                timeout.as_millis()
            ))
            .with_context(json!({
                "label": label,
                "timeout_ms": timeout.as_millis() as u64,
                "attempts": attempts,
            })));
        }

        sleep(interval.min(timeout - elapsed)).await;
    }
}

/// Map a finished wait onto the tri-state outcome.
///
/// Timeouts become `Tolerated` for optional waits and stay errors for required
/// ones. Non-timeout errors always propagate.
pub(crate) fn settle(
    result: Result<(), ProbeError>,
    expectation: Expectation,
    waited: Duration,
) -> Result<WaitOutcome, ProbeError> {
    match result {
        Ok(()) => Ok(WaitOutcome::Satisfied),
        Err(e) if e.is_timeout() && expectation == Expectation::Optional => {
            Ok(WaitOutcome::Tolerated { waited })
        }
        Err(e) => Err(e),
    }
}
