use serde_json::json;
use tracing::{debug, info};
use vigil_core::{Locator, PageDriver, PollOptions, ProbeError, UpdateProbeResult};

use crate::ReadinessProbe;
use crate::poll::poll_until;

impl ReadinessProbe {
    /// Watch the first element matched by `locator` for a text change.
    ///
    /// A live feed may simply not emit inside the window. With
    /// `allow_no_update` that is reported as an unchanged result; otherwise it
    /// is a timeout error.
    pub async fn probe_update<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        locator: &Locator,
        opts: &PollOptions,
        allow_no_update: bool,
    ) -> Result<UpdateProbeResult, ProbeError> {
        let initial = driver
            .first_text(locator)
            .await?
            .ok_or_else(|| ProbeError::element_not_found(locator))?;
        debug!(locator = %locator, initial = %initial, "watching for live update");

        let timeout = opts.effective_timeout();
        let watched = initial.as_str();
        let changed = poll_until("live update", timeout, self.config.check_interval, move || async move {
            // A briefly missing element is a re-render, not a change.
            let current = driver.first_text(locator).await?;
            Ok(current.filter(|text| text != watched))
        })
        .await;

        match changed {
            Ok(current) => {
                info!(locator = %locator, from = %initial, to = %current, "live value updated");
                Ok(UpdateProbeResult::changed(initial))
            }
            Err(e) if e.is_timeout() && allow_no_update => {
                info!(
                    locator = %locator,
                    value = %initial,
                    timeout_ms = timeout.as_millis() as u64,
                    "no live update inside window"
                );
                Ok(UpdateProbeResult::unchanged(initial))
            }
            Err(e) => {
                let mut context = e.context.clone();
                context["locator"] = json!(locator.to_string());
                context["initial_value"] = json!(initial);
                Err(e.with_context(context))
            }
        }
    }
}
