use serde_json::json;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use vigil_core::{Locator, PageDriver, PollOptions, ProbeError};

use crate::ReadinessProbe;
use crate::hooks::LOADING_INDICATORS;
use crate::poll::poll_until;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    /// No indicator showed up during the detection window.
    AlreadyLoaded,
    /// An indicator was shown and went away.
    Cleared { after: Duration },
}

async fn visible_indicator<D: PageDriver + ?Sized>(
    driver: &D,
    indicators: &[Locator],
) -> Result<Option<Locator>, ProbeError> {
    for locator in indicators {
        if driver.is_visible(locator).await? {
            return Ok(Some(locator.clone()));
        }
    }
    Ok(None)
}

impl ReadinessProbe {
    /// Wait for the dashboard's loading indicators to disappear.
    ///
    /// Returns quickly when nothing looks like it is loading. A stuck indicator
    /// is a timeout error; callers that don't care can drop it.
    pub async fn wait_for_loading<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        opts: &PollOptions,
    ) -> Result<LoadingState, ProbeError> {
        self.wait_for_indicators(driver, &LOADING_INDICATORS, opts).await
    }

    pub async fn wait_for_indicators<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        indicators: &[Locator],
        opts: &PollOptions,
    ) -> Result<LoadingState, ProbeError> {
        let budget = opts.effective_timeout();
        let window = self.config.detection_window.min(budget);
        let interval = self.config.check_interval;
        let start = Instant::now();

        let shown = poll_until("loading indicator", window, interval, move || {
            visible_indicator(driver, indicators)
        })
        .await;

        let indicator = match shown {
            Ok(locator) => locator,
            Err(e) if e.is_timeout() => {
                debug!(window_ms = window.as_millis() as u64, "no loading indicator, page already loaded");
                return Ok(LoadingState::AlreadyLoaded);
            }
            Err(e) => return Err(e),
        };

        debug!(indicator = %indicator, "loading indicator visible, waiting for it to clear");
        let remaining = budget.saturating_sub(start.elapsed());

        poll_until("loading indicator to clear", remaining, interval, move || async move {
            let still = visible_indicator(driver, indicators).await?;
            Ok(still.is_none().then_some(()))
        })
        .await
        .map_err(|e| {
            let mut context = e.context.clone();
            context["indicator"] = json!(indicator.to_string());
            context["browser"] = json!(opts.browser_kind().name());
            e.with_context(context)
        })?;

        // Layout can still shift in the frame after the indicator goes away.
        sleep(opts.stabilization_delay()).await;

        let after = start.elapsed();
        info!(indicator = %indicator, after_ms = after.as_millis() as u64, "loading cleared");
        Ok(LoadingState::Cleared { after })
    }
}
