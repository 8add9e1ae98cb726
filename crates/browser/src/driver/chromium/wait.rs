use chromiumoxide::page::Page;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};
use vigil_core::ProbeError;
use crate::shared::{js, to_probe_error, TimeoutConfig};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageActivity {
    pub(crate) ready_state: String,
    pub(crate) pending_resources: u64,
    pub(crate) url: String,
}

impl PageActivity {
    fn is_quiet(&self) -> bool {
        self.ready_state == "complete" && self.pending_resources == 0
    }
}

pub struct PageStability {
    config: TimeoutConfig,
}

impl PageStability {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Wait until the document is complete and no resources are pending for
    /// several consecutive checks. Running out of time is not an error: pages
    /// with a live channel may never go fully quiet.
    pub async fn wait_for_stable(&self, page: &Page, timeout: Duration) -> Result<(), ProbeError> {
        let js = &js::build_js_call(js::wait::PAGE_ACTIVITY, &[]);
        self.settle_with(timeout, move || async move {
            let result = page
                .evaluate(js.clone())
                .await
                .map_err(|e| to_probe_error(e, "WaitForStable"))?;
            result
                .into_value::<PageActivity>()
                .map_err(|e| ProbeError::script_error(format!("Unexpected page state: {}", e)))
        })
        .await
    }

    /// The stability loop over any source of page activity. Every path,
    /// transient errors included, is bounded by `timeout`.
    pub(crate) async fn settle_with<F, Fut>(&self, timeout: Duration, mut sample: F) -> Result<(), ProbeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<PageActivity, ProbeError>>,
    {
        let start = Instant::now();
        let mut stable_checks = 0;

        loop {
            match sample().await {
                Ok(activity) if activity.is_quiet() => {
                    stable_checks += 1;
                    if stable_checks >= self.config.stable_checks {
                        info!(
                            url = %activity.url,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "page stabilized"
                        );
                        sleep(self.config.settle_delay).await;
                        return Ok(());
                    }
                }
                Ok(activity) => {
                    if stable_checks > 0 {
                        debug!(
                            ready_state = %activity.ready_state,
                            pending = activity.pending_resources,
                            "page activity detected, resetting"
                        );
                    }
                    stable_checks = 0;
                }
                Err(e) if e.is_transient() => {
                    debug!("page context changed (navigating), waiting");
                    stable_checks = 0;
                }
                Err(e) => return Err(e),
            }

            if start.elapsed() >= timeout {
                warn!(timeout_ms = timeout.as_millis() as u64, "page stabilization timeout, continuing anyway");
                return Ok(());
            }

            sleep(self.config.check_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quiet() -> PageActivity {
        PageActivity {
            ready_state: "complete".to_string(),
            pending_resources: 0,
            url: "about:blank".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lost_context_loop_is_bounded_by_timeout() {
        let stability = PageStability::new(TimeoutConfig::default());
        let calls = Cell::new(0u32);
        let start = Instant::now();

        stability
            .settle_with(Duration::from_secs(2), || {
                calls.set(calls.get() + 1);
                async { Err::<PageActivity, _>(ProbeError::context_lost("Execution context was destroyed")) }
            })
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
        assert!(calls.get() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_page_settles_after_consecutive_checks() {
        let config = TimeoutConfig::default();
        let needed = config.stable_checks;
        let stability = PageStability::new(config);
        let calls = Cell::new(0u32);

        stability
            .settle_with(Duration::from_secs(10), || {
                calls.set(calls.get() + 1);
                async { Ok::<_, ProbeError>(quiet()) }
            })
            .await
            .unwrap();

        assert_eq!(calls.get(), needed);
    }

    #[tokio::test(start_paused = true)]
    async fn script_errors_stop_the_wait() {
        let stability = PageStability::new(TimeoutConfig::default());
        let err = stability
            .settle_with(Duration::from_secs(10), || async {
                Err::<PageActivity, _>(ProbeError::script_error("Unexpected page state"))
            })
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
