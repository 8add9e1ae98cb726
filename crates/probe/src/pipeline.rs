use tracing::{info, warn};
use vigil_core::{PageDriver, PageType, PollOptions, ProbeError, WaitOutcome};

use crate::ReadinessProbe;
use crate::loading::LoadingState;
use crate::strategy::primary_data_locator;

/// Result of running the whole readiness sequence for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReadiness {
    pub page_type: PageType,
    /// `None` when the loading indicator never cleared and that was tolerated.
    pub loading: Option<LoadingState>,
    pub data: WaitOutcome,
    pub strategy: WaitOutcome,
}

impl PageReadiness {
    pub fn is_ready(&self) -> bool {
        self.loading.is_some() && self.data.is_satisfied() && self.strategy.is_satisfied()
    }
}

impl ReadinessProbe {
    /// Loading detector, then data verifier, then the page strategy.
    pub async fn wait_for_page_ready<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        page: PageType,
        opts: &PollOptions,
    ) -> Result<PageReadiness, ProbeError> {
        let loading = match self.wait_for_loading(driver, opts).await {
            Ok(state) => Some(state),
            Err(e) if e.is_timeout() && !opts.is_strict() => {
                warn!(page = %page, error = %e, "loading never cleared, continuing");
                None
            }
            Err(e) => return Err(e),
        };

        let data = self
            .wait_for_data(driver, &primary_data_locator(page), opts)
            .await?;
        let strategy = self.wait_for_page(driver, page, opts).await?;

        let readiness = PageReadiness {
            page_type: page,
            loading,
            data,
            strategy,
        };
        info!(page = %page, ready = readiness.is_ready(), "page readiness");
        Ok(readiness)
    }
}
