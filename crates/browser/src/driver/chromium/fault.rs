use chromiumoxide::cdp::browser_protocol::network::{
    EmulateNetworkConditionsParams, EnableParams, SetBlockedUrLsParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use serde::{Deserialize, Serialize};
use tracing::info;
use vigil_core::ProbeError;
use crate::shared::{js, to_probe_error};

/// Network faults to install on a page before it navigates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultPlan {
    /// Make every WebSocket the page opens fail immediately.
    pub block_live_channel: bool,
    /// URL patterns (`*` wildcards) the browser refuses to load.
    pub blocked_urls: Vec<String>,
    /// Extra round-trip latency applied to every request.
    pub latency_ms: Option<u64>,
    pub offline: bool,
}

impl FaultPlan {
    pub fn block_live_channel() -> Self {
        Self {
            block_live_channel: true,
            ..Self::default()
        }
    }

    /// Emulate a dropped network: every request fails.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn with_blocked_url(mut self, pattern: impl Into<String>) -> Self {
        self.blocked_urls.push(pattern.into());
        self
    }

    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.block_live_channel && self.blocked_urls.is_empty() && self.latency_ms.is_none() && !self.offline
    }

    fn touches_network(&self) -> bool {
        !self.blocked_urls.is_empty() || self.latency_ms.is_some() || self.offline
    }

    pub(crate) async fn apply(&self, page: &Page) -> Result<(), ProbeError> {
        if self.block_live_channel {
            page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
                js::fault::BLOCK_LIVE_CHANNEL,
            ))
            .await
            .map_err(|e| to_probe_error(e, "BlockLiveChannel"))?;
        }

        if self.touches_network() {
            page.execute(EnableParams::default())
                .await
                .map_err(|e| to_probe_error(e, "NetworkEnable"))?;
        }

        if !self.blocked_urls.is_empty() {
            page.execute(SetBlockedUrLsParams::new(self.blocked_urls.clone()))
                .await
                .map_err(|e| to_probe_error(e, "BlockUrls"))?;
        }

        if self.latency_ms.is_some() || self.offline {
            let latency = self.latency_ms.unwrap_or(0) as f64;
            // -1 leaves throughput unthrottled
            page.execute(EmulateNetworkConditionsParams::new(self.offline, latency, -1.0, -1.0))
                .await
                .map_err(|e| to_probe_error(e, "EmulateNetwork"))?;
        }

        info!(
            block_live_channel = self.block_live_channel,
            blocked_urls = self.blocked_urls.len(),
            latency_ms = self.latency_ms.unwrap_or(0),
            offline = self.offline,
            "fault plan installed"
        );
        Ok(())
    }
}
