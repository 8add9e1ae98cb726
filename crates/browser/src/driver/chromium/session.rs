use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vigil_core::{BrowserConfig, BrowserKind, Locator, PageDriver, PageType, ProbeError};

use super::fault::FaultPlan;
use super::wait::PageStability;
use crate::shared::{js, to_probe_error, TimeoutConfig};

/// A live Chromium page exposed through the `PageDriver` primitives.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    profile_dir: PathBuf,
    handler: JoinHandle<()>,
    timeouts: TimeoutConfig,
    kind: BrowserKind,
}

impl ChromiumDriver {
    pub async fn launch(config: BrowserConfig) -> Result<Self, ProbeError> {
        Self::launch_with(config, TimeoutConfig::default()).await
    }

    pub async fn launch_with(config: BrowserConfig, timeouts: TimeoutConfig) -> Result<Self, ProbeError> {
        if config.browser_kind != BrowserKind::Chromium {
            return Err(ProbeError::browser_error(format!(
                "ChromiumDriver cannot drive {}",
                config.browser_kind
            )));
        }

        // A fresh profile per instance avoids SingletonLock conflicts between parallel tests.
        let temp_dir = std::env::temp_dir().join(format!("vigil-chromium-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)
            .map_err(|e| ProbeError::browser_error(format!("Failed to create temp dir: {}", e)))?;

        let mut builder = ChromeConfig::builder()
            .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(&temp_dir)
            .request_timeout(timeouts.navigation);

        if let (Some(w), Some(h)) = (config.viewport_width, config.viewport_height) {
            builder = builder.window_size(w, h);
        }

        let chrome_cfg = builder.build()
            .map_err(|e| ProbeError::browser_error(format!("Config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| ProbeError::browser_error(format!("Launch failed: {}", e)))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page("about:blank").await
            .map_err(|e| ProbeError::browser_error(format!("New page failed: {}", e)))?;

        let driver = Self {
            browser,
            page,
            profile_dir: temp_dir,
            handler,
            timeouts,
            kind: config.browser_kind,
        };
        if let (Some(w), Some(h)) = (config.viewport_width, config.viewport_height) {
            driver.set_viewport(w, h).await?;
        }
        info!(headless = config.headless, "chromium launched");
        Ok(driver)
    }

    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The throwaway profile directory, removed by `close`.
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// Install network faults. Call before `goto` so page scripts see them.
    pub async fn apply_faults(&self, plan: &FaultPlan) -> Result<(), ProbeError> {
        if plan.is_empty() {
            return Ok(());
        }
        plan.apply(&self.page).await
    }

    pub async fn live_channel_blocked(&self) -> Result<bool, ProbeError> {
        self.eval(js::build_js_call(js::fault::IS_LIVE_CHANNEL_BLOCKED, &[]), "LiveChannelBlocked")
            .await
    }

    pub async fn goto(&self, url: &str) -> Result<(), ProbeError> {
        info!(url, "navigating");
        self.page.goto(url).await
            .map_err(|e| ProbeError::navigation_error(format!("Navigation to {} failed: {}", url, e))
                .with_context(json!({ "url": url })))?;

        PageStability::new(self.timeouts.clone())
            .wait_for_stable(&self.page, self.timeouts.page_stable)
            .await
    }

    /// Navigate to `page`'s route under `base_url`.
    pub async fn open(&self, base_url: &str, page: PageType) -> Result<(), ProbeError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), page.path());
        self.goto(&url).await
    }

    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), ProbeError> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(width as i64, height as i64, 1.0, false))
            .await
            .map_err(|e| to_probe_error(e, "SetViewport"))?;
        debug!(width, height, "viewport resized");
        Ok(())
    }

    pub async fn close(self) -> Result<(), ProbeError> {
        let Self { mut browser, handler, profile_dir, .. } = self;
        browser.close().await
            .map_err(|e| ProbeError::browser_error(format!("Close failed: {}", e)))?;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "chromium process did not exit cleanly");
        }
        handler.abort();
        if let Err(e) = std::fs::remove_dir_all(&profile_dir) {
            warn!(error = %e, path = %profile_dir.display(), "failed to remove chromium profile");
        }
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, js: String, action: &str) -> Result<T, ProbeError> {
        let result = self.page.evaluate(js).await
            .map_err(|e| to_probe_error(e, action))?;
        result.into_value::<T>()
            .map_err(|e| ProbeError::script_error(format!("{} returned unexpected value: {}", action, e)))
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ProbeError> {
        self.eval(js::build_locator_call(js::dom::TEXTS, locator), "Texts").await
    }

    async fn count(&self, locator: &Locator) -> Result<usize, ProbeError> {
        self.eval(js::build_locator_call(js::dom::COUNT, locator), "Count").await
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, ProbeError> {
        self.eval(js::build_locator_call(js::dom::ANY_VISIBLE, locator), "IsVisible").await
    }

    async fn body_text(&self) -> Result<String, ProbeError> {
        self.eval(js::build_js_call(js::dom::BODY_TEXT, &[]), "BodyText").await
    }
}
