use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use vigil_core::{Locator, PageDriver, PollOptions, ProbeError, ReadinessResult};

use crate::ReadinessProbe;
use crate::hooks;

static ERROR_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:error|offline|connection failed|disconnected)\b").expect("error text regex")
});

impl ReadinessProbe {
    /// Summarise the page as connected/has-data.
    ///
    /// The two axes are independent: a page can show cached data while
    /// reporting a dropped connection.
    pub async fn report_connection<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        opts: &PollOptions,
    ) -> Result<ReadinessResult, ProbeError> {
        if let Err(e) = self.wait_for_loading(driver, opts).await {
            if !e.is_timeout() {
                return Err(e);
            }
            warn!(error = %e, "loading indicator still visible, reporting anyway");
        }

        let error = find_error(driver).await?;
        let has_data = find_data(driver).await?;

        let result = match error {
            Some(message) => ReadinessResult::disconnected(message, has_data),
            None => ReadinessResult::connected(has_data),
        };
        info!(
            connected = result.is_connected(),
            has_data = result.has_data(),
            error = result.error().unwrap_or(""),
            "connection state"
        );
        Ok(result)
    }
}

async fn find_error<D: PageDriver + ?Sized>(driver: &D) -> Result<Option<String>, ProbeError> {
    let element = Locator::css(hooks::ERROR_ELEMENT);
    if driver.is_visible(&element).await? {
        let text = driver.first_text(&element).await?.unwrap_or_default();
        if text.is_empty() {
            return Ok(Some(format!("error indicator visible: {}", element)));
        }
        return Ok(Some(text));
    }

    let body = driver.body_text().await?;
    Ok(ERROR_TEXT.find(&body).map(|m| m.as_str().to_string()))
}

async fn find_data<D: PageDriver + ?Sized>(driver: &D) -> Result<bool, ProbeError> {
    let cards = driver.texts(&Locator::css(hooks::STAT_CARD)).await?;
    if cards.iter().any(|t| t.chars().any(|c| c.is_ascii_digit())) {
        return Ok(true);
    }
    for selector in [hooks::CHART_PATH, hooks::POOL_ITEM, hooks::CHART_CANVAS] {
        if driver.count(&Locator::css(selector)).await? > 0 {
            return Ok(true);
        }
    }
    Ok(false)
}
