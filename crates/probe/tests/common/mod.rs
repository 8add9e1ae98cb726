#![allow(dead_code)]

use async_trait::async_trait;
use vigil_core::{Locator, PageDriver, ProbeError};

pub fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>DigiByte Stats</title></head><body>{}</body></html>",
        body
    )
}

pub fn stat_card(value: &str) -> String {
    page(&format!(
        r#"<div class="MuiCard-root"><h6>Total Supply</h6><p id="value">{}</p></div>"#,
        value
    ))
}

/// A driver whose every primitive fails with the same error.
pub struct FailingDriver {
    pub error: ProbeError,
}

#[async_trait]
impl PageDriver for FailingDriver {
    async fn texts(&self, _locator: &Locator) -> Result<Vec<String>, ProbeError> {
        Err(self.error.clone())
    }

    async fn count(&self, _locator: &Locator) -> Result<usize, ProbeError> {
        Err(self.error.clone())
    }

    async fn is_visible(&self, _locator: &Locator) -> Result<bool, ProbeError> {
        Err(self.error.clone())
    }

    async fn body_text(&self) -> Result<String, ProbeError> {
        Err(self.error.clone())
    }
}
