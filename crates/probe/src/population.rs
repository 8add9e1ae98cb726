use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};
use vigil_core::{Locator, PageDriver, PollOptions, ProbeError, WaitOutcome};

use crate::ReadinessProbe;
use crate::poll::{poll_until, settle};

static GROUPED_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+").expect("grouped integer regex"));
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d+").expect("decimal regex"));
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").expect("integer regex"));
static HEX_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:0x)?[0-9a-fA-F]{64}\b").expect("hash regex"));
static PERCENTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?\s*%").expect("percentage regex"));
static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\$\s*\d[\d,]*(?:\.\d+)?)|(?:\d[\d,]*(?:\.\d+)?\s*(?:DGB|USD)\b)")
        .expect("currency regex")
});
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2})?)?").expect("iso date regex")
});

/// A textual shape that only real data takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataPattern {
    /// `131,736`
    GroupedInteger,
    /// `3.75`
    Decimal,
    /// Any bare integer. Not part of the default set: too many labels contain digits.
    Integer,
    /// 64 hex chars, optionally `0x`-prefixed
    HexHash,
    /// `12.5%`
    Percentage,
    /// `12,345 DGB`, `$0.01`
    Currency,
    /// `2024-01-31`, `2024-01-31T12:00`
    IsoDate,
}

impl DataPattern {
    pub const DEFAULT: [DataPattern; 6] = [
        DataPattern::GroupedInteger,
        DataPattern::Decimal,
        DataPattern::HexHash,
        DataPattern::Percentage,
        DataPattern::Currency,
        DataPattern::IsoDate,
    ];

    /// Values formatted for display on statistic cards. Bare integers are
    /// left out so titles like "Top 10 Pools" do not count.
    pub const FORMATTED: [DataPattern; 4] = [
        DataPattern::GroupedInteger,
        DataPattern::Decimal,
        DataPattern::Currency,
        DataPattern::Percentage,
    ];

    /// Any number, including bare integers.
    pub const NUMERIC: [DataPattern; 3] = [
        DataPattern::GroupedInteger,
        DataPattern::Decimal,
        DataPattern::Integer,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            DataPattern::GroupedInteger => &GROUPED_INTEGER,
            DataPattern::Decimal => &DECIMAL,
            DataPattern::Integer => &INTEGER,
            DataPattern::HexHash => &HEX_HASH,
            DataPattern::Percentage => &PERCENTAGE,
            DataPattern::Currency => &CURRENCY,
            DataPattern::IsoDate => &ISO_DATE,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex().is_match(text)
    }
}

/// Transient text that must never count as data.
pub fn is_placeholder(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    lower.contains("loading") || lower.contains("connecting")
}

pub fn is_real_data(text: &str, patterns: &[DataPattern]) -> bool {
    !is_placeholder(text) && patterns.iter().any(|p| p.matches(text))
}

impl ReadinessProbe {
    /// Wait until an element matched by `locator` shows real data.
    ///
    /// Some pages legitimately render empty states, so a timeout is tolerated
    /// (and logged) unless the options are strict.
    pub async fn wait_for_data<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        locator: &Locator,
        opts: &PollOptions,
    ) -> Result<WaitOutcome, ProbeError> {
        self.wait_for_data_matching(driver, locator, &DataPattern::DEFAULT, opts)
            .await
    }

    pub async fn wait_for_data_matching<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        locator: &Locator,
        patterns: &[DataPattern],
        opts: &PollOptions,
    ) -> Result<WaitOutcome, ProbeError> {
        let start = Instant::now();
        let timeout = opts.effective_timeout();

        let result = poll_until("data population", timeout, self.config.check_interval, move || async move {
            let texts = driver.texts(locator).await?;
            Ok(texts.into_iter().find(|t| is_real_data(t, patterns)))
        })
        .await;

        let result = match result {
            Ok(text) => {
                info!(locator = %locator, value = %text, "data populated");
                Ok(())
            }
            Err(e) => {
                if e.is_timeout() {
                    warn!(
                        locator = %locator,
                        timeout_ms = timeout.as_millis() as u64,
                        strict = opts.is_strict(),
                        "no real data appeared"
                    );
                }
                Err(e)
            }
        };

        settle(result, opts.optional_expectation(), start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_rejected() {
        for text in ["", "   ", "Loading...", "loading blocks 1,234", "Connecting to 10.0.0.1", "CONNECTING"] {
            assert!(is_placeholder(text), "{text:?} should be a placeholder");
            assert!(!is_real_data(text, &DataPattern::DEFAULT), "{text:?} must not count as data");
        }
    }

    #[test]
    fn recognises_dashboard_values() {
        let cases = [
            ("Block Height 20,123,456", DataPattern::GroupedInteger),
            ("Difficulty 3.75", DataPattern::Decimal),
            ("Hash 0x9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08", DataPattern::HexHash),
            ("SHA256 share 34.2 %", DataPattern::Percentage),
            ("Supply 12,345 DGB", DataPattern::Currency),
            ("Price $0.0123", DataPattern::Currency),
            ("Released 2024-01-31", DataPattern::IsoDate),
        ];
        for (text, pattern) in cases {
            assert!(pattern.matches(text), "{pattern:?} should match {text:?}");
            assert!(is_real_data(text, &DataPattern::DEFAULT));
        }
    }

    #[test]
    fn labels_without_values_are_not_data() {
        assert!(!is_real_data("Total Nodes", &DataPattern::DEFAULT));
        assert!(!is_real_data("Nodes 42", &DataPattern::DEFAULT));
        assert!(is_real_data("Nodes 42", &DataPattern::NUMERIC));
    }

    #[test]
    fn card_titles_with_counts_are_not_formatted_values() {
        assert!(!is_real_data("Top 10 Pools", &DataPattern::FORMATTED));
        assert!(is_real_data("Hashrate share 31.2%", &DataPattern::FORMATTED));
        assert!(is_real_data("Block Height 20,123,456", &DataPattern::FORMATTED));
    }

    #[test]
    fn short_hex_is_not_a_hash() {
        assert!(!DataPattern::HexHash.matches("deadbeef"));
    }
}
