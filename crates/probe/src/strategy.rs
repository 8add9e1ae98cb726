use futures::future::{BoxFuture, FutureExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vigil_core::{Locator, PageDriver, PageType, PollOptions, ProbeError, WaitOutcome};

use crate::ReadinessProbe;
use crate::hooks;
use crate::poll::{poll_until, settle};
use crate::population::DataPattern;

/// A readiness predicate over the DOM.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Exists(Locator),
    MinCount(Locator, usize),
    /// Some matched element's text fits one of `patterns` and does not contain `excluding`.
    TextMatches {
        locator: Locator,
        patterns: Vec<DataPattern>,
        excluding: String,
    },
    /// Some matched element has non-empty text without `needle`.
    TextExcludes { locator: Locator, needle: String },
    BodyExcludes(String),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn exists(selector: &str) -> Self {
        Condition::Exists(Locator::css(selector))
    }

    pub fn min_count(selector: &str, n: usize) -> Self {
        Condition::MinCount(Locator::css(selector), n)
    }

    pub fn text_excludes(selector: &str, needle: &str) -> Self {
        Condition::TextExcludes {
            locator: Locator::css(selector),
            needle: needle.to_string(),
        }
    }

    pub fn evaluate<'a, D: PageDriver + ?Sized>(
        &'a self,
        driver: &'a D,
    ) -> BoxFuture<'a, Result<bool, ProbeError>> {
        async move {
            match self {
                Condition::Exists(locator) => Ok(driver.count(locator).await? > 0),
                Condition::MinCount(locator, n) => Ok(driver.count(locator).await? >= *n),
                Condition::TextMatches {
                    locator,
                    patterns,
                    excluding,
                } => {
                    let texts = driver.texts(locator).await?;
                    Ok(texts.iter().any(|t| {
                        !t.contains(excluding.as_str()) && patterns.iter().any(|p| p.matches(t))
                    }))
                }
                Condition::TextExcludes { locator, needle } => {
                    let texts = driver.texts(locator).await?;
                    Ok(texts
                        .iter()
                        .any(|t| !t.is_empty() && !t.contains(needle.as_str())))
                }
                Condition::BodyExcludes(needle) => {
                    Ok(!driver.body_text().await?.contains(needle.as_str()))
                }
                Condition::All(conditions) => {
                    for c in conditions {
                        if !c.evaluate(driver).await? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Condition::Any(conditions) => {
                    for c in conditions {
                        if c.evaluate(driver).await? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            }
        }
        .boxed()
    }
}

/// What "fully loaded" means for each page.
pub fn readiness_condition(page: PageType) -> Condition {
    match page {
        PageType::Homepage => Condition::TextMatches {
            locator: Locator::css(hooks::STAT_CARD),
            patterns: DataPattern::FORMATTED.to_vec(),
            excluding: "Loading".to_string(),
        },
        PageType::Blocks => Condition::min_count(hooks::BLOCK_LINK, 1),
        PageType::Nodes => Condition::All(vec![
            Condition::exists(hooks::NODE_MAP),
            Condition::text_excludes(hooks::NODE_STATS, "Loading"),
        ]),
        PageType::Pools => Condition::All(vec![
            Condition::min_count(hooks::POOL_CHART_PATH, 1),
            Condition::min_count(hooks::POOL_ITEM, 1),
        ]),
        PageType::Supply => Condition::All(vec![
            Condition::text_excludes(hooks::SUPPLY_CARD, "Loading"),
            Condition::exists(hooks::CHART_CANVAS),
        ]),
        PageType::Downloads => Condition::All(vec![
            Condition::TextMatches {
                locator: Locator::css(hooks::DOWNLOAD_TOTAL),
                patterns: DataPattern::NUMERIC.to_vec(),
                excluding: "Loading".to_string(),
            },
            Condition::min_count(hooks::RELEASE_CARD, 1),
        ]),
        PageType::General => Condition::All(vec![
            Condition::exists(hooks::CARD),
            Condition::BodyExcludes("Loading...".to_string()),
        ]),
    }
}

/// The element whose content best shows the page has real data.
pub fn primary_data_locator(page: PageType) -> Locator {
    let selector = match page {
        PageType::Homepage => hooks::STAT_CARD,
        PageType::Blocks => hooks::BLOCK_LINK,
        PageType::Nodes => hooks::NODE_STATS,
        PageType::Pools => hooks::POOL_ITEM,
        PageType::Supply => hooks::SUPPLY_CARD,
        PageType::Downloads => hooks::DOWNLOAD_TOTAL,
        PageType::General => hooks::CARD,
    };
    Locator::css(selector)
}

impl ReadinessProbe {
    /// Wait for `page`'s readiness condition.
    ///
    /// Offline or mocked environments may never satisfy it, so the timeout is
    /// tolerated unless the options are strict.
    pub async fn wait_for_page<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        page: PageType,
        opts: &PollOptions,
    ) -> Result<WaitOutcome, ProbeError> {
        let condition = readiness_condition(page);
        self.wait_for_condition(driver, &condition, opts)
            .await
            .inspect(|outcome| match outcome {
                WaitOutcome::Satisfied => info!(page = %page, "page ready"),
                WaitOutcome::Tolerated { waited } => warn!(
                    page = %page,
                    waited_ms = waited.as_millis() as u64,
                    "page readiness not confirmed"
                ),
            })
    }

    pub async fn wait_for_condition<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        condition: &Condition,
        opts: &PollOptions,
    ) -> Result<WaitOutcome, ProbeError> {
        let start = Instant::now();
        let result = poll_until(
            "readiness condition",
            opts.effective_timeout(),
            self.config.check_interval,
            move || async move { Ok(condition.evaluate(driver).await?.then_some(())) },
        )
        .await;
        if let Err(e) = &result {
            debug!(condition = ?condition, error = %e, "readiness condition unmet");
        }
        settle(result, opts.optional_expectation(), start.elapsed())
    }
}
