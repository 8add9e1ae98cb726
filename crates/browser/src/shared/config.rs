use std::time::Duration;

/// Timeouts for driving the browser itself. Readiness timeouts live in the
/// caller's `PollOptions`.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub navigation: Duration,
    pub page_stable: Duration,
    pub check_interval: Duration,
    pub settle_delay: Duration,
    /// Consecutive quiet checks before the page counts as stable.
    pub stable_checks: u32,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            navigation: Duration::from_millis(30000),
            page_stable: Duration::from_millis(15000),
            check_interval: Duration::from_millis(300),
            settle_delay: Duration::from_millis(500),
            stable_checks: 3,
        }
    }
}

impl TimeoutConfig {
    pub fn with_navigation(mut self, ms: u64) -> Self {
        self.navigation = Duration::from_millis(ms);
        self
    }

    pub fn with_page_stable(mut self, ms: u64) -> Self {
        self.page_stable = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            navigation: Duration::from_millis(15000),
            page_stable: Duration::from_millis(8000),
            check_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(200),
            stable_checks: 2,
        }
    }

    pub fn patient() -> Self {
        Self {
            navigation: Duration::from_millis(60000),
            page_stable: Duration::from_millis(30000),
            check_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(1000),
            stable_checks: 5,
        }
    }
}
