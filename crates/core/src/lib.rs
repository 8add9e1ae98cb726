use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Rendering engine a test runs against. Only used to pick timeout tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chromium,
    Webkit,
    Firefox,
}

impl BrowserKind {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Webkit => "webkit",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrowserKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "webkit" | "safari" => Ok(BrowserKind::Webkit),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(ConfigError::UnknownBrowser(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrowserConfig {
    pub browser_kind: BrowserKind,
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser_kind: BrowserKind::Chromium,
            headless: true,
            viewport_width: Some(1280),
            viewport_height: Some(720),
        }
    }
}

/// Configuration problems surfaced while building options or parsing config files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown browser kind '{0}'")]
    UnknownBrowser(String),
    #[error("unknown page type '{0}'")]
    UnknownPageType(String),
    #[error("timeout multiplier for {kind} must be finite and >= 1.0, got {value}")]
    InvalidMultiplier { kind: BrowserKind, value: f64 },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-browser timeout multipliers and post-loading stabilization delays.
///
/// WebKit and Firefox render slower than Chromium, so their budgets are
/// stretched. Multipliers never drop below 1.0, which keeps every effective
/// timeout at or above the nominal one.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutScaling {
    chromium: f64,
    webkit: f64,
    firefox: f64,
    stabilization: [Duration; 3],
}

impl Default for TimeoutScaling {
    fn default() -> Self {
        Self {
            chromium: 1.0,
            webkit: 1.4,
            firefox: 1.3,
            stabilization: [
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(200),
            ],
        }
    }
}

impl TimeoutScaling {
    /// A table with every multiplier at 1.0 and no stabilization delay.
    pub fn uniform() -> Self {
        Self {
            chromium: 1.0,
            webkit: 1.0,
            firefox: 1.0,
            stabilization: [Duration::ZERO; 3],
        }
    }

    pub fn with_multiplier(mut self, kind: BrowserKind, value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() || value < 1.0 {
            return Err(ConfigError::InvalidMultiplier { kind, value });
        }
        match kind {
            BrowserKind::Chromium => self.chromium = value,
            BrowserKind::Webkit => self.webkit = value,
            BrowserKind::Firefox => self.firefox = value,
        }
        Ok(self)
    }

    pub fn with_stabilization(mut self, kind: BrowserKind, delay: Duration) -> Self {
        self.stabilization[Self::slot(kind)] = delay;
        self
    }

    pub fn multiplier(&self, kind: BrowserKind) -> f64 {
        match kind {
            BrowserKind::Chromium => self.chromium,
            BrowserKind::Webkit => self.webkit,
            BrowserKind::Firefox => self.firefox,
        }
    }

    pub fn stabilization_delay(&self, kind: BrowserKind) -> Duration {
        self.stabilization[Self::slot(kind)]
    }

    pub fn scale(&self, kind: BrowserKind, nominal: Duration) -> Duration {
        let m = self.multiplier(kind);
        if m <= 1.0 {
            return nominal;
        }
        // Saturates instead of overflowing. Rounding may lose a nanosecond,
        // so never return less than nominal.
        Duration::try_from_secs_f64(nominal.as_secs_f64() * m)
            .unwrap_or(Duration::MAX)
            .max(nominal)
    }

    fn slot(kind: BrowserKind) -> usize {
        match kind {
            BrowserKind::Chromium => 0,
            BrowserKind::Webkit => 1,
            BrowserKind::Firefox => 2,
        }
    }
}

/// Options for a single polling call. Built once, consumed by one helper.
#[derive(Debug, Clone)]
pub struct PollOptions {
    timeout: Duration,
    browser_kind: BrowserKind,
    strict: bool,
    scaling: TimeoutScaling,
}

impl PollOptions {
    pub fn new(timeout: Duration, browser_kind: BrowserKind) -> Self {
        Self {
            timeout,
            browser_kind,
            strict: false,
            scaling: TimeoutScaling::default(),
        }
    }

    pub fn from_millis(ms: u64, browser_kind: BrowserKind) -> Self {
        Self::new(Duration::from_millis(ms), browser_kind)
    }

    /// Reads the browser kind from `VIGIL_BROWSER`, defaulting to Chromium.
    pub fn from_env(timeout: Duration) -> Result<Self, ConfigError> {
        let kind = match std::env::var("VIGIL_BROWSER") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => BrowserKind::Chromium,
        };
        Ok(Self::new(timeout, kind))
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn with_scaling(mut self, scaling: TimeoutScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn nominal_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn effective_timeout(&self) -> Duration {
        self.scaling.scale(self.browser_kind, self.timeout)
    }

    pub fn stabilization_delay(&self) -> Duration {
        self.scaling.stabilization_delay(self.browser_kind)
    }

    pub fn browser_kind(&self) -> BrowserKind {
        self.browser_kind
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Expectation for waits that are optional by default.
    pub fn optional_expectation(&self) -> Expectation {
        if self.strict {
            Expectation::Required
        } else {
            Expectation::Optional
        }
    }
}

/// Whether an unsatisfied wait is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Required,
    Optional,
}

/// Successful end states of a wait. A required wait that times out is an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    Tolerated { waited: Duration },
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied)
    }
}

/// Two-axis health summary of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessResult {
    connected: bool,
    has_data: bool,
    error: Option<String>,
}

impl ReadinessResult {
    pub fn connected(has_data: bool) -> Self {
        Self {
            connected: true,
            has_data,
            error: None,
        }
    }

    pub fn disconnected(error: impl Into<String>, has_data: bool) -> Self {
        Self {
            connected: false,
            has_data,
            error: Some(error.into()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Before/after comparison of a live value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProbeResult {
    updated: bool,
    initial_value: String,
    timed_out: bool,
}

impl UpdateProbeResult {
    pub fn changed(initial_value: impl Into<String>) -> Self {
        Self {
            updated: true,
            initial_value: initial_value.into(),
            timed_out: false,
        }
    }

    /// No update arrived inside the window. Not a failure.
    pub fn unchanged(initial_value: impl Into<String>) -> Self {
        Self {
            updated: false,
            initial_value: initial_value.into(),
            timed_out: true,
        }
    }

    pub fn updated(&self) -> bool {
        self.updated
    }

    pub fn initial_value(&self) -> &str {
        &self.initial_value
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

/// Dashboard pages with their own notion of "loaded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Homepage,
    Blocks,
    Nodes,
    Pools,
    Supply,
    Downloads,
    General,
}

impl PageType {
    pub const ALL: [PageType; 7] = [
        PageType::Homepage,
        PageType::Blocks,
        PageType::Nodes,
        PageType::Pools,
        PageType::Supply,
        PageType::Downloads,
        PageType::General,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            PageType::Homepage | PageType::General => "/",
            PageType::Blocks => "/blocks",
            PageType::Nodes => "/nodes",
            PageType::Pools => "/pools",
            PageType::Supply => "/supply",
            PageType::Downloads => "/downloads",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageType::Homepage => "homepage",
            PageType::Blocks => "blocks",
            PageType::Nodes => "nodes",
            PageType::Pools => "pools",
            PageType::Supply => "supply",
            PageType::Downloads => "downloads",
            PageType::General => "general",
        }
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "" | "home" | "homepage" => Ok(PageType::Homepage),
            "blocks" => Ok(PageType::Blocks),
            "nodes" => Ok(PageType::Nodes),
            "pools" => Ok(PageType::Pools),
            "supply" => Ok(PageType::Supply),
            "downloads" => Ok(PageType::Downloads),
            "general" | "roadmap" => Ok(PageType::General),
            other => Err(ConfigError::UnknownPageType(other.to_string())),
        }
    }
}

/// How an element is located on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector; comma-separated alternatives are allowed.
    Css(String),
    /// Elements whose own text contains this string, case-insensitively.
    Text(String),
    /// Elements with this ARIA `role` attribute.
    Role(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text(needle: impl Into<String>) -> Self {
        Locator::Text(needle.into())
    }

    pub fn role(role: impl Into<String>) -> Self {
        Locator::Role(role.into())
    }

    /// The CSS form of this locator, if it has one.
    pub fn as_css(&self) -> Option<String> {
        match self {
            Locator::Css(s) => Some(s.clone()),
            Locator::Role(r) => Some(format!("[role=\"{}\"]", r)),
            Locator::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::Text(t) => write!(f, "text={}", t),
            Locator::Role(r) => write!(f, "role={}", r),
        }
    }
}

/// Error categories for programmatic handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (fetch failures, refused connections)
    Network,
    /// Element not found or selector issues
    ElementNotFound,
    /// JavaScript execution errors
    ScriptExecution,
    /// Navigation or lost execution context
    Navigation,
    /// Browser/driver errors
    Browser,
    /// Parsing errors (HTML/CSS/JSON)
    Parsing,
    /// A polled condition never held within its budget
    Timeout,
}

/// Structured error with context for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeError {
    pub category: ErrorCategory,
    pub message: String,
    /// Optional context (selector, timeout, page type, ...)
    pub context: serde_json::Value,
    /// Whether retrying the same operation may succeed
    pub recoverable: bool,
}

impl ProbeError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
            recoverable: false,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.category == ErrorCategory::Timeout
    }

    /// Lost execution context mid-navigation; the next poll usually succeeds.
    pub fn is_transient(&self) -> bool {
        self.category == ErrorCategory::Navigation && self.recoverable
    }

    pub fn fetch_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message).recoverable()
    }

    pub fn element_not_found(what: impl std::fmt::Display) -> Self {
        let what = what.to_string();
        Self::new(ErrorCategory::ElementNotFound, format!("Element not found: {}", what))
            .with_context(serde_json::json!({ "locator": what }))
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message).recoverable()
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ScriptExecution, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn context_lost(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message).recoverable()
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parsing, message)
    }
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.category, self.message)
    }
}

impl std::error::Error for ProbeError {}

/// The DOM primitives the polling layer needs from a browser automation engine.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Trimmed text content of every matched element, in document order.
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ProbeError>;

    async fn count(&self, locator: &Locator) -> Result<usize, ProbeError>;

    /// True if any matched element is rendered.
    async fn is_visible(&self, locator: &Locator) -> Result<bool, ProbeError>;

    async fn body_text(&self) -> Result<String, ProbeError>;

    async fn first_text(&self, locator: &Locator) -> Result<Option<String>, ProbeError> {
        Ok(self.texts(locator).await?.into_iter().next())
    }
}
