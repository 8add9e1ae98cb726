use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use vigil_core::{BrowserKind, ConfigError, PollOptions, TimeoutScaling};

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub check_interval: Duration,
    /// How long the loading detector looks for an indicator before assuming the page is loaded.
    pub detection_window: Duration,
    pub default_timeout: Duration,
    pub scaling: TimeoutScaling,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(100),
            detection_window: Duration::from_millis(1000),
            default_timeout: Duration::from_millis(10000),
            scaling: TimeoutScaling::default(),
        }
    }
}

impl ProbeConfig {
    pub fn with_check_interval(mut self, ms: u64) -> Self {
        self.check_interval = Duration::from_millis(ms);
        self
    }

    pub fn with_detection_window(mut self, ms: u64) -> Self {
        self.detection_window = Duration::from_millis(ms);
        self
    }

    pub fn with_default_timeout(mut self, ms: u64) -> Self {
        self.default_timeout = Duration::from_millis(ms);
        self
    }

    pub fn with_scaling(mut self, scaling: TimeoutScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn fast() -> Self {
        Self {
            check_interval: Duration::from_millis(50),
            detection_window: Duration::from_millis(500),
            default_timeout: Duration::from_millis(5000),
            scaling: TimeoutScaling::default(),
        }
    }

    pub fn patient() -> Self {
        Self {
            check_interval: Duration::from_millis(250),
            detection_window: Duration::from_millis(1000),
            default_timeout: Duration::from_millis(30000),
            scaling: TimeoutScaling::default(),
        }
    }

    /// Options for `kind` using this config's default timeout and scaling table.
    pub fn options(&self, kind: BrowserKind) -> PollOptions {
        PollOptions::new(self.default_timeout, kind).with_scaling(self.scaling.clone())
    }

    /// Overlay the fields present in `json` onto the defaults.
    ///
    /// ```json
    /// { "check_interval_ms": 50, "multipliers": { "webkit": 1.5 }, "stabilization_ms": { "webkit": 400 } }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawProbeConfig = serde_json::from_str(json)?;
        let mut config = Self::default();
        if let Some(ms) = raw.check_interval_ms {
            config = config.with_check_interval(ms);
        }
        if let Some(ms) = raw.detection_window_ms {
            config = config.with_detection_window(ms);
        }
        if let Some(ms) = raw.default_timeout_ms {
            config = config.with_default_timeout(ms);
        }
        for (name, value) in raw.multipliers {
            let kind: BrowserKind = name.parse()?;
            config.scaling = config.scaling.with_multiplier(kind, value)?;
        }
        for (name, ms) in raw.stabilization_ms {
            let kind: BrowserKind = name.parse()?;
            config.scaling = config
                .scaling
                .with_stabilization(kind, Duration::from_millis(ms));
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProbeConfig {
    check_interval_ms: Option<u64>,
    detection_window_ms: Option<u64>,
    default_timeout_ms: Option<u64>,
    #[serde(default)]
    multipliers: HashMap<String, f64>,
    #[serde(default)]
    stabilization_ms: HashMap<String, u64>,
}
