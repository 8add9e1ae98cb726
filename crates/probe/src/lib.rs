//! Readiness polling for dashboard end-to-end tests.
//!
//! Every helper performs one bounded poll against a [`PageDriver`] and turns
//! the result into a typed outcome. Nothing is cached between calls.

pub mod config;
pub mod connection;
pub mod hooks;
pub mod loading;
pub mod pipeline;
pub mod poll;
pub mod population;
pub mod strategy;
pub mod update;

pub use config::ProbeConfig;
pub use loading::LoadingState;
pub use pipeline::PageReadiness;
pub use poll::poll_until;
pub use population::{DataPattern, is_placeholder, is_real_data};
pub use strategy::{Condition, readiness_condition};

pub use vigil_core::{
    BrowserKind, Expectation, Locator, PageDriver, PageType, PollOptions, ProbeError,
    ReadinessResult, UpdateProbeResult, WaitOutcome,
};

/// Entry point for the polling helpers. Holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct ReadinessProbe {
    config: ProbeConfig,
}

impl ReadinessProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Options for `kind` built from this probe's config.
    pub fn options(&self, kind: BrowserKind) -> PollOptions {
        self.config.options(kind)
    }
}
