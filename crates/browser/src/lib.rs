//! Chromium-backed `PageDriver` for the readiness probes.

pub mod driver;
pub mod shared;

pub use driver::{ChromiumDriver, FaultPlan};
pub use shared::TimeoutConfig;
