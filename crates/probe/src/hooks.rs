//! Selectors for the dashboard's markup.
//!
//! Each entry lists the `data-testid` hook first and the component-library
//! class it falls back to as a CSS alternative, so one query covers both.

use once_cell::sync::Lazy;
use vigil_core::Locator;

pub const STAT_CARD: &str = r#"[data-testid="stat-card"], .MuiCard-root"#;
pub const CARD: &str = r#"[data-testid="card"], .MuiCard-root, .card"#;

pub const BLOCK_LINK: &str = r#"[data-testid="block-link"], a[href*="/block/"]"#;

pub const NODE_MAP: &str = r#"[data-testid="node-map"], .leaflet-container, svg.rsm-svg"#;
pub const NODE_STATS: &str = r#"[data-testid="node-stats"], .MuiCard-root"#;

pub const POOL_CHART_PATH: &str =
    r#"[data-testid="pool-chart"] path, .recharts-surface path, svg.pool-chart path"#;
pub const POOL_ITEM: &str =
    r#"[data-testid="pool-item"], [data-testid="pool-list"] li, .pool-list li"#;

pub const SUPPLY_CARD: &str = r#"[data-testid="supply-stats"], .MuiCard-root"#;
pub const CHART_CANVAS: &str = "canvas";

pub const DOWNLOAD_TOTAL: &str = r#"[data-testid="download-total"], .download-count"#;
pub const RELEASE_CARD: &str = r#"[data-testid="release-card"], .release-card"#;

pub const ERROR_ELEMENT: &str =
    r#"[data-testid="connection-error"], [role="alert"], .error, .MuiAlert-standardError"#;
/// Drawn chart segments on any page. Icons outside a chart never match.
pub const CHART_PATH: &str =
    r#"[data-testid="pool-chart"] path, [data-testid="supply-chart"] path, .recharts-surface path, svg.pool-chart path"#;

/// Everything that means "still loading" somewhere on the dashboard.
pub static LOADING_INDICATORS: Lazy<Vec<Locator>> = Lazy::new(|| {
    vec![
        Locator::role("progressbar"),
        Locator::css(
            r#"[data-testid="loading"], .loading, .MuiCircularProgress-root, .MuiLinearProgress-root, .MuiSkeleton-root"#,
        ),
        Locator::text("Loading..."),
        Locator::text("Loading blocks"),
        Locator::text("Loading nodes"),
        Locator::text("Loading pools"),
        Locator::text("Loading supply"),
        Locator::text("Loading downloads"),
        Locator::text("Connecting"),
    ]
});
