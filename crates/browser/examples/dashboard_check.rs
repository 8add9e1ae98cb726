//! Run the readiness sequence against every dashboard page.
//!
//! ```text
//! cargo run -p browser --example dashboard_check -- https://digibyte.io [--block-live] [--headed]
//! ```

use browser::{ChromiumDriver, FaultPlan, TimeoutConfig};
use tracing_subscriber::EnvFilter;
use vigil_core::{BrowserConfig, PageType};
use vigil_probe::{Locator, PollOptions, ProbeConfig, ReadinessProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let base_url = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let block_live = args.iter().any(|a| a == "--block-live");
    let headed = args.iter().any(|a| a == "--headed");

    let probe = ReadinessProbe::new(ProbeConfig::default());
    let opts = PollOptions::from_env(probe.config().default_timeout)?
        .with_scaling(probe.config().scaling.clone());

    let driver = ChromiumDriver::launch_with(
        BrowserConfig {
            headless: !headed,
            ..BrowserConfig::default()
        },
        TimeoutConfig::patient(),
    )
    .await?;

    if block_live {
        driver.apply_faults(&FaultPlan::block_live_channel()).await?;
    }

    for page in PageType::ALL {
        if page == PageType::General {
            continue;
        }
        driver.open(&base_url, page).await?;

        let readiness = probe.wait_for_page_ready(&driver, page, &opts).await?;
        let connection = probe.report_connection(&driver, &opts).await?;
        println!(
            "{:<10} ready={:<5} connected={:<5} has_data={:<5} error={}",
            page.name(),
            readiness.is_ready(),
            connection.is_connected(),
            connection.has_data(),
            connection.error().unwrap_or("-"),
        );

        if page == PageType::Homepage {
            let update = probe
                .probe_update(&driver, &Locator::css(vigil_probe::hooks::STAT_CARD), &opts, true)
                .await?;
            println!("           live update: {}", serde_json::to_string(&update)?);
        }
    }

    driver.close().await?;
    Ok(())
}
