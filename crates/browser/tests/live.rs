//! Tests against a real Chromium. Run with `cargo test -p browser -- --ignored`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use browser::{ChromiumDriver, FaultPlan};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vigil_core::{BrowserConfig, BrowserKind, PageDriver, ProbeError};
use vigil_probe::{Locator, PollOptions, ReadinessProbe, WaitOutcome, poll_until};

const NODES_PAGE: &str = r#"<!DOCTYPE html><html><body>
<h1>DigiByte Blockchain Nodes</h1>
<div data-testid="node-stats">Total Nodes 0</div>
<script>
  const ws = new WebSocket('wss://stats.example.invalid/live');
  ws.onerror = () => {
    const banner = document.createElement('div');
    banner.setAttribute('role', 'alert');
    banner.textContent = 'Connection failed';
    document.body.appendChild(banner);
  };
</script>
</body></html>"#;

const SUPPLY_PAGE: &str = r#"<!DOCTYPE html><html><body>
<div class="MuiCard-root"><span id="supply">Loading...</span></div>
<script>
  setTimeout(() => { document.getElementById('supply').textContent = '12,345 DGB'; }, 500);
</script>
</body></html>"#;

fn data_url(html: &str) -> String {
    let encoded = html.replace('%', "%25").replace('#', "%23").replace('\n', "");
    format!("data:text/html,{}", encoded)
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn dom_primitives_match_the_page() -> anyhow::Result<()> {
    let driver = ChromiumDriver::launch(BrowserConfig::default()).await?;
    driver.goto(&data_url(NODES_PAGE)).await?;

    assert_eq!(driver.count(&Locator::css("h1")).await?, 1);
    assert_eq!(
        driver.first_text(&Locator::css(r#"[data-testid="node-stats"]"#)).await?.as_deref(),
        Some("Total Nodes 0")
    );
    assert!(driver.body_text().await?.contains("DigiByte Blockchain Nodes"));
    assert!(!driver.is_visible(&Locator::css("script")).await?);

    driver.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn blocked_live_channel_still_renders_static_heading() -> anyhow::Result<()> {
    let driver = ChromiumDriver::launch(BrowserConfig::default()).await?;
    driver.apply_faults(&FaultPlan::block_live_channel()).await?;
    driver.goto(&data_url(NODES_PAGE)).await?;

    assert!(driver.live_channel_blocked().await?);
    assert!(driver.is_visible(&Locator::text("DigiByte Blockchain Nodes")).await?);

    let probe = ReadinessProbe::default();
    let result = probe
        .report_connection(&driver, &PollOptions::from_millis(3_000, BrowserKind::Chromium))
        .await?;
    assert!(!result.is_connected());

    driver.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn verifier_sees_data_replace_placeholder() -> anyhow::Result<()> {
    let driver = ChromiumDriver::launch(BrowserConfig::default()).await?;
    driver.goto(&data_url(SUPPLY_PAGE)).await?;

    let probe = ReadinessProbe::default();
    let outcome = probe
        .wait_for_data(
            &driver,
            &Locator::css("#supply"),
            &PollOptions::from_millis(5_000, BrowserKind::Chromium).strict(),
        )
        .await?;
    assert_eq!(outcome, WaitOutcome::Satisfied);

    driver.close().await?;
    Ok(())
}

/// A local endpoint that answers every request with `ok` and counts hits.
async fn counting_endpoint() -> anyhow::Result<(String, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/stats.json", listener.local_addr()?);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                )
                .await;
        }
    });
    Ok((url, hits))
}

fn fetching_page(url: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body><p id="status">pending</p><script>
  fetch('{url}')
    .then(() => {{ document.getElementById('status').textContent = 'loaded'; }})
    .catch(() => {{ document.getElementById('status').textContent = 'failed'; }});
</script></body></html>"#
    )
}

async fn fetch_status(driver: &ChromiumDriver) -> anyhow::Result<String> {
    let status = &Locator::css("#status");
    let text = poll_until("fetch status", Duration::from_secs(5), Duration::from_millis(100), move || async move {
        Ok::<_, ProbeError>(driver.first_text(status).await?.filter(|t| t != "pending"))
    })
    .await?;
    Ok(text)
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn blocked_url_never_reaches_the_server() -> anyhow::Result<()> {
    let (url, hits) = counting_endpoint().await?;
    let driver = ChromiumDriver::launch(BrowserConfig::default()).await?;
    driver
        .apply_faults(&FaultPlan::default().with_blocked_url("*/stats.json"))
        .await?;
    driver.goto(&data_url(&fetching_page(&url))).await?;

    assert_eq!(fetch_status(&driver).await?, "failed");
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    driver.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn offline_plan_fails_every_request() -> anyhow::Result<()> {
    let (url, hits) = counting_endpoint().await?;
    let driver = ChromiumDriver::launch(BrowserConfig::default()).await?;
    driver.apply_faults(&FaultPlan::offline()).await?;
    driver.goto(&data_url(&fetching_page(&url))).await?;

    assert_eq!(fetch_status(&driver).await?, "failed");
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    driver.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn close_removes_the_profile_dir() -> anyhow::Result<()> {
    let driver = ChromiumDriver::launch(BrowserConfig::default()).await?;
    let profile = driver.profile_dir().to_path_buf();
    assert!(profile.exists());

    driver.close().await?;
    assert!(!profile.exists());
    Ok(())
}

#[tokio::test]
async fn refuses_other_engines() {
    let config = BrowserConfig {
        browser_kind: BrowserKind::Firefox,
        ..BrowserConfig::default()
    };
    let err = ChromiumDriver::launch(config).await.err().expect("firefox must be rejected");
    assert!(err.message.contains("firefox"));
}
