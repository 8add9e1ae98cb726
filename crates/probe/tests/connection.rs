mod common;

use common::page;
use vigil_core::PageDriver;
use vigil_parser::SnapshotDriver;
use vigil_probe::{BrowserKind, Locator, PollOptions, ReadinessProbe, ReadinessResult};

fn opts() -> PollOptions {
    PollOptions::from_millis(1_000, BrowserKind::Chromium)
}

#[tokio::test(start_paused = true)]
async fn healthy_page_is_connected_with_data() {
    let driver = SnapshotDriver::from_html(page(
        r#"<div class="MuiCard-root">Active Nodes 312</div><svg data-testid="pool-chart"><path d="M0 0"/></svg>"#,
    ));
    let result = ReadinessProbe::default()
        .report_connection(&driver, &opts())
        .await
        .unwrap();
    assert_eq!(result, ReadinessResult::connected(true));
}

#[tokio::test(start_paused = true)]
async fn empty_page_is_connected_without_data() {
    let driver = SnapshotDriver::from_html(page("<h1>DigiByte Supply</h1>"));
    let result = ReadinessProbe::default()
        .report_connection(&driver, &opts())
        .await
        .unwrap();
    assert!(result.is_connected());
    assert!(!result.has_data());
}

#[tokio::test(start_paused = true)]
async fn error_text_disconnects_regardless_of_data() {
    for (body, has_data) in [
        (r#"<p>Server offline</p><ul data-testid="pool-list"><li>cached pool</li></ul>"#, true),
        (r#"<p>Server offline</p>"#, false),
        (r#"<div class="MuiCard-root">12,345</div><p>WebSocket disconnected</p>"#, true),
    ] {
        let driver = SnapshotDriver::from_html(page(body));
        let result = ReadinessProbe::default()
            .report_connection(&driver, &opts())
            .await
            .unwrap();
        assert!(!result.is_connected(), "{body} should report disconnected");
        assert_eq!(result.has_data(), has_data, "{body}");
        assert!(result.error().is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn visible_error_element_reports_its_text() {
    let driver = SnapshotDriver::from_html(page(
        r#"<div data-testid="connection-error">Unable to reach node</div>"#,
    ));
    let result = ReadinessProbe::default()
        .report_connection(&driver, &opts())
        .await
        .unwrap();
    assert_eq!(result.error(), Some("Unable to reach node"));
}

#[tokio::test(start_paused = true)]
async fn hidden_error_element_is_ignored() {
    let driver = SnapshotDriver::from_html(page(
        r#"<div role="alert" hidden></div><div class="MuiCard-root">Nodes 12</div>"#,
    ));
    let result = ReadinessProbe::default()
        .report_connection(&driver, &opts())
        .await
        .unwrap();
    assert_eq!(result, ReadinessResult::connected(true));
}

#[tokio::test(start_paused = true)]
async fn blocked_live_channel_keeps_static_structure() {
    // What the nodes page renders once its WebSocket is refused.
    let driver = SnapshotDriver::from_html(page(
        r#"<h1>DigiByte Blockchain Nodes</h1>
           <div role="alert">WebSocket connection failed</div>
           <div data-testid="node-stats">Total Nodes 0</div>"#,
    ));

    let heading = Locator::text("DigiByte Blockchain Nodes");
    assert!(driver.is_visible(&heading).await.unwrap());

    let result = ReadinessProbe::default()
        .report_connection(&driver, &opts())
        .await
        .unwrap();
    assert!(!result.is_connected());
    assert_eq!(result.error(), Some("WebSocket connection failed"));
}
