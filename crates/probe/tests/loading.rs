mod common;

use common::page;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use vigil_parser::SnapshotDriver;
use vigil_probe::{BrowserKind, LoadingState, PollOptions, ReadinessProbe};

#[tokio::test(start_paused = true)]
async fn no_indicator_returns_after_detection_window() {
    let driver = SnapshotDriver::from_html(page("<h1>DigiByte Blockchain Nodes</h1>"));
    let probe = ReadinessProbe::default();
    let opts = PollOptions::from_millis(30_000, BrowserKind::Webkit);

    let start = Instant::now();
    let state = probe.wait_for_loading(&driver, &opts).await.unwrap();

    assert_eq!(state, LoadingState::AlreadyLoaded);
    assert!(start.elapsed() <= Duration::from_millis(1100), "took {:?}", start.elapsed());
}

#[tokio::test(start_paused = true)]
async fn hidden_indicator_does_not_count() {
    let driver = SnapshotDriver::from_html(page(
        r#"<div hidden>Loading...</div><div role="progressbar" style="display:none"></div>"#,
    ));
    let probe = ReadinessProbe::default();
    let opts = PollOptions::from_millis(5_000, BrowserKind::Chromium);

    let state = probe.wait_for_loading(&driver, &opts).await.unwrap();
    assert_eq!(state, LoadingState::AlreadyLoaded);
}

#[tokio::test(start_paused = true)]
async fn waits_for_indicator_then_stabilizes() {
    let driver = SnapshotDriver::from_html(page(r#"<p>Loading blocks...</p>"#));
    let handle = driver.handle();
    tokio::spawn(async move {
        sleep(Duration::from_millis(700)).await;
        handle.replace(page(r#"<a href="/block/1">1</a>"#));
    });

    let probe = ReadinessProbe::default();
    let opts = PollOptions::from_millis(5_000, BrowserKind::Webkit);

    let state = probe.wait_for_loading(&driver, &opts).await.unwrap();
    let LoadingState::Cleared { after } = state else {
        panic!("expected the indicator to clear, got {:?}", state);
    };
    // 700ms until the swap plus webkit's 300ms stabilization delay
    assert!(after >= Duration::from_millis(1000), "cleared after {:?}", after);
    assert!(after < Duration::from_millis(1200), "cleared after {:?}", after);
}

#[tokio::test(start_paused = true)]
async fn stuck_indicator_times_out_on_scaled_budget() {
    let driver = SnapshotDriver::from_html(page(
        r#"<span class="MuiCircularProgress-root"></span><p>Connecting to network</p>"#,
    ));
    let probe = ReadinessProbe::default();
    let opts = PollOptions::from_millis(1_000, BrowserKind::Firefox);

    let start = Instant::now();
    let err = probe.wait_for_loading(&driver, &opts).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.context["browser"], "firefox");
    // firefox stretches 1000ms to 1300ms
    assert!(start.elapsed() >= Duration::from_millis(1300));
    assert!(start.elapsed() < Duration::from_millis(1500));
}
