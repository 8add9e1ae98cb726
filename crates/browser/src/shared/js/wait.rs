/// Document state plus resources still in flight, for the page-stability wait.
pub const PAGE_ACTIVITY: &str = r#"
() => ({
    readyState: document.readyState,
    pendingResources: performance.getEntriesByType('resource').filter(r => !r.responseEnd).length,
    url: location.href
})
"#;
