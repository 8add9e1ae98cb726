use vigil_core::ProbeError;

pub fn to_probe_error(e: impl std::fmt::Display, action: &str) -> ProbeError {
    let s = e.to_string();
    if s.contains("Cannot find context") || s.contains("Execution context was destroyed") {
        ProbeError::context_lost(format!("{} lost its page context: {}", action, s))
    } else if s.contains("timeout") || s.contains("Timeout") {
        ProbeError::timeout_error(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") {
        ProbeError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if s.contains("not found") {
        ProbeError::element_not_found(format!("{}: {}", action, s))
    } else {
        ProbeError::browser_error(format!("{} failed: {}", action, s))
    }
}
