pub mod dom;
pub mod fault;
pub mod wait;

use serde_json::{Value, json};
use vigil_core::Locator;

pub fn build_js_call(func: &str, args: &[Value]) -> String {
    let args_str = args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})({})", func, args_str)
}

fn locator_args(locator: &Locator) -> [Value; 2] {
    match locator {
        Locator::Css(s) => [json!("css"), json!(s)],
        Locator::Text(t) => [json!("text"), json!(t)],
        Locator::Role(r) => [json!("role"), json!(r)],
    }
}

/// Resolve `locator` in the page and hand the element array to `op`.
pub fn build_locator_call(op: &str, locator: &Locator) -> String {
    let elements = build_js_call(dom::RESOLVE, &locator_args(locator));
    format!("({})({})", op, elements)
}
