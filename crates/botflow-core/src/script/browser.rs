//! Instruction generators for browser interaction nodes.
//!
//! Fragments target the executor's page handle bound to the resolved CDP
//! endpoint. Selectors wait for visibility before acting.

use super::js_str;
use crate::models::Node;

const DEFAULT_TIMEOUT_MS: f64 = 10000.0;

pub(super) fn navigate(node: &Node) -> String {
    let url = js_str(node.str_setting("url", ""));
    format!("await page.goto({url}, {{ waitUntil: \"load\" }});")
}

pub(super) fn click(node: &Node) -> String {
    let selector = js_str(node.str_setting("selector", ""));
    let timeout = node.num_setting("timeout", DEFAULT_TIMEOUT_MS) as u64;
    format!(
        "const locator = page.locator({selector}).first();\n\
         await locator.waitFor({{ state: \"visible\", timeout: {timeout} }});\n\
         await locator.click({{ timeout: {timeout} }});"
    )
}

pub(super) fn type_text(node: &Node) -> String {
    let selector = js_str(node.str_setting("selector", ""));
    let text = js_str(node.str_setting("text", ""));
    let timeout = node.num_setting("timeout", DEFAULT_TIMEOUT_MS) as u64;
    format!(
        "const locator = page.locator({selector}).first();\n\
         await locator.waitFor({{ state: \"visible\", timeout: {timeout} }});\n\
         await locator.fill({text}, {{ timeout: {timeout} }});"
    )
}

pub(super) fn wait(node: &Node) -> String {
    let duration = node.num_setting("duration", 1000.0) as u64;
    format!("await sleep({duration});")
}

pub(super) fn extract_text(node: &Node) -> String {
    let selector = js_str(node.str_setting("selector", ""));
    let node_id = js_str(&node.id);
    format!(
        "const locator = page.locator({selector}).first();\n\
         const value = await locator.textContent();\n\
         ctx.nodeOutputs[{node_id}] = {{ value }};"
    )
}
