//! Instruction generator for the generate-person node.
//!
//! Produces a synthetic person record at run time. Name pools are embedded
//! in the fragment so compilation stays deterministic; the draw itself
//! happens remotely.

use super::js_str;
use crate::models::Node;
use serde_json::json;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Oliver", "Emma", "Liam", "Sofia", "Noah", "Ava", "Lucas", "Mia",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Garcia", "Miller", "Davis", "Martinez", "Wilson", "Anderson",
    "Taylor",
];

pub(super) fn generate_person(node: &Node) -> String {
    let first_names = json!(FIRST_NAMES);
    let last_names = json!(LAST_NAMES);
    let domain = js_str(node.str_setting("emailDomain", "example.com"));
    let node_id = js_str(&node.id);

    format!(
        "const firstNames = {first_names};\n\
         const lastNames = {last_names};\n\
         const pick = (list) => list[Math.floor(Math.random() * list.length)];\n\
         const firstName = pick(firstNames);\n\
         const lastName = pick(lastNames);\n\
         const person = {{\n\
           firstName,\n\
           lastName,\n\
           email: `${{firstName}}.${{lastName}}@${{{domain}}}`.toLowerCase(),\n\
           phone: \"+1\" + String(Math.floor(1000000000 + Math.random() * 9000000000)),\n\
         }};\n\
         ctx.nodeOutputs[{node_id}] = {{ value: person }};"
    )
}
