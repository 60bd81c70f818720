//! Instruction generators for math nodes.
//!
//! Math nodes carry dynamic input/output port lists in their settings. Each
//! named port binds to a local variable slot in the order the settings array
//! lists them, independent of edge iteration order.

use super::{CompileError, PortBindings, js_ident, js_str};
use crate::models::Node;
use serde_json::Value;

pub(super) fn math_op(
    node: &Node,
    op: &str,
    bindings: &PortBindings<'_>,
) -> Result<String, CompileError> {
    let operator = match op {
        "add" => "+",
        "subtract" => "-",
        "multiply" => "*",
        "divide" => "/",
        _ => {
            return Err(CompileError::UnknownKind {
                node_id: node.id.clone(),
                kind: node.kind.clone(),
            });
        }
    };

    let mut body = String::new();
    let mut slots = Vec::new();

    for (index, input) in node.array_setting("inputs").iter().enumerate() {
        let fallback = format!("in{index}");
        let port_id = port_id(input, &fallback);
        let var = format!("in_{}", js_ident(port_id));

        let expr = match bindings.input_source(&node.id, port_id) {
            Some(source) => format!(
                "Number((ctx.nodeOutputs[{}] ?? {{}}).value ?? 0)",
                js_str(source)
            ),
            None => "0".to_string(),
        };
        body.push_str(&format!("const {var} = {expr};\n"));
        slots.push(var);
    }

    let result = if slots.is_empty() {
        "0".to_string()
    } else {
        slots.join(&format!(" {operator} "))
    };

    let out_port = node
        .array_setting("outputs")
        .first()
        .map(|o| port_id(o, "result").to_string())
        .unwrap_or_else(|| "result".to_string());
    let out_var = format!("out_{}", js_ident(&out_port));

    body.push_str(&format!("const {out_var} = {result};\n"));
    body.push_str(&format!(
        "ctx.nodeOutputs[{}] = {{ value: {out_var} }};",
        js_str(&node.id)
    ));

    Ok(body)
}

fn port_id<'a>(port: &'a Value, fallback: &'a str) -> &'a str {
    port.get("id").and_then(Value::as_str).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::super::tests::make_node;
    use super::*;
    use crate::models::Edge;
    use serde_json::json;

    fn math_node(op: &str) -> Node {
        make_node(
            "m1",
            &format!("math-{op}"),
            json!({
                "inputs": [
                    {"id": "a", "label": "A"},
                    {"id": "b", "label": "B"}
                ],
                "outputs": [{"id": "sum", "label": "Sum"}]
            }),
        )
    }

    fn edge_into(id: &str, source: &str, handle: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: "m1".to_string(),
            source_handle: None,
            target_handle: Some(handle.to_string()),
        }
    }

    #[test]
    fn test_ports_bind_in_settings_order() {
        let node = math_node("add");
        // Edges added in reverse port order; slot order must follow settings.
        let edges = vec![edge_into("e2", "src-b", "b"), edge_into("e1", "src-a", "a")];
        let bindings = PortBindings { edges: &edges };

        let body = math_op(&node, "add", &bindings).unwrap();
        let a_at = body.find("const in_a").unwrap();
        let b_at = body.find("const in_b").unwrap();
        assert!(a_at < b_at);
        assert!(body.contains("ctx.nodeOutputs[\"src-a\"]"));
        assert!(body.contains("ctx.nodeOutputs[\"src-b\"]"));
        assert!(body.contains("const out_sum = in_a + in_b;"));
    }

    #[test]
    fn test_unwired_inputs_default_to_zero() {
        let node = math_node("multiply");
        let bindings = PortBindings { edges: &[] };
        let body = math_op(&node, "multiply", &bindings).unwrap();
        assert!(body.contains("const in_a = 0;"));
        assert!(body.contains("const out_sum = in_a * in_b;"));
    }

    #[test]
    fn test_unknown_operation_fails_compilation() {
        let node = make_node("m1", "math-modulo", json!({}));
        let bindings = PortBindings { edges: &[] };
        let err = math_op(&node, "modulo", &bindings).unwrap_err();
        assert!(matches!(err, CompileError::UnknownKind { .. }));
    }

    #[test]
    fn test_no_ports_still_produces_output() {
        let node = make_node("m1", "math-add", json!({}));
        let bindings = PortBindings { edges: &[] };
        let body = math_op(&node, "add", &bindings).unwrap();
        assert!(body.contains("const out_result = 0;"));
        assert!(body.contains("ctx.nodeOutputs[\"m1\"]"));
    }
}
