//! Workflow graph -> executable script compilation.
//!
//! Each node kind maps to a pure generator that emits a self-contained
//! instruction fragment. Fragments share a per-run `ctx.nodeOutputs` table
//! for cross-node data passing; the table lives in the script prologue, so
//! nothing leaks between runs. Compiling the same graph twice yields
//! byte-identical script text.

mod browser;
mod math;
mod person;
mod table;

use crate::models::{Edge, Node};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown node type `{kind}` on node {node_id}")]
    UnknownKind { node_id: String, kind: String },
    #[error("duplicate node id `{node_id}` in workflow graph")]
    DuplicateNodeId { node_id: String },
}

/// The compiled, executable instruction sequence for one workflow run.
/// Produced fresh per execution; never persisted.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub text: String,
    pub node_count: usize,
}

/// Instruction kinds the compiler understands. Unknown kinds fail
/// compilation with the offending node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Navigate,
    Click,
    Type,
    Wait,
    ExtractText,
    ReadTable,
    WriteTable,
    FavoriteTable,
    GeneratePerson,
    Math(String),
}

impl NodeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        if let Some(op) = kind.strip_prefix("math-") {
            return Some(NodeKind::Math(op.to_string()));
        }
        match kind {
            "navigate" => Some(NodeKind::Navigate),
            "click" => Some(NodeKind::Click),
            "type" => Some(NodeKind::Type),
            "wait" => Some(NodeKind::Wait),
            "extract-text" => Some(NodeKind::ExtractText),
            "read-table" => Some(NodeKind::ReadTable),
            "write-table" => Some(NodeKind::WriteTable),
            "favorite-table" => Some(NodeKind::FavoriteTable),
            "generate-person" => Some(NodeKind::GeneratePerson),
            _ => None,
        }
    }
}

/// Resolves which upstream node feeds a named input port.
///
/// When several edges target the same port, the first edge in insertion
/// order wins; port iteration itself always follows the settings array, not
/// edge order.
pub(crate) struct PortBindings<'a> {
    edges: &'a [Edge],
}

impl<'a> PortBindings<'a> {
    fn new(edges: &'a [Edge]) -> Self {
        Self { edges }
    }

    pub(crate) fn input_source(&self, node_id: &str, handle: &str) -> Option<&'a str> {
        self.edges
            .iter()
            .find(|e| e.target == node_id && e.target_handle.as_deref() == Some(handle))
            .map(|e| e.source.as_str())
    }
}

/// Compile a node/edge graph into an ordered instruction sequence.
pub fn compile(nodes: &[Node], edges: &[Edge]) -> Result<CompiledScript, CompileError> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(CompileError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    let bindings = PortBindings::new(edges);
    let mut text = String::from(PROLOGUE);

    for node in nodes {
        let kind = NodeKind::parse(&node.kind).ok_or_else(|| CompileError::UnknownKind {
            node_id: node.id.clone(),
            kind: node.kind.clone(),
        })?;

        let body = match &kind {
            NodeKind::Navigate => browser::navigate(node),
            NodeKind::Click => browser::click(node),
            NodeKind::Type => browser::type_text(node),
            NodeKind::Wait => browser::wait(node),
            NodeKind::ExtractText => browser::extract_text(node),
            NodeKind::ReadTable => table::read_table(node),
            NodeKind::WriteTable => table::write_table(node),
            NodeKind::FavoriteTable => table::favorite_table(node),
            NodeKind::GeneratePerson => person::generate_person(node),
            NodeKind::Math(op) => math::math_op(node, op, &bindings)?,
        };

        text.push_str(&format!("// [{}] {}\n{{\n", node.kind, node.id));
        for line in body.lines() {
            text.push_str("  ");
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("}\n\n");
    }

    text.push_str("return ctx.nodeOutputs;\n");

    Ok(CompiledScript {
        text,
        node_count: nodes.len(),
    })
}

const PROLOGUE: &str = "\
const ctx = { nodeOutputs: {}, lastTableRead: null };
const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));
const TABLE_API_URL = process.env.TABLE_API_URL;
const TABLE_API_TOKEN = process.env.TABLE_API_TOKEN;

";

/// Embed a Rust string as a quoted, escaped JS string literal.
pub(crate) fn js_str(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Reduce a port id to a safe JS identifier suffix.
pub(crate) fn js_ident(value: &str) -> String {
    let mut ident: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident.is_empty() {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeData, Position};
    use serde_json::json;

    pub(super) fn make_node(id: &str, kind: &str, settings: Value) -> Node {
        let settings = settings
            .as_object()
            .map(|m| m.clone().into_iter().collect())
            .unwrap_or_default();
        Node {
            id: id.to_string(),
            kind: kind.to_string(),
            position: Position::default(),
            data: NodeData {
                label: kind.to_string(),
                description: None,
                settings,
            },
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let nodes = vec![
            make_node("n1", "navigate", json!({"url": "https://example.com"})),
            make_node("n2", "click", json!({"selector": "#submit"})),
        ];
        let edges = vec![Edge::new("e1", "n1", "n2")];

        let first = compile(&nodes, &edges).unwrap();
        let second = compile(&nodes, &edges).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.node_count, 2);
    }

    #[test]
    fn test_unknown_kind_names_the_node() {
        let nodes = vec![make_node("n9", "teleport", json!({}))];
        let err = compile(&nodes, &[]).unwrap_err();
        match err {
            CompileError::UnknownKind { node_id, kind } => {
                assert_eq!(node_id, "n9");
                assert_eq!(kind, "teleport");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_node_id_fails() {
        let nodes = vec![
            make_node("n1", "navigate", json!({})),
            make_node("n1", "click", json!({})),
        ];
        let err = compile(&nodes, &[]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::DuplicateNodeId { node_id } if node_id == "n1"
        ));
    }

    #[test]
    fn test_empty_graph_compiles_to_prologue_only() {
        let compiled = compile(&[], &[]).unwrap();
        assert_eq!(compiled.node_count, 0);
        assert!(compiled.text.starts_with("const ctx"));
        assert!(compiled.text.ends_with("return ctx.nodeOutputs;\n"));
    }

    #[test]
    fn test_fragments_appear_in_node_order() {
        let nodes = vec![
            make_node("b", "click", json!({"selector": "#b"})),
            make_node("a", "navigate", json!({"url": "https://a.example"})),
        ];
        let compiled = compile(&nodes, &[]).unwrap();
        let click_at = compiled.text.find("// [click] b").unwrap();
        let nav_at = compiled.text.find("// [navigate] a").unwrap();
        assert!(click_at < nav_at);
    }

    #[test]
    fn test_js_str_escapes_quotes() {
        assert_eq!(js_str("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_js_ident_sanitizes() {
        assert_eq!(js_ident("sum"), "sum");
        assert_eq!(js_ident("out-1"), "out_1");
        assert_eq!(js_ident("9lives"), "_9lives");
        assert_eq!(js_ident(""), "_");
    }
}
