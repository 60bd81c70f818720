use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One step in a workflow graph.
///
/// `kind` selects the instruction generator during compilation; `data.settings`
/// supplies its parameters (selectors, URLs, table names, port lists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    /// Read a string setting, falling back to the given default.
    pub fn str_setting<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.data
            .settings
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
    }

    /// Read a numeric setting, falling back to the given default.
    pub fn num_setting(&self, key: &str, default: f64) -> f64 {
        self.data
            .settings
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }

    /// Read a boolean setting, falling back to the given default.
    pub fn bool_setting(&self, key: &str, default: bool) -> bool {
        self.data
            .settings
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Read an array setting, falling back to empty.
    pub fn array_setting(&self, key: &str) -> &[Value] {
        self.data
            .settings
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Node payload as stored on the canvas: a label plus free-form settings.
///
/// Settings use an ordered map so serializing a workflow is reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
}
