//! Instruction generators for remote table access nodes.
//!
//! The configured identifier may be a table id or a display name; a UUID
//! pattern check decides which field the request carries (the other is null).

use super::js_str;
use crate::models::Node;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern compiles")
});

/// Split an identifier into (tableId, tableName), exactly one of them set.
fn table_ref(identifier: &str) -> (Value, Value) {
    if UUID_RE.is_match(identifier) {
        (json!(identifier), Value::Null)
    } else {
        (Value::Null, json!(identifier))
    }
}

fn table_request(body: &Value) -> String {
    format!(
        "const response = await fetch(TABLE_API_URL, {{\n\
           method: \"POST\",\n\
           headers: {{ \"Content-Type\": \"application/json\", Authorization: `Bearer ${{TABLE_API_TOKEN}}` }},\n\
           body: JSON.stringify({body}),\n\
         }});"
    )
}

pub(super) fn read_table(node: &Node) -> String {
    let (table_id, table_name) = table_ref(node.str_setting("tableName", ""));
    let body = json!({
        "operation": "get-table",
        "tableId": table_id,
        "tableName": table_name,
        "columnName": node.str_setting("columnName", ""),
        "readMode": node.str_setting("readMode", "sequential"),
    });
    let node_id = js_str(&node.id);
    format!(
        "{request}\n\
         if (!response.ok) {{\n\
           const error = await response.json();\n\
           throw new Error(\"Failed to read from table: \" + (error.error || \"Unknown error\"));\n\
         }}\n\
         const data = await response.json();\n\
         ctx.lastTableRead = data.value;\n\
         ctx.nodeOutputs[{node_id}] = {{ value: data.value }};",
        request = table_request(&body)
    )
}

pub(super) fn write_table(node: &Node) -> String {
    // Payload must be a JSON array. An invalid payload becomes an inline
    // runtime error, not a compiler failure.
    let Some(rows) = parse_rows(node) else {
        return "throw new Error(\"Invalid data format. Data must be valid JSON array\");"
            .to_string();
    };

    let (table_id, table_name) = table_ref(node.str_setting("tableName", ""));
    let tags: Vec<Value> = node.array_setting("tags").to_vec();
    let body = json!({
        "operation": "write-table",
        "tableId": table_id,
        "tableName": table_name,
        "columnName": node.str_setting("columnName", ""),
        "writeMode": node.str_setting("writeMode", "overwrite"),
        "data": rows,
        "tags": tags,
    });
    format!(
        "{request}\n\
         if (!response.ok) {{\n\
           const error = await response.json();\n\
           throw new Error(\"Failed to write to table: \" + (error.error || \"Unknown error\"));\n\
         }}",
        request = table_request(&body)
    )
}

pub(super) fn favorite_table(node: &Node) -> String {
    let (table_id, table_name) = table_ref(node.str_setting("tableName", ""));
    let body = json!({
        "operation": "update-table-meta",
        "tableId": table_id,
        "tableName": table_name,
        "is_favorite": node.bool_setting("isFavorite", false),
    });
    format!(
        "{request}\n\
         if (!response.ok) {{\n\
           const error = await response.json();\n\
           throw new Error(\"Failed to update table favorite status: \" + (error.error || \"Unknown error\"));\n\
         }}",
        request = table_request(&body)
    )
}

/// Accept rows either as an embedded JSON array or as a string containing
/// one. Missing data defaults to an empty array.
fn parse_rows(node: &Node) -> Option<Vec<Value>> {
    match node.data.settings.get("data") {
        None => Some(Vec::new()),
        Some(Value::Array(rows)) => Some(rows.clone()),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|v| v.as_array().cloned()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::make_node;
    use super::*;
    use serde_json::json;

    const UUID: &str = "a1b2c3d4-e5f6-7890-abcd-ef1234567890";

    #[test]
    fn test_uuid_identifier_dispatches_by_id() {
        let node = make_node("n1", "read-table", json!({"tableName": UUID}));
        let body = read_table(&node);
        assert!(body.contains(&format!("\"tableId\":\"{UUID}\"")));
        assert!(body.contains("\"tableName\":null"));
    }

    #[test]
    fn test_uppercase_uuid_still_matches() {
        let upper = UUID.to_uppercase();
        let node = make_node("n1", "read-table", json!({"tableName": upper}));
        let body = read_table(&node);
        assert!(body.contains("\"tableName\":null"));
    }

    #[test]
    fn test_name_identifier_dispatches_by_name() {
        let node = make_node("n1", "read-table", json!({"tableName": "Leads"}));
        let body = read_table(&node);
        assert!(body.contains("\"tableName\":\"Leads\""));
        assert!(body.contains("\"tableId\":null"));
    }

    #[test]
    fn test_read_defaults_to_sequential_mode() {
        let node = make_node("n1", "read-table", json!({"tableName": "Leads"}));
        let body = read_table(&node);
        assert!(body.contains("\"readMode\":\"sequential\""));
        assert!(body.contains("ctx.nodeOutputs[\"n1\"]"));
    }

    #[test]
    fn test_write_defaults_overwrite_and_empty_tags() {
        let node = make_node("n1", "write-table", json!({"tableName": "Leads"}));
        let body = write_table(&node);
        assert!(body.contains("\"writeMode\":\"overwrite\""));
        assert!(body.contains("\"tags\":[]"));
        assert!(body.contains("\"data\":[]"));
    }

    #[test]
    fn test_write_accepts_stringified_array() {
        let node = make_node(
            "n1",
            "write-table",
            json!({"tableName": "Leads", "data": "[{\"name\":\"Ada\"}]"}),
        );
        let body = write_table(&node);
        assert!(body.contains("\"data\":[{\"name\":\"Ada\"}]"));
    }

    #[test]
    fn test_write_invalid_payload_becomes_inline_error() {
        let node = make_node(
            "n1",
            "write-table",
            json!({"tableName": "Leads", "data": "{not json"}),
        );
        let body = write_table(&node);
        assert!(body.starts_with("throw new Error(\"Invalid data format"));
    }

    #[test]
    fn test_write_object_payload_is_rejected() {
        let node = make_node(
            "n1",
            "write-table",
            json!({"tableName": "Leads", "data": {"name": "Ada"}}),
        );
        let body = write_table(&node);
        assert!(body.contains("Invalid data format"));
    }

    #[test]
    fn test_favorite_sends_meta_update() {
        let node = make_node(
            "n1",
            "favorite-table",
            json!({"tableName": "Leads", "isFavorite": true}),
        );
        let body = favorite_table(&node);
        assert!(body.contains("\"operation\":\"update-table-meta\""));
        assert!(body.contains("\"is_favorite\":true"));
    }
}
