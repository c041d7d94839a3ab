//! Shared test utilities for the aare workspace.

use serde_json::Value;

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// Root-only: `verification_id`, `timestamp`, `execution_time_ms` and `tool.version` are replaced
/// only when the root object looks like a verification report (has `schema`, `tool`,
/// `verification_id` and `proof`). Nested objects that share a key name are left alone, so a
/// parsed variable called `timestamp` keeps its value.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    let is_report = obj.contains_key("schema")
        && obj.contains_key("tool")
        && obj.contains_key("verification_id")
        && obj.contains_key("proof");
    if !is_report {
        return value;
    }

    obj.insert(
        "verification_id".to_string(),
        Value::String("__ID__".to_string()),
    );
    if obj.contains_key("timestamp") {
        obj.insert(
            "timestamp".to_string(),
            Value::String("__TIMESTAMP__".to_string()),
        );
    }
    if obj.contains_key("execution_time_ms") {
        obj.insert("execution_time_ms".to_string(), Value::Number(0.into()));
    }
    if let Some(tool) = obj.get_mut("tool")
        && let Some(tool_obj) = tool.as_object_mut()
        && tool_obj.contains_key("version")
    {
        tool_obj.insert(
            "version".to_string(),
            Value::String("__VERSION__".to_string()),
        );
    }
    value
}
