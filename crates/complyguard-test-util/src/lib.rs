//! Shared test utilities for the complyguard workspace.
//!
//! The CLI integration tests and the BDD harness both compare emitted reports,
//! so normalization lives in a regular (non-`cfg(test)`) crate.

use serde_json::Value;

/// Normalize non-deterministic JSON fields for report comparison.
///
/// - `tool.version` becomes `"__VERSION__"`, only when the root object is a
///   report envelope (`schema`, `tool`, `run`, `verdict`, `findings`).
/// - `started_at` / `ended_at` become `"__TIMESTAMP__"` and `duration_ms`
///   becomes `0`, at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "run", "verdict", "findings"]
            .iter()
            .all(|key| obj.contains_key(*key));
        if is_envelope
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert(
                "version".to_string(),
                Value::String("__VERSION__".to_string()),
            );
        }
    }
    normalize_timestamps_recursive(&mut value);
    value
}

fn normalize_timestamps_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "ended_at"] {
                if map.contains_key(key) {
                    map.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
                }
            }
            if map.contains_key("duration_ms") {
                map.insert("duration_ms".to_string(), Value::Number(0.into()));
            }
            for val in map.values_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        _ => {}
    }
}

/// Rule ids of the findings in a report, in emitted order.
pub fn finding_rule_ids(report: &Value) -> Vec<String> {
    report["findings"]
        .as_array()
        .map(|findings| {
            findings
                .iter()
                .filter_map(|f| f["rule_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
