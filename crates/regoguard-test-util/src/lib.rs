//! Shared test utilities for the regoguard workspace.
//!
//! Lives in its own crate because `xtask` needs `normalize_nondeterministic` outside
//! `#[cfg(test)]`.

use serde_json::Value;

pub const VERSION_PLACEHOLDER: &str = "__VERSION__";
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";

const ENVELOPE_KEYS: [&str; 5] = ["schema", "tool", "verdict", "findings", "data"];
const TIMESTAMP_KEYS: [&str; 2] = ["started_at", "finished_at"];

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// `tool.version` is replaced only on a root object shaped like a report envelope, so
/// finding payloads that happen to carry a `tool` key are left alone. Timestamp keys are
/// replaced at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut()
        && ENVELOPE_KEYS.iter().all(|k| obj.contains_key(*k))
        && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
        && tool.contains_key("version")
    {
        tool.insert(
            "version".to_string(),
            Value::String(VERSION_PLACEHOLDER.to_string()),
        );
    }
    normalize_timestamps(&mut value);
    value
}

fn normalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in TIMESTAMP_KEYS {
                if let Some(v) = map.get_mut(key) {
                    *v = Value::String(TIMESTAMP_PLACEHOLDER.to_string());
                }
            }
            map.values_mut().for_each(normalize_timestamps);
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}
