//! Payload normalization for aliased wire fields.
//!
//! The API accepts two names for several fields (`query`/`input`,
//! `mode`/`model`) and returns cost data in two shapes (flat `cost` vs a
//! nested `usage` breakdown). These helpers resolve each pair to one
//! canonical value at the boundary so dual names never reach business logic.

use serde_json::{json, Value};

/// Default error attached to results the service returns without a status.
pub const UNKNOWN_RESULT_ERROR: &str = "Unknown error";

/// Resolve the `query`/`input` alias pair, preferring `query`.
///
/// Returns `None` when neither carries a non-blank value.
pub fn resolve_query(query: Option<&str>, input: Option<&str>) -> Option<String> {
    match (query, input) {
        (Some(q), _) if !q.trim().is_empty() => Some(q.to_string()),
        (_, Some(i)) if !i.trim().is_empty() => Some(i.to_string()),
        _ => None,
    }
}

/// Rewrite the legacy `lite` mode to its current equivalent.
pub fn canonical_mode(mode: &str) -> &str {
    if mode == "lite" {
        "standard"
    } else {
        mode
    }
}

/// Resolve the `mode`/`model` alias pair, preferring `mode` and defaulting
/// to `standard`. The result is always canonical.
pub fn resolve_mode<'a>(mode: Option<&'a str>, model: Option<&'a str>) -> &'a str {
    canonical_mode(mode.or(model).unwrap_or("standard"))
}

/// Infer the missing status discriminator on one content result.
///
/// Presence of both `title` and `content` implies success; anything else is
/// a failure with a default error when the service supplied none.
pub fn normalize_content_result(result: &mut Value) {
    let Some(obj) = result.as_object_mut() else {
        return;
    };
    if obj.contains_key("status") {
        return;
    }
    if obj.contains_key("title") && obj.contains_key("content") {
        obj.insert("status".to_string(), json!("success"));
    } else {
        obj.insert("status".to_string(), json!("failed"));
        obj.entry("error").or_insert_with(|| json!(UNKNOWN_RESULT_ERROR));
    }
}

/// Normalize every entry of a response body's `results` array.
pub fn normalize_content_results(body: &mut Value) {
    if let Some(results) = body.get_mut("results").and_then(Value::as_array_mut) {
        for result in results {
            normalize_content_result(result);
        }
    }
}

/// Reconcile the aliased fields on an inbound batch object.
///
/// Syncs `mode`/`model` in both directions, derives the flat `cost` from
/// `usage.total_cost`, and synthesizes a `usage` breakdown from `cost` so
/// callers written against either shape keep working.
pub fn sync_batch_aliases(batch: &mut Value) {
    let Some(obj) = batch.as_object_mut() else {
        return;
    };

    if obj.contains_key("model") && !obj.contains_key("mode") {
        let model = obj["model"].clone();
        obj.insert("mode".to_string(), model);
    } else if obj.contains_key("mode") && !obj.contains_key("model") {
        let mode = obj["mode"].clone();
        obj.insert("model".to_string(), mode);
    }

    if !obj.contains_key("cost") {
        if let Some(total) = obj.get("usage").and_then(|u| u.get("total_cost")).cloned() {
            obj.insert("cost".to_string(), total);
        }
    }

    if !obj.contains_key("usage") {
        if let Some(cost) = obj.get("cost").and_then(Value::as_f64) {
            obj.insert(
                "usage".to_string(),
                json!({
                    "search_cost": 0.0,
                    "contents_cost": 0.0,
                    "ai_cost": 0.0,
                    "total_cost": cost,
                }),
            );
        }
    }
}
