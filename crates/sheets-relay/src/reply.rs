//! Interpretation of webhook responses.

use serde_json::Value;

/// Shown when the workflow succeeds but returns nothing readable.
pub const EMPTY_REPLY_PLACEHOLDER: &str =
    "\u{2728} Processing completed successfully! Your request was processed but no specific response was returned.";

/// JSON fields probed for a human-readable reply, in priority order.
pub const DEFAULT_RESPONSE_FIELDS: [&str; 4] = ["response", "message", "data", "result"];

/// Turn a successful response body into the text of a relay record.
///
/// JSON bodies (by declared content type) are searched for the first truthy
/// field in `fields`; without a match the whole payload is pretty-printed.
/// Anything else, including JSON that fails to parse, is used as raw text.
pub fn interpret(content_type: Option<&str>, body: &[u8], fields: &[String]) -> String {
    let raw = String::from_utf8_lossy(body);

    let text = if content_type.is_some_and(is_json) {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => extract(&payload, fields),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON reply, using raw text");
                raw.into_owned()
            }
        }
    } else {
        raw.into_owned()
    };

    if text.trim().is_empty() {
        EMPTY_REPLY_PLACEHOLDER.to_string()
    } else {
        text
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn extract(payload: &Value, fields: &[String]) -> String {
    if let Value::Object(map) = payload {
        let hit = fields
            .iter()
            .filter_map(|field| map.get(field))
            .find(|value| is_truthy(value));
        if let Some(value) = hit {
            return render(value);
        }
    }
    pretty(payload)
}

/// Null, false, zero and empty strings do not count as a reply.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => pretty(other),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
