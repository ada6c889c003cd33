//! JSON rendering of whole reports.

use serde::Serialize;

/// Pretty JSON, or single-line when `compact`.
pub fn to_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}
