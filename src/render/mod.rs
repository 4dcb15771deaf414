//! Self-contained HTML documents for the map and the tables.

pub mod map;
pub mod table;

use anyhow::Result;
use serde::Serialize;

/// Escapes text for HTML element content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serializes `value` for embedding in a `<script>` element.
///
/// `</` is written as `<\/` so text such as `</script>` inside a string
/// cannot close the element early.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
