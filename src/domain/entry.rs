//! Log entry rendering.
//!
//! Rendering happens exactly once, in the router, before fan-out. Transports
//! receive the finished line and never re-parse it.

use super::level::Level;
use chrono::{DateTime, SecondsFormat, Utc};

/// A single loggable value: plain text or structured data.
///
/// Formatting dispatches on the tag: text is rendered verbatim, structured
/// values are pretty-printed JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Text(String),
    Structured(serde_json::Value),
}

impl LogValue {
    pub fn render(&self) -> String {
        match self {
            LogValue::Text(s) => s.clone(),
            LogValue::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Text(s.to_owned())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Text(s)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(v: serde_json::Value) -> Self {
        LogValue::Structured(v)
    }
}

/// Renders a single-line, tab-delimited entry:
/// `<RFC 3339 timestamp> TAB <UPPERCASE level> TAB <space-joined values>`.
pub fn format_entry(level: Level, values: &[LogValue], at: DateTime<Utc>) -> String {
    let rendered: Vec<String> = values.iter().map(LogValue::render).collect();
    format!(
        "{}\t{}\t{}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        level.tag(),
        rendered.join(" ")
    )
}
