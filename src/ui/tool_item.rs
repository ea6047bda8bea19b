use serde_json::Value;

use crate::activity::adapters::ToolIcon;
use crate::models::activity::{ToolCallRecord, ToolCallStatus};

const ARG_VALUE_MAX_CHARS: usize = 40;
const ARGS_SHOWN: usize = 2;

pub fn truncate_chars(text: &str, max: usize, marker: &str) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str(marker);
    out
}

/// Prominent key argument, cut at `max_chars` with an ellipsis.
pub fn display_key_argument(key_argument: &str, max_chars: usize) -> String {
    truncate_chars(key_argument, max_chars, "…")
}

/// `key: value` pairs of the first two args; long values are cut at 40 chars.
pub fn args_summary(args: &Value) -> String {
    let Some(map) = args.as_object() else {
        return String::new();
    };
    map.iter()
        .take(ARGS_SHOWN)
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{key}: {}", truncate_chars(&text, ARG_VALUE_MAX_CHARS, "..."))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn status_label(record: &ToolCallRecord) -> String {
    match record.status {
        ToolCallStatus::Executing => "Running...".to_string(),
        ToolCallStatus::Complete => match record.duration_ms {
            Some(ms) => format!("✓ {:.1}s", ms as f64 / 1000.0),
            None => "✓".to_string(),
        },
        ToolCallStatus::Error => "✗".to_string(),
    }
}

pub fn render_tool_item(record: &ToolCallRecord, icon: ToolIcon, key_argument_max_chars: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} [{}]",
        icon.glyph(),
        record.display_name,
        status_label(record)
    )];

    if let Some(key) = record.key_argument.as_deref().filter(|k| !k.is_empty()) {
        lines.push(format!("  {}", display_key_argument(key, key_argument_max_chars)));
    }

    let summary = args_summary(&record.args);
    if !summary.is_empty() {
        lines.push(format!("  {summary}"));
    }

    match record.status {
        ToolCallStatus::Complete => {
            if let Some(result_summary) = record.result_summary.as_deref() {
                lines.push(format!("  {result_summary}"));
            }
        }
        ToolCallStatus::Error => {
            if let Some(error) = record.error.as_deref() {
                lines.push(format!("  error: {error}"));
            }
        }
        ToolCallStatus::Executing => {}
    }
    lines
}
