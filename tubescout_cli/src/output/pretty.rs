//! Card-style terminal rendering for tool results.
//!
//! Objects holding a result list (videos, comments, transcript parts,
//! segments) print their scalar fields first and then one card per item:
//! a bold title line, a link, a wrapped snippet and a few dimmed metadata
//! fields.

use super::terminal_width;
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

/// Indent for card content (after the index).
const CARD_INDENT: usize = 6;

const MAX_META_FIELDS: usize = 6;

/// Keys that typically hold the result list.
const LIST_KEYS: &[&str] = &[
    "segments",
    "results",
    "items",
    "videos",
    "playlists",
    "comments",
    "matches",
    "parts",
    "data",
];

const TITLE_KEYS: &[&str] = &["title", "name", "label", "timestamp", "author"];

const URL_KEYS: &[&str] = &["url", "source_url", "thumbnail_url"];

const SNIPPET_KEYS: &[&str] = &["text", "description", "snippet"];

/// Metadata fields, most useful first.
const META_KEYS: &[&str] = &[
    "id",
    "video_id",
    "channel_title",
    "published_at",
    "duration_seconds",
    "view_count",
    "like_count",
    "comment_count",
    "reply_count",
    "item_count",
    "subscriber_count",
    "engagement",
    "marker_count",
    "confidence",
    "kind",
    "suggested_effects",
    "start_ms",
    "duration_ms",
];

pub fn format_pretty(value: &Value) -> String {
    let mut output = String::new();
    format_value(value, &mut output, 0);
    output
}

fn format_value(value: &Value, output: &mut String, depth: usize) {
    match value {
        Value::Array(arr) if arr.iter().any(Value::is_object) => {
            output.push_str(&format_cards(arr, None));
        }
        Value::Array(arr) => {
            for item in arr {
                output.push_str(&format!("  {} {}\n", "•".dimmed(), format_scalar(item)));
            }
        }
        Value::Object(obj) => match find_list_in_object(obj) {
            Some((list_key, list)) => {
                let metadata: Vec<_> = obj
                    .iter()
                    .filter(|(k, v)| k.as_str() != list_key && !v.is_array() && !v.is_object())
                    .collect();
                for (key, val) in &metadata {
                    output.push_str(&format!("{}: {}\n", key.dimmed(), format_scalar(val)));
                }
                if !metadata.is_empty() {
                    output.push('\n');
                }
                output.push_str(&format_cards(list, Some(list_key)));
            }
            None => format_object(obj, output, depth),
        },
        _ => output.push_str(&format_scalar(value)),
    }
}

fn format_object(obj: &Map<String, Value>, output: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);

    for (key, value) in obj.iter().filter(|(_, v)| !v.is_array() && !v.is_object()) {
        let formatted_key = if TITLE_KEYS.contains(&key.as_str()) {
            key.bold().to_string()
        } else {
            key.dimmed().to_string()
        };
        let formatted_val = if URL_KEYS.contains(&key.as_str()) {
            format_scalar(value).blue().to_string()
        } else {
            format_scalar(value)
        };
        output.push_str(&format!("{}{}: {}\n", indent, formatted_key, formatted_val));
    }

    for (key, value) in obj {
        match value {
            Value::Array(arr) => {
                output.push_str(&format!(
                    "{}{} ({} items):\n",
                    indent,
                    key.cyan().bold(),
                    arr.len()
                ));
                for item in arr {
                    if item.is_object() {
                        output.push_str(&format_card(item, 0, terminal_width()));
                    } else {
                        output.push_str(&format!("{}  {} {}\n", indent, "•".dimmed(), format_scalar(item)));
                    }
                }
            }
            Value::Object(nested) => {
                output.push_str(&format!("{}{}:\n", indent, key.cyan().bold()));
                format_object(nested, output, depth + 1);
            }
            _ => {}
        }
    }
}

fn format_cards(items: &[Value], label: Option<&str>) -> String {
    let width = terminal_width();
    let mut output = String::new();

    if let Some(label) = label {
        output.push_str(&format_section_header(label, items.len(), width));
        output.push('\n');
    }

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format_card(item, i + 1, width));
    }
    output
}

fn format_card(item: &Value, index: usize, width: usize) -> String {
    let mut output = String::new();
    let index_str = if index > 0 {
        format!(" {:>3}. ", index).cyan().bold().to_string()
    } else {
        " ".repeat(CARD_INDENT)
    };

    let Some(obj) = item.as_object() else {
        output.push_str(&format!("{}{}\n", index_str, format_scalar(item)));
        return output;
    };

    let title = find_field(obj, TITLE_KEYS)
        .or_else(|| obj.values().find_map(|v| v.as_str().map(str::to_string)))
        .unwrap_or_else(|| "(untitled)".to_string());
    output.push_str(&format!("{}{}\n", index_str, title.bold()));

    let pad = " ".repeat(CARD_INDENT);
    if let Some(url) = find_field(obj, URL_KEYS) {
        output.push_str(&format!("{}{}\n", pad, url.blue()));
    }

    if let Some(snippet) = find_field(obj, SNIPPET_KEYS).filter(|s| Some(s) != Some(&title)) {
        let clean = snippet.replace(['\n', '\r'], " ");
        let wrap_width = width.saturating_sub(CARD_INDENT + 2).max(20);
        for line in textwrap::wrap(clean.trim(), wrap_width) {
            output.push_str(&format!("{}{}\n", pad, line.dimmed()));
        }
    }

    for (key, value) in extract_meta_fields(obj).into_iter().take(MAX_META_FIELDS) {
        output.push_str(&format!("{}{}: {}\n", pad, key.dimmed(), value.dimmed()));
    }

    output
}

fn find_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

fn extract_meta_fields(obj: &Map<String, Value>) -> Vec<(String, String)> {
    META_KEYS
        .iter()
        .filter_map(|key| {
            let formatted = match obj.get(*key)? {
                // ISO timestamps: date only
                Value::String(s) if s.len() > 10 && s.contains('T') => {
                    s.split('T').next().unwrap_or(s).to_string()
                }
                Value::String(s) if !s.is_empty() => s.clone(),
                Value::Number(n) => match n.as_f64() {
                    Some(f) if n.is_f64() => format!("{:.2}", f),
                    _ => n.to_string(),
                },
                Value::Array(arr) => arr
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => return None,
            };
            (!formatted.is_empty()).then(|| (key.to_string(), formatted))
        })
        .collect()
}

fn format_section_header(label: &str, count: usize, width: usize) -> String {
    let header_text = format!("{} ({})", label, count);
    let line_len = width.saturating_sub(header_text.len() + 4).min(60);
    format!(
        "{} {} {}",
        "──".cyan(),
        header_text.green().bold(),
        "─".repeat(line_len).cyan()
    )
}

fn find_list_in_object(obj: &Map<String, Value>) -> Option<(&str, &Vec<Value>)> {
    LIST_KEYS
        .iter()
        .find_map(|key| match obj.get(*key) {
            Some(Value::Array(arr)) if !arr.is_empty() => Some((*key, arr)),
            _ => None,
        })
        .or_else(|| {
            obj.iter().find_map(|(key, value)| match value {
                Value::Array(arr) if arr.iter().any(Value::is_object) => Some((key.as_str(), arr)),
                _ => None,
            })
        })
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".dimmed().to_string(),
        Value::Bool(true) => "true".green().to_string(),
        Value::Bool(false) => "false".red().to_string(),
        Value::Number(n) => n.yellow().to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{}...}}", obj.len()),
    }
}
