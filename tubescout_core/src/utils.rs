use crate::error::ConnectorError;
use once_cell::sync::Lazy;
use regex::Regex;
use rmcp::model::CallToolResult;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;
use url::Url;

pub fn clean_html_entities(text: &str) -> String {
    let mut cleaned = text.to_string();
    // Transcripts are sometimes double-encoded
    for _ in 0..2 {
        let decoded = html_escape::decode_html_entities(&cleaned).into_owned();
        if decoded == cleaned {
            break;
        }
        cleaned = decoded;
    }

    cleaned
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Accept a video id or any of the usual YouTube URL shapes and return the id.
pub fn extract_video_id(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http") {
        if let Ok(url) = Url::parse(input) {
            // youtube.com/watch?v=VIDEO_ID
            if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
                return v.to_string();
            }

            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).collect())
                .unwrap_or_default();

            // youtu.be/VIDEO_ID
            if url.host_str() == Some("youtu.be") {
                if let Some(id) = segments.first() {
                    return id.to_string();
                }
            }

            // youtube.com/shorts/VIDEO_ID, /embed/VIDEO_ID, /live/VIDEO_ID
            if let [kind, id, ..] = segments.as_slice() {
                if matches!(*kind, "shorts" | "embed" | "live") {
                    return id.to_string();
                }
            }
        }
    }

    input.to_string()
}

static ISO_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?)?$").unwrap()
});

/// Seconds in an ISO-8601 duration such as `PT1H2M3S`. Anything unparsable is 0.
pub fn parse_iso8601_duration(raw: &str) -> u64 {
    let Some(caps) = ISO_DURATION_RE.captures(raw.trim()) else {
        return 0;
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(86_400)
        .saturating_add(part(2).saturating_mul(3600))
        .saturating_add(part(3).saturating_mul(60))
        .saturating_add(part(4))
}

/// Deserialize a count that may arrive as a number, a numeric string, or garbage.
///
/// The Data API sends statistics as strings; malformed or missing values are 0.
pub fn de_lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().map(lenient_u64).unwrap_or(0))
}

pub fn lenient_u64(value: &JsonValue) -> u64 {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

const RESULT_LIST_KEYS: &[&str] = &[
    "results",
    "items",
    "videos",
    "playlists",
    "comments",
    "segments",
    "matches",
    "parts",
    "data",
];

const COUNT_KEYS: &[&str] = &["total_results", "total", "count"];

const QUERY_FIELD_KEYS: &[&str] = &["query", "video_id", "channel_id", "playlist_id"];

fn build_no_results_message(key: &str, query_hint: Option<String>) -> String {
    let label = match key {
        "data" | "results" | "total_results" | "total" | "count" => "results".to_string(),
        other => other.replace('_', " "),
    };

    match query_hint {
        Some(query) => format!("No {} found for \"{}\".", label, query),
        None => format!("No {} found for the requested input.", label),
    }
}

fn maybe_attach_no_results_message(map: &mut JsonMap<String, JsonValue>) -> Option<String> {
    for key in RESULT_LIST_KEYS {
        if let Some(JsonValue::Array(items)) = map.get(*key) {
            if !items.is_empty() {
                return None;
            }
        }
    }

    let query_hint = map
        .iter()
        .find_map(|(key, value)| {
            if QUERY_FIELD_KEYS.iter().any(|candidate| candidate == key) {
                value.as_str().map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty());

    let mut message = RESULT_LIST_KEYS.iter().find_map(|key| match map.get(*key) {
        Some(JsonValue::Array(items)) if items.is_empty() => {
            Some(build_no_results_message(key, query_hint.clone()))
        }
        Some(JsonValue::Null) => Some(build_no_results_message(key, query_hint.clone())),
        _ => None,
    });

    if message.is_none() {
        message = COUNT_KEYS.iter().find_map(|key| {
            (map.get(*key).and_then(JsonValue::as_u64) == Some(0))
                .then(|| build_no_results_message("results", query_hint.clone()))
        });
    }

    if message.is_none() && map.is_empty() {
        message = Some(build_no_results_message("results", query_hint.clone()));
    }

    if let Some(message_text) = message.clone() {
        map.entry("message".to_string())
            .or_insert(JsonValue::String(message_text));
        map.entry("no_results".to_string())
            .or_insert(JsonValue::Bool(true));
    }

    message
}

/// Build a CallToolResult carrying structured JSON, with a text fallback for
/// clients that only read `content`.
pub fn structured_result_with_text<T: Serialize>(
    data: &T,
    text_fallback: Option<String>,
) -> Result<CallToolResult, ConnectorError> {
    let value = serde_json::to_value(data).map_err(|e| ConnectorError::Other(e.to_string()))?;

    // Non-object payloads are wrapped under `data`.
    let mut map: JsonMap<String, JsonValue> = match value {
        JsonValue::Object(m) => m,
        other => {
            let mut m = JsonMap::new();
            m.insert("data".to_string(), other);
            m
        }
    };

    maybe_attach_no_results_message(&mut map);

    let content = text_fallback
        .map(|text| vec![rmcp::model::Content::text(text)])
        .unwrap_or_default();

    Ok(CallToolResult {
        content,
        structured_content: Some(JsonValue::Object(map)),
        is_error: Some(false),
        meta: None,
    })
}

/// JSON Schema of a tool input struct, as the object map `Tool` expects.
pub fn input_schema<T: schemars::JsonSchema>() -> Result<Arc<JsonMap<String, JsonValue>>, ConnectorError> {
    match serde_json::to_value(schemars::schema_for!(T))? {
        JsonValue::Object(map) => Ok(Arc::new(map)),
        _ => Err(ConnectorError::InternalError(
            "Tool input schema is not an object".to_string(),
        )),
    }
}

/// An empty `{"type":"object"}` schema for tools without arguments.
pub fn empty_input_schema() -> Arc<JsonMap<String, JsonValue>> {
    let mut map = JsonMap::new();
    map.insert("type".to_string(), JsonValue::String("object".to_string()));
    map.insert("properties".to_string(), JsonValue::Object(JsonMap::new()));
    Arc::new(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_ids_from_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/abc123XYZ_-"),
            "abc123XYZ_-"
        );
        assert_eq!(extract_video_id(" dQw4w9WgXcQ "), "dQw4w9WgXcQ");
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("P1DT1S"), 86_401);
        assert_eq!(parse_iso8601_duration("P0D"), 0);
        assert_eq!(parse_iso8601_duration("soon"), 0);
    }

    #[test]
    fn lenient_counts() {
        assert_eq!(lenient_u64(&json!(12)), 12);
        assert_eq!(lenient_u64(&json!("3400")), 3400);
        assert_eq!(lenient_u64(&json!("2.0")), 2);
        assert_eq!(lenient_u64(&json!(-4)), 0);
        assert_eq!(lenient_u64(&json!("lots")), 0);
        assert_eq!(lenient_u64(&json!(null)), 0);
    }

    #[test]
    fn empty_segment_lists_get_a_message() {
        let result = structured_result_with_text(
            &json!({"video_id": "abc", "segments": []}),
            None,
        )
        .unwrap();
        let body = result.structured_content.unwrap();
        assert_eq!(body["no_results"], true);
        assert_eq!(body["message"], "No segments found for \"abc\".");
        assert!(result.content.is_empty());
    }

    #[test]
    fn non_empty_results_are_left_alone() {
        let result =
            structured_result_with_text(&json!({"items": [1]}), Some("1 item".into())).unwrap();
        let body = result.structured_content.unwrap();
        assert!(body.get("no_results").is_none());
        assert_eq!(result.content.len(), 1);
    }
}
