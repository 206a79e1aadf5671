use crate::capabilities::{ConnectorConfigSchema, Field, FieldType};
use crate::error::ConnectorError;
use crate::shorts::format_timestamp;
use crate::utils::{clean_html_entities, extract_video_id, input_schema, structured_result_with_text};
use crate::{auth::AuthDetails, Connector};
use async_trait::async_trait;
use rmcp::model::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::{debug, warn};
use yt_transcript_rs::YouTubeTranscriptApi;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptInput {
    /// The YouTube video ID (e.g., 'dQw4w9WgXcQ') or full URL
    pub video_id: String,
    /// Preferred transcript language code; defaults to the configured language
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchTranscriptInput {
    /// The YouTube video ID or full URL
    pub video_id: String,
    /// Text to look for (case-insensitive)
    pub query: String,
    /// Preferred transcript language code; defaults to the configured language
    #[serde(default)]
    pub language: Option<String>,
}

/// One caption line, with times in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptPart {
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimestampedPart {
    /// Start rendered as `M:SS`.
    pub timestamp: String,
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

/// Parts whose text contains `query`, ignoring case.
pub fn search_parts<'a>(parts: &'a [TranscriptPart], query: &str) -> Vec<&'a TranscriptPart> {
    let needle = query.to_lowercase();
    parts
        .iter()
        .filter(|p| p.text.to_lowercase().contains(&needle))
        .collect()
}

pub fn timestamp_parts(parts: &[TranscriptPart]) -> Vec<TimestampedPart> {
    parts
        .iter()
        .map(|p| TimestampedPart {
            timestamp: format_timestamp(p.start_ms / 1000),
            text: p.text.clone(),
            start_ms: p.start_ms,
            duration_ms: p.duration_ms,
        })
        .collect()
}

pub fn join_parts(parts: &[TranscriptPart]) -> String {
    parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Caption tracks scraped from the watch page; no API key needed.
pub struct TranscriptConnector {
    language: String,
}

impl TranscriptConnector {
    pub async fn new(auth: AuthDetails) -> Result<Self, ConnectorError> {
        let mut connector = TranscriptConnector {
            language: DEFAULT_LANGUAGE.to_string(),
        };
        connector.set_auth_details(auth).await?;
        Ok(connector)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    async fn fetch_parts(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> Result<(String, Vec<TranscriptPart>), ConnectorError> {
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.language)
            .to_string();

        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| ConnectorError::Other(e.to_string()))?;
        let fetched = api
            .fetch_transcript(video_id, &[language.as_str()], false)
            .await
            .map_err(|e| {
                warn!(error = %e, video_id = %video_id, "Failed to fetch YouTube transcript");
                ConnectorError::Other(format!("Transcript unavailable for {}: {}", video_id, e))
            })?;

        let parts: Vec<TranscriptPart> = fetched
            .parts()
            .iter()
            .map(|p| TranscriptPart {
                text: clean_html_entities(&p.text).replace('\n', " "),
                start_ms: secs_to_ms(p.start),
                duration_ms: secs_to_ms(p.duration),
            })
            .collect();
        debug!(video_id, parts = parts.len(), language = %language, "Fetched transcript");
        Ok((language, parts))
    }

    fn tool<T: JsonSchema>(name: &'static str, description: &'static str) -> Result<Tool, ConnectorError> {
        Ok(Tool {
            name: Cow::Borrowed(name),
            title: None,
            description: Some(Cow::Borrowed(description)),
            input_schema: input_schema::<T>()?,
            output_schema: None,
            annotations: None,
            icons: None,
        })
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    args: Option<serde_json::Map<String, Value>>,
) -> Result<T, ConnectorError> {
    serde_json::from_value(Value::Object(args.unwrap_or_default()))
        .map_err(|e| ConnectorError::InvalidParams(e.to_string()))
}

#[async_trait]
impl Connector for TranscriptConnector {
    fn name(&self) -> &'static str {
        "transcripts"
    }

    fn description(&self) -> &'static str {
        "YouTube video transcripts: full text, search, and timestamped lines."
    }

    async fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            tools: None,
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError> {
        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.capabilities().await,
            server_info: Implementation {
                name: self.name().to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Fetch transcripts by video id; search_transcript finds the moments a phrase is spoken."
                    .to_string(),
            ),
        })
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let tools = vec![
            Self::tool::<TranscriptInput>(
                "get_transcript",
                "Get the full transcript of a video as plain text plus its caption lines.",
            )?,
            Self::tool::<SearchTranscriptInput>(
                "search_transcript",
                "Find transcript lines containing a phrase (case-insensitive). Returns matches and the total count.",
            )?,
            Self::tool::<TranscriptInput>(
                "get_timestamped_transcript",
                "Get transcript lines with M:SS timestamps and start/duration in milliseconds.",
            )?,
        ];
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let name = request.name.as_ref();
        let args = request.arguments;

        match name {
            "get_transcript" => {
                let input: TranscriptInput = parse_args(args)?;
                let video_id = extract_video_id(&input.video_id);
                let (language, parts) =
                    self.fetch_parts(&video_id, input.language.as_deref()).await?;
                let data = json!({
                    "video_id": video_id,
                    "language": language,
                    "text": join_parts(&parts),
                    "parts": parts,
                });
                structured_result_with_text(&data, None)
            }
            "search_transcript" => {
                let input: SearchTranscriptInput = parse_args(args)?;
                if input.query.trim().is_empty() {
                    return Err(ConnectorError::InvalidParams(
                        "query must not be empty".to_string(),
                    ));
                }
                let video_id = extract_video_id(&input.video_id);
                let (language, parts) =
                    self.fetch_parts(&video_id, input.language.as_deref()).await?;
                let matches = timestamp_parts(
                    &search_parts(&parts, &input.query)
                        .into_iter()
                        .cloned()
                        .collect::<Vec<_>>(),
                );
                let data = json!({
                    "video_id": video_id,
                    "language": language,
                    "query": input.query,
                    "total": matches.len(),
                    "matches": matches,
                });
                structured_result_with_text(&data, None)
            }
            "get_timestamped_transcript" => {
                let input: TranscriptInput = parse_args(args)?;
                let video_id = extract_video_id(&input.video_id);
                let (language, parts) =
                    self.fetch_parts(&video_id, input.language.as_deref()).await?;
                let data = json!({
                    "video_id": video_id,
                    "language": language,
                    "parts": timestamp_parts(&parts),
                });
                structured_result_with_text(&data, None)
            }
            _ => Err(ConnectorError::ToolNotFound),
        }
    }

    async fn get_auth_details(&self) -> Result<AuthDetails, ConnectorError> {
        let mut details = AuthDetails::new();
        details.insert("language".into(), self.language.clone());
        Ok(details)
    }

    async fn set_auth_details(&mut self, details: AuthDetails) -> Result<(), ConnectorError> {
        self.language = details
            .get("language")
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        Ok(())
    }

    async fn test_auth(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn config_schema(&self) -> ConnectorConfigSchema {
        ConnectorConfigSchema {
            fields: vec![Field::new("language", "Transcript Language", FieldType::Text)
                .describe("Default language code, e.g. 'en' (YOUTUBE_TRANSCRIPT_LANG)")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(text: &str, start_ms: u64) -> TranscriptPart {
        TranscriptPart {
            text: text.to_string(),
            start_ms,
            duration_ms: 2500,
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let parts = vec![
            part("Welcome back", 0),
            part("the BIG reveal", 61_000),
            part("nothing here", 90_000),
            part("a big finish", 3_725_000),
        ];
        let found = search_parts(&parts, "Big");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].start_ms, 61_000);
        assert!(search_parts(&parts, "missing").is_empty());
    }

    #[test]
    fn timestamps_use_minutes_and_seconds() {
        let stamped = timestamp_parts(&[part("a", 61_500), part("b", 3_725_000)]);
        assert_eq!(stamped[0].timestamp, "1:01");
        assert_eq!(stamped[0].duration_ms, 2500);
        assert_eq!(stamped[1].timestamp, "1:02:05");
    }

    #[test]
    fn seconds_convert_to_millis() {
        assert_eq!(secs_to_ms(1.2345), 1235);
        assert_eq!(secs_to_ms(-1.0), 0);
        assert_eq!(secs_to_ms(f64::NAN), 0);
    }

    #[tokio::test]
    async fn language_defaults_and_overrides() {
        let connector = TranscriptConnector::new(AuthDetails::new()).await.unwrap();
        assert_eq!(connector.language(), "en");

        let mut auth = AuthDetails::new();
        auth.insert("language".into(), "de".into());
        let connector = TranscriptConnector::new(auth).await.unwrap();
        assert_eq!(connector.language(), "de");
        assert!(!connector.config_schema().requires_auth());
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let connector = TranscriptConnector::new(AuthDetails::new()).await.unwrap();
        let err = connector
            .call_tool(CallToolRequestParam {
                name: "search_transcript".into(),
                arguments: json!({"video_id": "abc", "query": "  "}).as_object().cloned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidParams(_)));
    }
}
