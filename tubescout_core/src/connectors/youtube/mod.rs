pub mod client;
pub mod types;

use crate::capabilities::{ConnectorConfigSchema, Field, FieldType};
use crate::error::ConnectorError;
use crate::shorts::{self, ClipPlan, Effect, HighlightOptions};
use crate::utils::{extract_video_id, input_schema, lenient_u64, structured_result_with_text};
use crate::{auth::AuthDetails, Connector};
use async_trait::async_trait;
use client::{SearchKind, SearchRequest, YouTubeDataClient};
use rmcp::model::*;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VideoIdInput {
    /// The YouTube video ID (e.g., 'dQw4w9WgXcQ') or full URL
    pub video_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchInput {
    /// Search query string
    pub query: String,
    /// Maximum number of results to return (1-50)
    #[serde(default = "default_search_limit")]
    #[schemars(default = "default_search_limit")]
    pub max_results: u32,
    /// Sort order for results
    #[serde(default)]
    pub order: Option<SearchOrder>,
    /// Token from a previous response's next_page_token
    #[serde(default)]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    Relevance,
    Date,
    ViewCount,
    Rating,
}

impl SearchOrder {
    fn as_api(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::Rating => "rating",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TrendingInput {
    /// ISO 3166-1 alpha-2 region code
    #[serde(default = "default_region")]
    #[schemars(default = "default_region")]
    pub region_code: String,
    /// Restrict to a video category id
    #[serde(default)]
    pub category_id: Option<String>,
    /// Maximum number of results to return (1-50)
    #[serde(default = "default_search_limit")]
    #[schemars(default = "default_search_limit")]
    pub max_results: u32,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ChannelIdInput {
    /// The channel ID (starts with 'UC')
    pub channel_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ChannelListInput {
    /// The channel ID (starts with 'UC')
    pub channel_id: String,
    /// Maximum number of results to return (1-50)
    #[serde(default = "default_list_limit")]
    #[schemars(default = "default_list_limit")]
    pub max_results: u32,
    /// Token from a previous response's next_page_token
    #[serde(default)]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistIdInput {
    /// The playlist ID or a playlist URL
    pub playlist_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistItemsInput {
    /// The playlist ID or a playlist URL
    pub playlist_id: String,
    /// Maximum number of items to return (1-50)
    #[serde(default = "default_list_limit")]
    #[schemars(default = "default_list_limit")]
    pub max_results: u32,
    /// Token from a previous response's next_page_token
    #[serde(default)]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetCommentsInput {
    /// The YouTube video ID or full URL
    pub video_id: String,
    /// Maximum number of comment threads to return (1-100)
    #[serde(default = "default_comment_limit")]
    #[schemars(default = "default_comment_limit")]
    pub max_results: u32,
    /// 'relevance' (default) or 'time'
    #[serde(default)]
    pub order: CommentOrder,
    /// Token from a previous response's next_page_token
    #[serde(default)]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrder {
    #[default]
    Relevance,
    Time,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindShortSegmentsInput {
    /// The YouTube video ID or full URL
    pub video_id: String,
    /// How many segments to return
    #[serde(default = "default_max_segments", deserialize_with = "de_max_segments")]
    #[schemars(default = "default_max_segments")]
    pub max_segments: usize,
    /// Drop segments overlapping a better-ranked one
    #[serde(default)]
    pub suppress_overlaps: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PlanShortInput {
    /// The YouTube video ID or full URL
    pub video_id: String,
    /// Start of the clip, in seconds
    pub start_time: u64,
    /// Clip length in seconds, capped at 60
    #[serde(default = "default_short_duration")]
    #[schemars(default = "default_short_duration")]
    pub duration: u64,
    /// Effects to apply, in order
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Source file path for the generated ffmpeg command
    #[serde(default)]
    pub input_path: Option<String>,
    /// Output file path for the generated ffmpeg command
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_search_limit() -> u32 {
    10
}

fn default_list_limit() -> u32 {
    50
}

fn default_comment_limit() -> u32 {
    20
}

fn default_region() -> String {
    "US".to_string()
}

fn default_max_segments() -> usize {
    shorts::DEFAULT_MAX_SEGMENTS
}

/// Accepts `3`, `3.0` or `"3"`; null means the default and anything malformed is 0.
fn de_max_segments<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None => default_max_segments(),
        Some(value) => usize::try_from(lenient_u64(&value)).unwrap_or(usize::MAX),
    })
}

fn default_short_duration() -> u64 {
    shorts::WINDOW_SECS
}

/// Playlist ids may be pasted as `...?list=PL...` URLs.
fn extract_playlist_id(input: &str) -> String {
    let input = input.trim();
    url::Url::parse(input)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "list")
                .map(|(_, v)| v.to_string())
        })
        .unwrap_or_else(|| input.to_string())
}

fn parse_args<T: serde::de::DeserializeOwned>(
    args: Option<serde_json::Map<String, Value>>,
) -> Result<T, ConnectorError> {
    serde_json::from_value(Value::Object(args.unwrap_or_default()))
        .map_err(|e| ConnectorError::InvalidParams(e.to_string()))
}

const VIDEO_RESOURCE_PREFIX: &str = "youtube://video/";

pub struct YouTubeConnector {
    api_key: Option<String>,
    base_url: Option<String>,
    client: Option<YouTubeDataClient>,
}

impl YouTubeConnector {
    pub async fn new(auth: AuthDetails) -> Result<Self, ConnectorError> {
        let mut connector = YouTubeConnector {
            api_key: None,
            base_url: None,
            client: None,
        };
        connector.set_auth_details(auth).await?;
        Ok(connector)
    }

    fn client(&self) -> Result<&YouTubeDataClient, ConnectorError> {
        self.client.as_ref().ok_or_else(|| {
            ConnectorError::Authentication(
                "Missing YouTube API key: set YOUTUBE_API_KEY or run `tubescout config set youtube --value <key>`."
                    .to_string(),
            )
        })
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

    async fn find_short_segments(
        &self,
        input: FindShortSegmentsInput,
    ) -> Result<CallToolResult, ConnectorError> {
        let client = self.client()?;
        let video_id = extract_video_id(&input.video_id);
        let options = HighlightOptions {
            max_segments: input.max_segments,
            suppress_overlaps: input.suppress_overlaps,
        };

        let segments = shorts::find_highlight_segments(client, &video_id, &options).await?;
        info!(video_id = %video_id, found = segments.len(), "Selected Short segments");

        let data = json!({
            "video_id": video_id,
            "max_segments": options.max_segments,
            "suppress_overlaps": options.suppress_overlaps,
            "segments": segments,
        });
        let text = serde_json::to_string(&data)?;
        structured_result_with_text(&data, Some(text))
    }

    fn plan_short(&self, input: PlanShortInput) -> Result<CallToolResult, ConnectorError> {
        let video_id = extract_video_id(&input.video_id);
        let plan = ClipPlan::new(&video_id, input.start_time, input.duration, input.effects);
        let input_path = input
            .input_path
            .unwrap_or_else(|| format!("{}.mp4", video_id));
        let output_path = input
            .output_path
            .unwrap_or_else(|| format!("{}-short-{}.mp4", video_id, plan.start_time));

        let data = json!({
            "video_id": video_id,
            "source_url": plan.source_url(),
            "label": plan.label(),
            "video_filters": plan.video_filters(),
            "filter_complex": plan.filter_complex(),
            "ffmpeg_args": plan.to_ffmpeg_args(&input_path, &output_path),
            "plan": plan,
        });
        let text = serde_json::to_string(&data)?;
        structured_result_with_text(&data, Some(text))
    }
}

#[async_trait]
impl Connector for YouTubeConnector {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn description(&self) -> &'static str {
        "YouTube Data API: videos, channels, playlists, comments, and Short segment selection."
    }

    async fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            tools: None,
            ..Default::default()
        }
    }

    async fn get_auth_details(&self) -> Result<AuthDetails, ConnectorError> {
        let mut details = AuthDetails::new();
        if let Some(key) = &self.api_key {
            details.insert("api_key".into(), key.clone());
        }
        if let Some(url) = &self.base_url {
            details.insert("base_url".into(), url.clone());
        }
        Ok(details)
    }

    async fn set_auth_details(&mut self, details: AuthDetails) -> Result<(), ConnectorError> {
        self.api_key = details
            .get("api_key")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.base_url = details
            .get("base_url")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        self.client = match &self.api_key {
            Some(key) => {
                let client = YouTubeDataClient::new(key.clone())?;
                Some(match &self.base_url {
                    Some(url) => client.with_base_url(url.clone()),
                    None => client,
                })
            }
            None => {
                debug!("YouTube connector has no API key; tools will fail until one is set");
                None
            }
        };
        Ok(())
    }

    async fn test_auth(&self) -> Result<(), ConnectorError> {
        let client = self.client()?;
        // Cheapest authenticated call: one trending video.
        client.trending("US", None, 1).await.map(|_| ())
    }

    fn config_schema(&self) -> ConnectorConfigSchema {
        ConnectorConfigSchema {
            fields: vec![
                Field::new("api_key", "YouTube Data API Key", FieldType::Secret)
                    .required()
                    .describe("Set YOUTUBE_API_KEY or store it with `tubescout config set youtube`"),
                Field::new("base_url", "API Base URL", FieldType::Text)
                    .describe("Override the Data API endpoint (testing only)"),
            ],
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
                "Use find_short_segments to locate comment-driven highlights, then plan_short to turn one into an ffmpeg command."
                    .to_string(),
            ),
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
    ) -> Result<Vec<ResourceContents>, ConnectorError> {
        let uri_str = request.uri.as_str();
        let Some(raw_id) = uri_str.strip_prefix(VIDEO_RESOURCE_PREFIX) else {
            return Err(ConnectorError::ResourceNotFound);
        };
        if raw_id.is_empty() {
            return Err(ConnectorError::InvalidInput(format!(
                "Invalid resource URI: {}",
                uri_str
            )));
        }

        let video = self.client()?.video(&extract_video_id(raw_id)).await?;
        let content_text = serde_json::to_string(&video)?;
        Ok(vec![ResourceContents::text(content_text, uri_str)])
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let tools = vec![
            Self::tool::<VideoIdInput>(
                "get_video",
                "Get a video's title, channel, description, duration and statistics.",
            )?,
            Self::tool::<VideoIdInput>(
                "get_video_stats",
                "Get view, like, favorite and comment counts for a video.",
            )?,
            Self::tool::<SearchInput>("search_videos", "Search YouTube for videos.")?,
            Self::tool::<TrendingInput>(
                "get_trending_videos",
                "List the most popular videos for a region, optionally within a category.",
            )?,
            Self::tool::<ChannelIdInput>(
                "get_channel",
                "Get channel details: title, description, subscriber/video/view counts, uploads playlist.",
            )?,
            Self::tool::<ChannelListInput>(
                "list_channel_videos",
                "List a channel's videos, newest first.",
            )?,
            Self::tool::<ChannelListInput>(
                "list_channel_playlists",
                "List the playlists a channel has published.",
            )?,
            Self::tool::<PlaylistIdInput>("get_playlist", "Get information about a playlist.")?,
            Self::tool::<PlaylistItemsInput>(
                "get_playlist_items",
                "List the videos in a playlist, in playlist order.",
            )?,
            Self::tool::<SearchInput>("search_playlists", "Search YouTube for playlists.")?,
            Self::tool::<GetCommentsInput>(
                "get_comments",
                "Get top-level comment threads for a video with like and reply counts.",
            )?,
            Self::tool::<FindShortSegmentsInput>(
                "find_short_segments",
                "Find the best 60-second segments for Shorts using timestamps viewers mention in comments, ranked by likes. Each segment carries a confidence score and suggested effects.",
            )?,
            Self::tool::<PlanShortInput>(
                "plan_short",
                "Describe how to cut a Short: clamped duration, vertical 1080x1920 framing, effect filters, and the ffmpeg argument list. Nothing is downloaded or rendered.",
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
        debug!(tool = name, "youtube call_tool");

        match name {
            "get_video" => {
                let input: VideoIdInput = parse_args(args)?;
                let video = self.client()?.video(&extract_video_id(&input.video_id)).await?;
                let text = serde_json::to_string(&video)?;
                structured_result_with_text(&video, Some(text))
            }
            "get_video_stats" => {
                let input: VideoIdInput = parse_args(args)?;
                let stats = self
                    .client()?
                    .video_stats(&extract_video_id(&input.video_id))
                    .await?;
                let text = serde_json::to_string(&stats)?;
                structured_result_with_text(&stats, Some(text))
            }
            "search_videos" | "search_playlists" => {
                let input: SearchInput = parse_args(args)?;
                let kind = if name == "search_videos" {
                    SearchKind::Video
                } else {
                    SearchKind::Playlist
                };
                let page = self
                    .client()?
                    .search(&SearchRequest {
                        query: Some(&input.query),
                        kind,
                        max_results: input.max_results,
                        channel_id: None,
                        order: input.order.map(|o| o.as_api()),
                        page_token: input.page_token.as_deref(),
                    })
                    .await?;
                let data = json!({
                    "query": input.query,
                    "results": page.items,
                    "total_results": page.total_results,
                    "next_page_token": page.next_page_token,
                });
                structured_result_with_text(&data, None)
            }
            "get_trending_videos" => {
                let input: TrendingInput = parse_args(args)?;
                let videos = self
                    .client()?
                    .trending(
                        &input.region_code,
                        input.category_id.as_deref(),
                        input.max_results,
                    )
                    .await?;
                let data = json!({
                    "region_code": input.region_code,
                    "videos": videos,
                });
                structured_result_with_text(&data, None)
            }
            "get_channel" => {
                let input: ChannelIdInput = parse_args(args)?;
                let channel = self.client()?.channel(input.channel_id.trim()).await?;
                let text = serde_json::to_string(&channel)?;
                structured_result_with_text(&channel, Some(text))
            }
            "list_channel_videos" => {
                let input: ChannelListInput = parse_args(args)?;
                let page = self
                    .client()?
                    .search(&SearchRequest {
                        query: None,
                        kind: SearchKind::Video,
                        max_results: input.max_results,
                        channel_id: Some(input.channel_id.trim()),
                        order: Some("date"),
                        page_token: input.page_token.as_deref(),
                    })
                    .await?;
                let data = json!({
                    "channel_id": input.channel_id,
                    "videos": page.items,
                    "next_page_token": page.next_page_token,
                });
                structured_result_with_text(&data, None)
            }
            "list_channel_playlists" => {
                let input: ChannelListInput = parse_args(args)?;
                let page = self
                    .client()?
                    .channel_playlists(
                        input.channel_id.trim(),
                        input.max_results,
                        input.page_token.as_deref(),
                    )
                    .await?;
                let data = json!({
                    "channel_id": input.channel_id,
                    "playlists": page.items,
                    "next_page_token": page.next_page_token,
                });
                structured_result_with_text(&data, None)
            }
            "get_playlist" => {
                let input: PlaylistIdInput = parse_args(args)?;
                let playlist = self
                    .client()?
                    .playlist(&extract_playlist_id(&input.playlist_id))
                    .await?;
                let text = serde_json::to_string(&playlist)?;
                structured_result_with_text(&playlist, Some(text))
            }
            "get_playlist_items" => {
                let input: PlaylistItemsInput = parse_args(args)?;
                let playlist_id = extract_playlist_id(&input.playlist_id);
                let page = self
                    .client()?
                    .playlist_items(&playlist_id, input.max_results, input.page_token.as_deref())
                    .await?;
                let data = json!({
                    "playlist_id": playlist_id,
                    "items": page.items,
                    "total_results": page.total_results,
                    "next_page_token": page.next_page_token,
                });
                structured_result_with_text(&data, None)
            }
            "get_comments" => {
                let input: GetCommentsInput = parse_args(args)?;
                let video_id = extract_video_id(&input.video_id);
                let order = match input.order {
                    CommentOrder::Relevance => "relevance",
                    CommentOrder::Time => "time",
                };
                let page = self
                    .client()?
                    .comment_threads(
                        &video_id,
                        input.max_results,
                        order,
                        input.page_token.as_deref(),
                    )
                    .await?;
                let data = json!({
                    "video_id": video_id,
                    "comments": page.items,
                    "next_page_token": page.next_page_token,
                });
                structured_result_with_text(&data, None)
            }
            "find_short_segments" => self.find_short_segments(parse_args(args)?).await,
            "plan_short" => self.plan_short(parse_args(args)?),
            _ => Err(ConnectorError::ToolNotFound),
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListPromptsResult, ConnectorError> {
        Ok(ListPromptsResult {
            prompts: vec![shorts_prompt()],
            next_cursor: None,
        })
    }

    async fn get_prompt(&self, name: &str) -> Result<Prompt, ConnectorError> {
        match name {
            "plan_shorts" => Ok(shorts_prompt()),
            _ => Err(ConnectorError::InvalidParams(format!(
                "Prompt with name {} not found",
                name
            ))),
        }
    }
}

fn shorts_prompt() -> Prompt {
    Prompt {
        name: "plan_shorts".to_string(),
        title: None,
        description: Some(
            "Find the strongest comment-backed moments in a video with find_short_segments, then call plan_short for each with its suggested effects."
                .to_string(),
        ),
        arguments: Some(vec![PromptArgument {
            name: "video_id".to_string(),
            title: None,
            description: Some("YouTube video ID or URL".to_string()),
            required: Some(true),
        }]),
        icons: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn keyless() -> YouTubeConnector {
        YouTubeConnector::new(AuthDetails::new()).await.unwrap()
    }

    fn call(name: &str, args: Value) -> CallToolRequestParam {
        CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        }
    }

    #[tokio::test]
    async fn lists_every_tool() {
        let tools = keyless().await.list_tools(None).await.unwrap().tools;
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        for expected in [
            "get_video",
            "get_video_stats",
            "search_videos",
            "get_trending_videos",
            "get_channel",
            "list_channel_videos",
            "list_channel_playlists",
            "get_playlist",
            "get_playlist_items",
            "search_playlists",
            "get_comments",
            "find_short_segments",
            "plan_short",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
        let segments = tools
            .iter()
            .find(|t| t.name == "find_short_segments")
            .unwrap();
        assert!(segments.input_schema["properties"]
            .get("suppress_overlaps")
            .is_some());
    }

    #[tokio::test]
    async fn data_tools_need_an_api_key() {
        let connector = keyless().await;
        let err = connector
            .call_tool(call("find_short_segments", json!({"video_id": "abc"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Authentication(_)));
        assert!(connector.test_auth().await.is_err());
    }

    #[tokio::test]
    async fn plan_short_works_offline() {
        let connector = keyless().await;
        let result = connector
            .call_tool(call(
                "plan_short",
                json!({
                    "video_id": "https://youtu.be/abc",
                    "start_time": 75,
                    "duration": 90,
                    "effects": ["speedup", "fade"]
                }),
            ))
            .await
            .unwrap();
        let body = result.structured_content.unwrap();
        assert_eq!(body["video_id"], "abc");
        assert_eq!(body["plan"]["duration"], 60);
        assert_eq!(body["label"], "1:15 - 2:15");
        let args: Vec<String> = serde_json::from_value(body["ffmpeg_args"].clone()).unwrap();
        assert_eq!(args.last().map(String::as_str), Some("abc-short-75.mp4"));
    }

    #[tokio::test]
    async fn unknown_tool_and_bad_params() {
        let connector = keyless().await;
        assert!(matches!(
            connector.call_tool(call("upload_short", json!({}))).await,
            Err(ConnectorError::ToolNotFound)
        ));
        assert!(matches!(
            connector
                .call_tool(call("plan_short", json!({"video_id": "abc"})))
                .await,
            Err(ConnectorError::InvalidParams(_))
        ));
    }

    #[tokio::test]
    async fn auth_details_round_trip() {
        let mut auth = AuthDetails::new();
        auth.insert("api_key".into(), " key-123 ".into());
        let connector = YouTubeConnector::new(auth).await.unwrap();
        assert_eq!(
            connector.get_auth_details().await.unwrap().get("api_key").unwrap(),
            "key-123"
        );
        assert!(connector.client().is_ok());
        assert!(connector.config_schema().requires_auth());
    }

    #[test]
    fn playlist_urls_are_accepted() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLabc"),
            "PLabc"
        );
        assert_eq!(extract_playlist_id("PLabc"), "PLabc");
    }

    #[test]
    fn max_segments_is_read_leniently() {
        let parse = |args: Value| -> usize {
            serde_json::from_value::<FindShortSegmentsInput>(args)
                .unwrap()
                .max_segments
        };
        assert_eq!(parse(json!({"video_id": "abc"})), 3);
        assert_eq!(parse(json!({"video_id": "abc", "max_segments": null})), 3);
        assert_eq!(parse(json!({"video_id": "abc", "max_segments": 5})), 5);
        assert_eq!(parse(json!({"video_id": "abc", "max_segments": 4.0})), 4);
        assert_eq!(parse(json!({"video_id": "abc", "max_segments": "2"})), 2);
        assert_eq!(parse(json!({"video_id": "abc", "max_segments": -1})), 0);
        assert_eq!(parse(json!({"video_id": "abc", "max_segments": "lots"})), 0);
    }
}
