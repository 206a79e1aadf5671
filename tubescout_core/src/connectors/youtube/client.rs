use super::types::*;
use crate::error::ConnectorError;
use crate::shorts::{CommentRecord, CommentSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The Data API caps `maxResults` at 50 for most list calls and 100 for comment threads.
pub const MAX_PAGE_SIZE: u32 = 50;
pub const MAX_COMMENT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Video,
    Playlist,
    Channel,
}

impl SearchKind {
    fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Video => "video",
            SearchKind::Playlist => "playlist",
            SearchKind::Channel => "channel",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: Option<&'a str>,
    pub kind: SearchKind,
    pub max_results: u32,
    pub channel_id: Option<&'a str>,
    /// `relevance`, `date`, `viewCount` or `rating`.
    pub order: Option<&'a str>,
    pub page_token: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
    pub total_results: u64,
}

/// Thin typed wrapper over the YouTube Data API v3, keyed by an API key.
#[derive(Debug, Clone)]
pub struct YouTubeDataClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConnectorError> {
        let client = Client::builder()
            .user_agent(concat!("tubescout/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ConnectorError::Other(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<ListResponse<T>, ConnectorError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, "YouTube Data API request");

        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(ConnectorError::HttpRequest)?;

        let status = resp.status();
        let body = resp.text().await.map_err(ConnectorError::HttpRequest)?;

        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &body, params));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(endpoint, error = %e, "Unparseable YouTube Data API response");
            ConnectorError::Other(format!("Unexpected response from {}: {}", endpoint, e))
        })
    }

    async fn first_item<T: From<ApiItem>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        what: &str,
        id: &str,
    ) -> Result<T, ConnectorError> {
        let resp: ListResponse<ApiItem> = self.get_list(endpoint, params).await?;
        match resp.items.into_iter().next() {
            Some(item) => Ok(T::from(item)),
            None => {
                debug!(what, id, "YouTube returned no items");
                Err(ConnectorError::ResourceNotFound)
            }
        }
    }

    pub async fn video(&self, video_id: &str) -> Result<VideoRecord, ConnectorError> {
        self.first_item(
            "videos",
            &[
                ("part", "snippet,contentDetails,statistics".to_string()),
                ("id", video_id.to_string()),
            ],
            "video",
            video_id,
        )
        .await
    }

    pub async fn video_stats(&self, video_id: &str) -> Result<VideoStats, ConnectorError> {
        self.first_item(
            "videos",
            &[("part", "statistics".to_string()), ("id", video_id.to_string())],
            "video",
            video_id,
        )
        .await
    }

    pub async fn trending(
        &self,
        region_code: &str,
        category_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<VideoRecord>, ConnectorError> {
        let mut params = vec![
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region_code.to_string()),
            ("maxResults", clamp_page(max_results, MAX_PAGE_SIZE)),
        ];
        if let Some(category) = category_id.filter(|c| !c.is_empty()) {
            params.push(("videoCategoryId", category.to_string()));
        }
        let resp: ListResponse<ApiItem> = self.get_list("videos", &params).await?;
        Ok(resp.items.into_iter().map(VideoRecord::from).collect())
    }

    pub async fn search(&self, req: &SearchRequest<'_>) -> Result<Page<SearchHit>, ConnectorError> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("type", req.kind.as_str().to_string()),
            ("maxResults", clamp_page(req.max_results, MAX_PAGE_SIZE)),
        ];
        if let Some(q) = req.query.filter(|q| !q.trim().is_empty()) {
            params.push(("q", q.to_string()));
        }
        if let Some(channel) = req.channel_id {
            params.push(("channelId", channel.to_string()));
        }
        if let Some(order) = req.order {
            params.push(("order", order.to_string()));
        }
        if let Some(token) = req.page_token {
            params.push(("pageToken", token.to_string()));
        }
        let resp: ListResponse<ApiItem> = self.get_list("search", &params).await?;
        Ok(Page {
            total_results: resp.page_info.total_results,
            next_page_token: resp.next_page_token,
            items: resp.items.into_iter().map(SearchHit::from).collect(),
        })
    }

    pub async fn channel(&self, channel_id: &str) -> Result<ChannelRecord, ConnectorError> {
        self.first_item(
            "channels",
            &[
                ("part", "snippet,statistics,contentDetails".to_string()),
                ("id", channel_id.to_string()),
            ],
            "channel",
            channel_id,
        )
        .await
    }

    pub async fn channel_playlists(
        &self,
        channel_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<Page<PlaylistRecord>, ConnectorError> {
        let mut params = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("channelId", channel_id.to_string()),
            ("maxResults", clamp_page(max_results, MAX_PAGE_SIZE)),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let resp: ListResponse<ApiItem> = self.get_list("playlists", &params).await?;
        Ok(Page {
            total_results: resp.page_info.total_results,
            next_page_token: resp.next_page_token,
            items: resp.items.into_iter().map(PlaylistRecord::from).collect(),
        })
    }

    pub async fn playlist(&self, playlist_id: &str) -> Result<PlaylistRecord, ConnectorError> {
        self.first_item(
            "playlists",
            &[
                ("part", "snippet,contentDetails".to_string()),
                ("id", playlist_id.to_string()),
            ],
            "playlist",
            playlist_id,
        )
        .await
    }

    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<Page<PlaylistItemRecord>, ConnectorError> {
        let mut params = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", clamp_page(max_results, MAX_PAGE_SIZE)),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let resp: ListResponse<ApiItem> = self.get_list("playlistItems", &params).await?;
        Ok(Page {
            total_results: resp.page_info.total_results,
            next_page_token: resp.next_page_token,
            items: resp.items.into_iter().map(PlaylistItemRecord::from).collect(),
        })
    }

    /// One page of top-level comment threads.
    ///
    /// `order` is `relevance` or `time`.
    pub async fn comment_threads(
        &self,
        video_id: &str,
        max_results: u32,
        order: &str,
        page_token: Option<&str>,
    ) -> Result<Page<CommentThreadRecord>, ConnectorError> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("videoId", video_id.to_string()),
            ("maxResults", clamp_page(max_results, MAX_COMMENT_PAGE_SIZE)),
            ("order", order.to_string()),
            ("textFormat", "plainText".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let resp: ListResponse<ApiCommentThread> =
            self.get_list("commentThreads", &params).await?;
        Ok(Page {
            total_results: resp.page_info.total_results,
            next_page_token: resp.next_page_token,
            items: resp
                .items
                .into_iter()
                .map(CommentThreadRecord::from)
                .collect(),
        })
    }
}

#[async_trait]
impl CommentSource for YouTubeDataClient {
    /// The most relevant page of top-level comments.
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<CommentRecord>, ConnectorError> {
        let page = self
            .comment_threads(video_id, MAX_COMMENT_PAGE_SIZE, "relevance", None)
            .await?;
        Ok(page.items.into_iter().map(CommentRecord::from).collect())
    }
}

fn clamp_page(requested: u32, cap: u32) -> String {
    requested.clamp(1, cap).to_string()
}

fn upstream_error(status: u16, body: &str, params: &[(&str, String)]) -> ConnectorError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let reasons: Vec<&str> = parsed
        .error
        .errors
        .iter()
        .map(|e| e.reason.as_str())
        .collect();

    if reasons.contains(&"commentsDisabled") {
        let video_id = params
            .iter()
            .find(|(k, _)| *k == "videoId")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        return ConnectorError::CommentsDisabled(video_id);
    }

    if status == 404 || reasons.iter().any(|r| r.ends_with("NotFound")) {
        return ConnectorError::ResourceNotFound;
    }

    let message = if parsed.error.message.is_empty() {
        body.chars().take(200).collect()
    } else {
        parsed.error.message
    };
    warn!(status, reasons = ?reasons, "YouTube Data API error");
    ConnectorError::Upstream { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_disabled_is_recognised() {
        let body = r#"{"error":{"code":403,"message":"The video has disabled comments.","errors":[{"reason":"commentsDisabled"}]}}"#;
        let err = upstream_error(403, body, &[("videoId", "abc".to_string())]);
        assert!(matches!(err, ConnectorError::CommentsDisabled(ref id) if id == "abc"));
    }

    #[test]
    fn other_failures_carry_status_and_message() {
        let body = r#"{"error":{"code":403,"message":"quota exceeded","errors":[{"reason":"quotaExceeded"}]}}"#;
        match upstream_error(403, body, &[]) {
            ConnectorError::Upstream { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            upstream_error(500, "<html>oops</html>", &[]),
            ConnectorError::Upstream { status: 500, .. }
        ));
        assert!(matches!(
            upstream_error(404, "", &[]),
            ConnectorError::ResourceNotFound
        ));
    }

    #[test]
    fn page_sizes_are_clamped() {
        assert_eq!(clamp_page(0, MAX_PAGE_SIZE), "1");
        assert_eq!(clamp_page(500, MAX_COMMENT_PAGE_SIZE), "100");
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let client = YouTubeDataClient::new("k")
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }
}
