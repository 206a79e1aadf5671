//! Records returned by the YouTube Data API v3.
//!
//! The raw `Api*` structs mirror the wire format loosely: every field has a
//! default and counts go through [`de_lenient_u64`], so a partial or oddly
//! typed payload still yields a record. The public records are what the
//! connector hands back to callers.

use crate::shorts::CommentRecord;
use crate::utils::{clean_html_entities, de_lenient_u64, parse_iso8601_duration};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "T: serde::de::DeserializeOwned")
)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    #[serde(deserialize_with = "de_lenient_u64")]
    pub total_results: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
    pub errors: Vec<ApiErrorReason>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorReason {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnail {
    pub url: String,
}

/// Search results carry an object id, everything else a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiId {
    Plain(String),
    Search {
        #[serde(default)]
        kind: String,
        #[serde(default, rename = "videoId")]
        video_id: Option<String>,
        #[serde(default, rename = "channelId")]
        channel_id: Option<String>,
        #[serde(default, rename = "playlistId")]
        playlist_id: Option<String>,
    },
}

impl Default for ApiId {
    fn default() -> Self {
        ApiId::Plain(String::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSnippet {
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnails: HashMap<String, Thumbnail>,
    pub custom_url: Option<String>,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub live_broadcast_content: Option<String>,
    pub position: Option<u64>,
    pub resource_id: Option<ApiResourceId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiStatistics {
    #[serde(deserialize_with = "de_lenient_u64")]
    pub view_count: u64,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub like_count: u64,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub favorite_count: u64,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub comment_count: u64,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub subscriber_count: u64,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub video_count: u64,
    pub hidden_subscriber_count: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiContentDetails {
    pub duration: Option<String>,
    pub definition: Option<String>,
    pub caption: Option<String>,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub item_count: u64,
    pub video_id: Option<String>,
    pub related_playlists: Option<ApiRelatedPlaylists>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiRelatedPlaylists {
    pub uploads: Option<String>,
}

/// One entry of `videos`, `channels`, `playlists`, `playlistItems` or `search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiItem {
    pub id: ApiId,
    pub snippet: ApiSnippet,
    pub statistics: ApiStatistics,
    pub content_details: ApiContentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCommentThread {
    pub id: String,
    pub snippet: ApiCommentThreadSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCommentThreadSnippet {
    pub top_level_comment: ApiComment,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub total_reply_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiComment {
    pub snippet: ApiCommentSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCommentSnippet {
    pub author_display_name: String,
    pub text_original: String,
    pub text_display: String,
    #[serde(deserialize_with = "de_lenient_u64")]
    pub like_count: u64,
    pub published_at: String,
}

fn best_thumbnail(thumbnails: &HashMap<String, Thumbnail>) -> Option<String> {
    ["maxres", "standard", "high", "medium", "default"]
        .iter()
        .find_map(|size| thumbnails.get(*size))
        .map(|t| t.url.clone())
        .filter(|u| !u.is_empty())
}

fn plain_id(id: &ApiId) -> String {
    match id {
        ApiId::Plain(s) => s.clone(),
        ApiId::Search {
            video_id,
            channel_id,
            playlist_id,
            ..
        } => video_id
            .clone()
            .or_else(|| playlist_id.clone())
            .or_else(|| channel_id.clone())
            .unwrap_or_default(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub url: String,
}

impl From<ApiItem> for VideoRecord {
    fn from(item: ApiItem) -> Self {
        let id = plain_id(&item.id);
        VideoRecord {
            url: format!("https://www.youtube.com/watch?v={}", id),
            title: clean_html_entities(&item.snippet.title),
            description: item.snippet.description,
            channel_id: item.snippet.channel_id,
            channel_title: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            duration_seconds: item
                .content_details
                .duration
                .as_deref()
                .map(parse_iso8601_duration)
                .unwrap_or(0),
            view_count: item.statistics.view_count,
            like_count: item.statistics.like_count,
            comment_count: item.statistics.comment_count,
            tags: item.snippet.tags,
            thumbnail: best_thumbnail(&item.snippet.thumbnails),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoStats {
    pub video_id: String,
    pub view_count: u64,
    pub like_count: u64,
    pub favorite_count: u64,
    pub comment_count: u64,
}

impl From<ApiItem> for VideoStats {
    fn from(item: ApiItem) -> Self {
        VideoStats {
            video_id: plain_id(&item.id),
            view_count: item.statistics.view_count,
            like_count: item.statistics.like_count,
            favorite_count: item.statistics.favorite_count,
            comment_count: item.statistics.comment_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// `video`, `playlist` or `channel`.
    pub kind: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnail: Option<String>,
    pub url: String,
}

impl From<ApiItem> for SearchHit {
    fn from(item: ApiItem) -> Self {
        let kind = match &item.id {
            ApiId::Search { kind, .. } => kind.trim_start_matches("youtube#").to_string(),
            ApiId::Plain(_) => "video".to_string(),
        };
        let id = plain_id(&item.id);
        let url = match kind.as_str() {
            "playlist" => format!("https://www.youtube.com/playlist?list={}", id),
            "channel" => format!("https://www.youtube.com/channel/{}", id),
            _ => format!("https://www.youtube.com/watch?v={}", id),
        };
        SearchHit {
            kind,
            id,
            url,
            title: clean_html_entities(&item.snippet.title),
            description: clean_html_entities(&item.snippet.description),
            channel_id: item.snippet.channel_id,
            channel_title: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            thumbnail: best_thumbnail(&item.snippet.thumbnails),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub custom_url: Option<String>,
    pub published_at: String,
    /// 0 when the channel hides it.
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub uploads_playlist_id: Option<String>,
    pub thumbnail: Option<String>,
    pub url: String,
}

impl From<ApiItem> for ChannelRecord {
    fn from(item: ApiItem) -> Self {
        let id = plain_id(&item.id);
        ChannelRecord {
            url: format!("https://www.youtube.com/channel/{}", id),
            title: item.snippet.title,
            description: item.snippet.description,
            custom_url: item.snippet.custom_url,
            published_at: item.snippet.published_at,
            subscriber_count: if item.statistics.hidden_subscriber_count {
                0
            } else {
                item.statistics.subscriber_count
            },
            video_count: item.statistics.video_count,
            view_count: item.statistics.view_count,
            uploads_playlist_id: item
                .content_details
                .related_playlists
                .and_then(|p| p.uploads),
            thumbnail: best_thumbnail(&item.snippet.thumbnails),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: String,
    pub item_count: u64,
    pub thumbnail: Option<String>,
    pub url: String,
}

impl From<ApiItem> for PlaylistRecord {
    fn from(item: ApiItem) -> Self {
        let id = plain_id(&item.id);
        PlaylistRecord {
            url: format!("https://www.youtube.com/playlist?list={}", id),
            title: item.snippet.title,
            description: item.snippet.description,
            channel_id: item.snippet.channel_id,
            channel_title: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            item_count: item.content_details.item_count,
            thumbnail: best_thumbnail(&item.snippet.thumbnails),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistItemRecord {
    pub video_id: String,
    pub title: String,
    pub position: u64,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnail: Option<String>,
    pub url: String,
}

impl From<ApiItem> for PlaylistItemRecord {
    fn from(item: ApiItem) -> Self {
        let video_id = item
            .content_details
            .video_id
            .clone()
            .or_else(|| {
                item.snippet
                    .resource_id
                    .as_ref()
                    .and_then(|r| r.video_id.clone())
            })
            .unwrap_or_default();
        PlaylistItemRecord {
            url: format!("https://www.youtube.com/watch?v={}", video_id),
            title: item.snippet.title,
            position: item.snippet.position.unwrap_or(0),
            channel_title: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            thumbnail: best_thumbnail(&item.snippet.thumbnails),
            video_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentThreadRecord {
    pub id: String,
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub reply_count: u64,
    pub published_at: String,
}

impl From<ApiCommentThread> for CommentThreadRecord {
    fn from(thread: ApiCommentThread) -> Self {
        let top = thread.snippet.top_level_comment.snippet;
        // textOriginal is only returned to the comment's author; fall back to the display text.
        let text = if top.text_original.is_empty() {
            clean_html_entities(&top.text_display)
        } else {
            top.text_original
        };
        CommentThreadRecord {
            id: thread.id,
            author: top.author_display_name,
            text,
            like_count: top.like_count,
            reply_count: thread.snippet.total_reply_count,
            published_at: top.published_at,
        }
    }
}

impl From<CommentThreadRecord> for CommentRecord {
    fn from(thread: CommentThreadRecord) -> Self {
        CommentRecord {
            text: thread.text,
            like_count: thread.like_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Item type with no Default impl, parsed through a generic helper like the client's.
    #[derive(Debug, Deserialize)]
    struct IdOnly {
        id: String,
    }

    fn parse_list<T: serde::de::DeserializeOwned>(raw: &str) -> ListResponse<T> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn list_response_parses_items_without_default() {
        let page: ListResponse<IdOnly> = parse_list(
            r#"{"items": [{"id": "a"}, {"id": "b"}], "nextPageToken": "CAUQAA", "pageInfo": {"totalResults": "42"}}"#,
        );
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].id, "b");
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(page.page_info.total_results, 42);

        let empty: ListResponse<IdOnly> = parse_list("{}");
        assert!(empty.items.is_empty());
        assert!(empty.next_page_token.is_none());
    }

    #[test]
    fn video_item_with_string_counts() {
        let item: ApiItem = serde_json::from_value(json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "title": "Rick &amp; Roll",
                "channelTitle": "Rick",
                "thumbnails": {"default": {"url": "d.jpg"}, "high": {"url": "h.jpg"}}
            },
            "statistics": {"viewCount": "1500000000", "likeCount": "17000000", "commentCount": "oops"},
            "contentDetails": {"duration": "PT3M33S"}
        }))
        .unwrap();
        let video = VideoRecord::from(item);
        assert_eq!(video.title, "Rick & Roll");
        assert_eq!(video.view_count, 1_500_000_000);
        assert_eq!(video.comment_count, 0);
        assert_eq!(video.duration_seconds, 213);
        assert_eq!(video.thumbnail.as_deref(), Some("h.jpg"));
    }

    #[test]
    fn search_ids_are_objects() {
        let item: ApiItem = serde_json::from_value(json!({
            "id": {"kind": "youtube#playlist", "playlistId": "PL123"},
            "snippet": {"title": "Mix"}
        }))
        .unwrap();
        let hit = SearchHit::from(item);
        assert_eq!(hit.kind, "playlist");
        assert_eq!(hit.id, "PL123");
        assert_eq!(hit.url, "https://www.youtube.com/playlist?list=PL123");
    }

    #[test]
    fn comment_thread_falls_back_to_display_text() {
        let thread: ApiCommentThread = serde_json::from_value(json!({
            "id": "c1",
            "snippet": {
                "topLevelComment": {"snippet": {
                    "authorDisplayName": "viewer",
                    "textDisplay": "2:05 that&#39;s it",
                    "likeCount": 9
                }},
                "totalReplyCount": 2
            }
        }))
        .unwrap();
        let record = CommentThreadRecord::from(thread);
        assert_eq!(record.text, "2:05 that's it");
        let comment = CommentRecord::from(record);
        assert_eq!(comment.like_count, 9);
    }
}
