//! Engagement-driven highlight selection for YouTube Shorts.
//!
//! Viewer comments that mention a timestamp become [`Marker`]s. Every marker
//! anchors a fixed 60 second window; each window is classified, scored and
//! ranked by the engagement it gathers, and the top windows come back with
//! suggested post-processing effects.
//!
//! Everything below [`find_highlight_segments`] is synchronous and pure.

pub mod classify;
pub mod confidence;
pub mod effects;
pub mod markers;
pub mod plan;
pub mod rank;
pub mod timestamp;
pub mod window;

use crate::error::ConnectorError;
use crate::utils::de_lenient_u64;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use classify::classify_segment;
pub use confidence::score_confidence;
pub use effects::{suggest_effects, Effect};
pub use markers::{collect_markers, sanitize_engagement};
pub use plan::ClipPlan;
pub use rank::{rank_segments, suppress_overlaps};
pub use timestamp::{extract_timestamp, format_timestamp};
pub use window::{aggregate_windows, Window, WINDOW_SECS};

pub const DEFAULT_MAX_SEGMENTS: usize = 3;

/// What produced a marker. Comments are the only source today.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerKind {
    #[default]
    Comment,
    Action,
    Highlight,
    Transition,
    Other(String),
}

impl MarkerKind {
    pub fn as_str(&self) -> &str {
        match self {
            MarkerKind::Comment => "comment",
            MarkerKind::Action => "action",
            MarkerKind::Highlight => "highlight",
            MarkerKind::Transition => "transition",
            MarkerKind::Other(name) => name,
        }
    }
}

impl From<String> for MarkerKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "comment" => MarkerKind::Comment,
            "action" => MarkerKind::Action,
            "highlight" => MarkerKind::Highlight,
            "transition" => MarkerKind::Transition,
            _ => MarkerKind::Other(value),
        }
    }
}

impl From<MarkerKind> for String {
    fn from(value: MarkerKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-anchored engagement signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: u64,
    pub kind: MarkerKind,
    pub engagement: f64,
}

/// A scored candidate window. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start_time: u64,
    pub duration: u64,
    pub markers: Vec<Marker>,
    pub engagement: f64,
    pub kind: MarkerKind,
    pub confidence: f64,
}

impl Segment {
    pub fn from_window(window: Window) -> Self {
        let kind = classify_segment(&window.markers);
        let confidence = score_confidence(&window.markers);
        Segment {
            start_time: window.start_time,
            duration: window.duration,
            markers: window.markers,
            engagement: window.engagement,
            kind,
            confidence,
        }
    }

    pub fn end_time(&self) -> u64 {
        self.start_time.saturating_add(self.duration)
    }
}

/// A ranked segment as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSegment {
    pub start_time: u64,
    pub duration: u64,
    pub confidence: f64,
    pub suggested_effects: Vec<Effect>,
    pub engagement: f64,
    pub marker_count: usize,
    pub kind: MarkerKind,
    /// `start_time` rendered as `M:SS`.
    pub label: String,
}

impl From<Segment> for HighlightSegment {
    fn from(segment: Segment) -> Self {
        HighlightSegment {
            start_time: segment.start_time,
            duration: segment.duration,
            confidence: segment.confidence,
            suggested_effects: suggest_effects(&segment.kind).to_vec(),
            engagement: segment.engagement,
            marker_count: segment.markers.len(),
            label: format_timestamp(segment.start_time),
            kind: segment.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    pub max_segments: usize,
    /// Drop candidates overlapping a better-ranked one before truncating.
    pub suppress_overlaps: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            suppress_overlaps: false,
        }
    }
}

/// A viewer comment, reduced to the fields the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub text: String,
    #[serde(alias = "likeCount", default, deserialize_with = "de_lenient_u64")]
    pub like_count: u64,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>, like_count: u64) -> Self {
        Self {
            text: text.into(),
            like_count,
        }
    }
}

/// Where comments for a video come from.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<CommentRecord>, ConnectorError>;
}

/// Run the selection pipeline over markers that were already collected.
///
/// Marker engagement is sanitized first, so NaN or negative weights count as 0.
pub fn select_from_markers(markers: &[Marker], options: &HighlightOptions) -> Vec<HighlightSegment> {
    let markers: Vec<Marker> = markers
        .iter()
        .map(|m| Marker {
            engagement: sanitize_engagement(m.engagement),
            ..m.clone()
        })
        .collect();
    let segments: Vec<Segment> = aggregate_windows(&markers)
        .into_iter()
        .map(Segment::from_window)
        .collect();
    let candidates = segments.len();

    let ranked = if options.suppress_overlaps {
        let mut kept = suppress_overlaps(rank_segments(segments, usize::MAX));
        kept.truncate(options.max_segments);
        kept
    } else {
        rank_segments(segments, options.max_segments)
    };

    debug!(
        markers = markers.len(),
        candidates,
        selected = ranked.len(),
        "Ranked highlight candidates"
    );

    ranked.into_iter().map(HighlightSegment::from).collect()
}

/// Select highlight segments from an already fetched comment list.
pub fn select_highlights(
    comments: &[CommentRecord],
    options: &HighlightOptions,
) -> Vec<HighlightSegment> {
    let markers = collect_markers(
        comments
            .iter()
            .map(|c| (c.text.as_str(), c.like_count as f64)),
    );
    select_from_markers(&markers, options)
}

/// Fetch comments for `video_id` and select its best Short candidates.
///
/// Fetch failures are returned as-is; once comments are in hand the
/// selection itself cannot fail and yields an empty list when no comment
/// carries a timestamp.
pub async fn find_highlight_segments(
    source: &dyn CommentSource,
    video_id: &str,
    options: &HighlightOptions,
) -> Result<Vec<HighlightSegment>, ConnectorError> {
    let comments = source.fetch_comments(video_id).await?;
    debug!(video_id, comments = comments.len(), "Fetched comments for highlight selection");
    Ok(select_highlights(&comments, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_kind_round_trips_through_strings() {
        let kinds: Vec<MarkerKind> =
            serde_json::from_value(serde_json::json!(["comment", "action", "laugh"])).unwrap();
        assert_eq!(
            kinds,
            vec![
                MarkerKind::Comment,
                MarkerKind::Action,
                MarkerKind::Other("laugh".into())
            ]
        );
        assert_eq!(
            serde_json::to_value(&kinds).unwrap(),
            serde_json::json!(["comment", "action", "laugh"])
        );
    }

    #[test]
    fn comment_record_accepts_api_field_names_and_bad_counts() {
        let records: Vec<CommentRecord> = serde_json::from_value(serde_json::json!([
            {"text": "1:00 wow", "likeCount": 12},
            {"text": "2:00 lol", "like_count": "7"},
            {"text": "3:00", "likeCount": "n/a"},
            {"text": "no count"}
        ]))
        .unwrap();
        let likes: Vec<u64> = records.iter().map(|r| r.like_count).collect();
        assert_eq!(likes, vec![12, 7, 0, 0]);
    }

    #[test]
    fn selects_top_windows_with_effects() {
        let comments = vec![
            CommentRecord::new("0:10 this part", 5),
            CommentRecord::new("0:40 and this", 3),
            CommentRecord::new("5:00 later", 4),
            CommentRecord::new("great video", 100),
        ];
        let out = select_highlights(&comments, &HighlightOptions::default());

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].start_time, 10);
        assert_eq!(out[0].engagement, 8.0);
        assert_eq!(out[0].marker_count, 2);
        assert_eq!(out[0].label, "0:10");
        assert_eq!(out[0].suggested_effects, vec![Effect::BlurBackground]);
        assert_eq!(out[1].start_time, 300);
        assert_eq!(out[2].start_time, 40);
    }

    #[test]
    fn overlap_suppression_is_opt_in() {
        let comments = vec![
            CommentRecord::new("0:10", 5),
            CommentRecord::new("0:40", 3),
            CommentRecord::new("5:00", 1),
        ];
        let plain = select_highlights(&comments, &HighlightOptions::default());
        let starts: Vec<u64> = plain.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![10, 40, 300]);

        let options = HighlightOptions {
            suppress_overlaps: true,
            ..Default::default()
        };
        let filtered = select_highlights(&comments, &options);
        let starts: Vec<u64> = filtered.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![10, 300]);
    }
}
