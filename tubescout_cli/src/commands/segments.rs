use crate::cli::{Cli, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, terminal_width, OutputData};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::path::Path;
use tubescout_core::shorts::{self, ClipPlan, CommentRecord, HighlightOptions, HighlightSegment};
use tubescout_core::utils::extract_video_id;
use tracing::debug;

pub struct SegmentArgs<'a> {
    pub video: &'a str,
    pub max: usize,
    pub comments: Option<&'a Path>,
    pub no_overlap: bool,
    pub ffmpeg: bool,
}

pub async fn run(cli: &Cli, args: SegmentArgs<'_>) -> Result<()> {
    let video_id = extract_video_id(args.video);
    let options = HighlightOptions {
        max_segments: args.max,
        suppress_overlaps: args.no_overlap,
    };

    let segments = match args.comments {
        Some(path) => {
            let comments = parse_comments(&std::fs::read_to_string(path)?)?;
            debug!(path = %path.display(), comments = comments.len(), "Loaded comments from file");
            shorts::select_highlights(&comments, &options)
        }
        None => fetch_segments(cli, &video_id, &options).await?,
    };

    let plans: Vec<ClipPlan> = segments
        .iter()
        .map(|s| ClipPlan::new(&video_id, s.start_time, s.duration, s.suggested_effects.clone()))
        .collect();

    match cli.output {
        OutputFormat::Pretty => print_pretty(&video_id, &segments, args.ffmpeg.then_some(&plans[..])),
        _ => {
            let data = OutputData::Segments {
                video_id: video_id.clone(),
                segments,
                plans: args.ffmpeg.then_some(plans),
            };
            format_output(&data, &cli.output)?;
        }
    }

    Ok(())
}

#[cfg(feature = "youtube")]
async fn fetch_segments(
    cli: &Cli,
    video_id: &str,
    options: &HighlightOptions,
) -> Result<Vec<HighlightSegment>> {
    use tubescout_core::auth_store::{AuthStore, FileAuthStore};
    use tubescout_core::connectors::youtube::client::YouTubeDataClient;

    let store = FileAuthStore::new_default();
    let auth = tubescout_core::config::resolve_auth(Some(&store as &dyn AuthStore), "youtube");
    let api_key = auth
        .get("api_key")
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            CommandError::InvalidConfig(
                "YouTube API key missing. Run 'tubescout config set youtube' or set YOUTUBE_API_KEY, \
                 or pass --comments <file>"
                    .to_string(),
            )
        })?;

    let mut client = YouTubeDataClient::new(api_key.clone())?;
    if let Some(base_url) = auth.get("base_url").filter(|u| !u.trim().is_empty()) {
        client = client.with_base_url(base_url.clone());
    }

    let progress = (cli.output == OutputFormat::Pretty)
        .then(|| crate::commands::spinner(format!("Reading comments for {}...", video_id)));
    let result = shorts::find_highlight_segments(&client, video_id, options).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    Ok(result?)
}

#[cfg(not(feature = "youtube"))]
async fn fetch_segments(
    _cli: &Cli,
    _video_id: &str,
    _options: &HighlightOptions,
) -> Result<Vec<HighlightSegment>> {
    Err(CommandError::InvalidConfig(
        "built without the youtube connector; pass --comments <file>".to_string(),
    ))
}

/// Comments as a bare array, or under `comments`/`items` as `get_comments` returns them.
fn parse_comments(raw: &str) -> Result<Vec<CommentRecord>> {
    let value: Value = serde_json::from_str(raw)?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut obj) => match obj.remove("comments").or_else(|| obj.remove("items")) {
            Some(list) => list,
            None => {
                return Err(CommandError::InvalidInput(
                    "expected a JSON array of comments or an object with a 'comments' list"
                        .to_string(),
                ))
            }
        },
        _ => {
            return Err(CommandError::InvalidInput(
                "expected a JSON array of comments".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(list)?)
}

fn print_pretty(video_id: &str, segments: &[HighlightSegment], plans: Option<&[ClipPlan]>) {
    println!(
        "{} {}",
        "Highlight segments for".bold().cyan(),
        video_id.yellow()
    );
    println!();

    if segments.is_empty() {
        println!(
            "{}",
            "No timestamped comments found; nothing to suggest.".yellow()
        );
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(terminal_width() as u16)
        .set_header(vec![
            "#",
            "Start",
            "Engagement",
            "Markers",
            "Kind",
            "Confidence",
            "Effects",
        ]);

    for (i, s) in segments.iter().enumerate() {
        let effects: Vec<&str> = s.suggested_effects.iter().map(|e| e.as_str()).collect();
        table.add_row(vec![
            (i + 1).to_string(),
            s.label.clone(),
            format!("{:.0}", s.engagement),
            s.marker_count.to_string(),
            s.kind.to_string(),
            format!("{:.2}", s.confidence),
            effects.join(", "),
        ]);
    }
    println!("{}", table);

    if let Some(plans) = plans {
        println!();
        println!("{}", "ffmpeg:".bold().green());
        for plan in plans {
            let output = format!("{}-short-{}.mp4", plan.video_id, plan.start_time);
            let args = plan.to_ffmpeg_args(&format!("{}.mp4", plan.video_id), &output);
            println!("  {}", plan.label().dimmed());
            println!("  ffmpeg {}", shell_join(&args).cyan());
        }
    }

    println!();
    println!(
        "{} Use {} to cut a segment",
        "Tip:".dimmed(),
        "tubescout youtube plan_short <video> <start>".cyan()
    );
}

fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| {
            if a.is_empty() || a.contains(|c: char| c.is_whitespace() || "[];,'\"?".contains(c)) {
                format!("'{}'", a.replace('\'', r"'\''"))
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_from_array_or_tool_output() {
        let bare = parse_comments(r#"[{"text": "1:00 wow", "like_count": 3}]"#).unwrap();
        assert_eq!(bare[0].like_count, 3);

        let wrapped = parse_comments(
            r#"{"video_id": "abc", "comments": [{"id": "c1", "author": "a", "text": "0:10", "like_count": 7, "reply_count": 0}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped[0].text, "0:10");
        assert_eq!(wrapped[0].like_count, 7);

        assert!(parse_comments(r#"{"nope": 1}"#).is_err());
        assert!(parse_comments("42").is_err());
    }

    #[test]
    fn file_comments_feed_the_engine() {
        let comments = parse_comments(
            r#"[{"text": "2:00 best", "likeCount": "20"}, {"text": "0:10", "like_count": 5}, {"text": "nice"}]"#,
        )
        .unwrap();
        let segments = shorts::select_highlights(&comments, &HighlightOptions::default());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].label, "2:00");
    }

    #[test]
    fn shell_join_quotes_filter_graphs() {
        let joined = shell_join(&[
            "-vf".to_string(),
            "hflip,fade=t=in:st=0:d=0.5".to_string(),
            "out.mp4".to_string(),
        ]);
        assert_eq!(joined, "-vf 'hflip,fade=t=in:st=0:d=0.5' out.mp4");
    }
}
