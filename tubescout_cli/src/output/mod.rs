use crate::cli::OutputFormat;
use crate::commands::Result;
use serde::Serialize;
use serde_json::Value;
use tubescout_core::shorts::{ClipPlan, HighlightSegment};
use tubescout_core::ServerInfo;

mod pretty;
pub use pretty::format_pretty;

const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    ConnectorList(Vec<ServerInfo>),
    ToolsList {
        connector: Option<String>,
        tools: Value,
    },
    CallResult {
        connector: String,
        tool: String,
        result: Value,
    },
    Segments {
        video_id: String,
        segments: Vec<HighlightSegment>,
        #[serde(skip_serializing_if = "Option::is_none")]
        plans: Option<Vec<ClipPlan>>,
    },
    ConfigInfo(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(data)?),
        OutputFormat::Text => print!("{}", format_text(data)?),
        OutputFormat::Pretty => format_pretty_output(data)?,
    }
    Ok(())
}

fn format_text(data: &OutputData) -> Result<String> {
    let mut out = String::new();
    match data {
        OutputData::ConnectorList(connectors) => {
            for connector in connectors {
                out.push_str(&format!("{}: {}\n", connector.name, connector.description));
            }
        }
        OutputData::ToolsList { connector, tools } => {
            match connector {
                Some(connector) => out.push_str(&format!("Tools for {}:\n", connector)),
                None => out.push_str("Available tools:\n"),
            }
            out.push_str(&serde_json::to_string_pretty(tools)?);
            out.push('\n');
        }
        OutputData::CallResult {
            connector,
            tool,
            result,
        } => {
            out.push_str(&format!("Call {}.{}\n", connector, tool));
            out.push_str(&serde_json::to_string_pretty(result)?);
            out.push('\n');
        }
        OutputData::Segments {
            video_id,
            segments,
            plans,
        } => {
            // One tab-separated line per segment.
            out.push_str(&format!("# {}\n", video_id));
            for s in segments {
                let effects: Vec<&str> = s.suggested_effects.iter().map(|e| e.as_str()).collect();
                out.push_str(&format!(
                    "{}\t{}\t{}\t{}\t{:.3}\t{}\n",
                    s.start_time,
                    s.duration,
                    s.engagement,
                    s.kind,
                    s.confidence,
                    effects.join(",")
                ));
            }
            for plan in plans.iter().flatten() {
                let output = format!("{}-short-{}.mp4", plan.video_id, plan.start_time);
                out.push_str(&format!(
                    "ffmpeg {}\n",
                    plan.to_ffmpeg_args(&format!("{}.mp4", plan.video_id), &output)
                        .join(" ")
                ));
            }
        }
        OutputData::ConfigInfo(config) => {
            out.push_str("Configuration:\n");
            out.push_str(&serde_json::to_string_pretty(config)?);
            out.push('\n');
        }
    }
    Ok(out)
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    use owo_colors::OwoColorize;

    match data {
        OutputData::ConnectorList(connectors) => {
            println!("{}", "Available Connectors".cyan().bold());
            println!();
            println!("{}", format_pretty(&serde_json::to_value(connectors)?));
        }
        OutputData::ToolsList { connector, tools } => {
            match connector {
                Some(connector) => println!("{} {}", "Tools for".dimmed(), connector.green().bold()),
                None => println!("{}", "Available Tools".cyan().bold()),
            }
            println!();
            println!("{}", format_pretty(tools));
        }
        OutputData::CallResult {
            connector,
            tool,
            result,
        } => {
            println!(
                "{} {}.{}",
                "Result:".dimmed(),
                connector.green(),
                tool.cyan().bold()
            );
            println!();
            println!("{}", format_pretty(result));
        }
        OutputData::Segments { video_id, .. } => {
            println!("{} {}", "Segments:".dimmed(), video_id.cyan().bold());
            println!();
            println!("{}", format_pretty(&serde_json::to_value(data)?["data"]));
        }
        OutputData::ConfigInfo(config) => {
            println!("{}", "Configuration".cyan().bold());
            println!();
            println!("{}", format_pretty(config));
        }
    }
    Ok(())
}

pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Cut `text` to `max_width` characters, ending in "..." when shortened.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        let kept: String = text.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    } else {
        text.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubescout_core::shorts::{select_highlights, CommentRecord, HighlightOptions};

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_text("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn segments_render_as_tab_separated_text() {
        let segments = select_highlights(
            &[CommentRecord::new("1:05 this part", 12)],
            &HighlightOptions::default(),
        );
        let text = format_text(&OutputData::Segments {
            video_id: "abc".into(),
            segments,
            plans: None,
        })
        .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# abc");
        assert!(lines[1].starts_with("65\t60\t12\tcomment\t"));
        assert!(lines[1].ends_with("blur-background"));
    }

    #[test]
    fn json_output_is_tagged() {
        let value = serde_json::to_value(OutputData::ConfigInfo(serde_json::json!({}))).unwrap();
        assert_eq!(value["type"], "ConfigInfo");
    }
}
