use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tubescout")]
#[command(about = "tubescout - YouTube data and Short highlight finder")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  tubescout list                              List available connectors
  tubescout tools youtube                     Show YouTube tools
  tubescout segments dQw4w9WgXcQ              Find the best Short candidates
  tubescout youtube get_video dQw4w9WgXcQ     Call a tool directly

\x1b[1;36mAuthentication:\x1b[0m
  tubescout config set youtube --value <key>  Save a YouTube Data API key
  tubescout config test youtube               Test the key
  export YOUTUBE_API_KEY=...                  Or use the environment")]
#[command(long_about = "
\x1b[1mtubescout\x1b[0m - YouTube data and Short highlight finder

Viewers leave timestamps in comments when something good happens. tubescout
collects those timestamps, scores a 60 second window around each one by the
likes it gathers, and suggests the strongest windows as Shorts, together
with effects to apply when cutting them.
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available connectors
    #[command(alias = "ls")]
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  tubescout list                    Show all connectors
  tubescout list --output json      Output as JSON")]
    List,

    /// List tools, for all connectors or one
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  tubescout tools                   List every tool
  tubescout tools transcripts       Show transcript tools")]
    Tools {
        /// Connector name to filter tools (omit to show all)
        connector: Option<String>,
    },

    /// Call a tool directly from a connector
    ///
    /// Shorthand: `tubescout <connector> <tool> [args...]`. Positional
    /// arguments fill the tool's required parameters in order.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  tubescout call youtube search_videos \"rust tutorial\" --max-results 5
  tubescout call youtube get_comments --args '{\"video_id\": \"dQw4w9WgXcQ\"}'
  tubescout call transcripts search_transcript dQw4w9WgXcQ \"never gonna\"")]
    Call {
        /// Connector name (youtube, transcripts)
        connector: String,
        /// Tool name (e.g., get_video, find_short_segments)
        tool: String,
        /// JSON arguments (e.g., '{"video_id": "dQw4w9WgXcQ"}')
        #[arg(long, conflicts_with = "params")]
        args: Option<String>,
        /// Positional or --named arguments for the tool
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        params: Vec<String>,
    },

    /// Find highlight segments for a video
    ///
    /// Fetches comments through the YouTube Data API, or reads them from a
    /// JSON file with --comments (an array of {"text", "like_count"} objects).
    #[command(alias = "highlights")]
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  tubescout segments dQw4w9WgXcQ
  tubescout segments https://youtu.be/dQw4w9WgXcQ --max 5 --no-overlap
  tubescout segments dQw4w9WgXcQ --comments comments.json --ffmpeg")]
    Segments {
        /// Video id or URL
        video: String,
        /// Maximum number of segments to return
        #[arg(short, long, default_value_t = 3)]
        max: usize,
        /// Read comments from a JSON file instead of the API
        #[arg(long)]
        comments: Option<PathBuf>,
        /// Drop segments overlapping a better-ranked one
        #[arg(long)]
        no_overlap: bool,
        /// Print an ffmpeg command for each segment
        #[arg(long)]
        ffmpeg: bool,
    },

    /// Manage connector credentials and settings
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  tubescout config show
  tubescout config set youtube --value AIza...
  tubescout config set transcripts --field language --value de
  tubescout config test youtube
  tubescout config remove youtube")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show saved configuration (values masked)
    Show,
    /// Save a setting for a connector
    Set {
        /// Connector name
        connector: String,
        /// Field to set; defaults to the connector's first field
        #[arg(long)]
        field: Option<String>,
        /// Value to store; prompted for (hidden) when omitted
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove saved settings for a connector
    Remove {
        /// Connector name
        connector: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Test authentication for a connector
    Test {
        /// Connector name
        connector: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_flags_parse() {
        let cli = Cli::parse_from([
            "tubescout",
            "segments",
            "abc",
            "--max",
            "5",
            "--no-overlap",
            "--output",
            "json",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Some(Commands::Segments {
                video,
                max,
                no_overlap,
                comments,
                ffmpeg,
            }) => {
                assert_eq!(video, "abc");
                assert_eq!(max, 5);
                assert!(no_overlap);
                assert!(comments.is_none());
                assert!(!ffmpeg);
            }
            _ => panic!("expected segments"),
        }
    }

    #[test]
    fn call_collects_trailing_params() {
        let cli = Cli::parse_from([
            "tubescout",
            "call",
            "youtube",
            "search_videos",
            "rust",
            "--max-results",
            "5",
        ]);
        match cli.command {
            Some(Commands::Call { params, args, .. }) => {
                assert!(args.is_none());
                assert_eq!(params, vec!["rust", "--max-results", "5"]);
            }
            _ => panic!("expected call"),
        }
    }
}
