use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::segments::SegmentArgs;
use commands::*;

const BUILT_IN_COMMANDS: &[&str] = &[
    "list",
    "ls",
    "tools",
    "call",
    "segments",
    "highlights",
    "config",
    "help",
    "--help",
    "-h",
    "--version",
    "-V",
];

#[tokio::main]
async fn main() {
    let args = expand_shorthand(std::env::args().collect());
    let cli = Cli::parse_from(args);

    let default_filter = match cli.verbose {
        0 => "tubescout_cli=info,tubescout_core=warn",
        1 => "tubescout_cli=debug,tubescout_core=debug",
        _ => "tubescout_cli=trace,tubescout_core=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        None => show_overview().await,
        Some(Commands::List) => list::run(&cli).await,
        Some(Commands::Tools { connector }) => tools::run(&cli, connector.as_deref()).await,
        Some(Commands::Call {
            connector,
            tool,
            args,
            params,
        }) => call::run(&cli, connector, tool, args.as_deref(), params).await,
        Some(Commands::Segments {
            video,
            max,
            comments,
            no_overlap,
            ffmpeg,
        }) => {
            segments::run(
                &cli,
                SegmentArgs {
                    video,
                    max: *max,
                    comments: comments.as_deref(),
                    no_overlap: *no_overlap,
                    ffmpeg: *ffmpeg,
                },
            )
            .await
        }
        Some(Commands::Config { action }) => config::run(&cli, action.clone()).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

/// `tubescout youtube get_video x` becomes `tubescout call youtube get_video x`,
/// and `tubescout youtube` becomes `tubescout tools youtube`.
fn expand_shorthand(mut args: Vec<String>) -> Vec<String> {
    let mut idx = 1;
    while idx < args.len() && args[idx].starts_with('-') {
        // `--output` takes a separate value
        idx += if args[idx] == "--output" { 2 } else { 1 };
    }
    if idx >= args.len() || BUILT_IN_COMMANDS.contains(&args[idx].as_str()) {
        return args;
    }

    let has_tool_arg = args.iter().skip(idx + 1).any(|arg| !arg.starts_with('-'));
    let inserted = if has_tool_arg { "call" } else { "tools" };
    args.insert(idx, inserted.to_string());
    args
}

async fn show_overview() -> commands::Result<()> {
    println!();
    println!(
        "{}  {}",
        "tubescout".bold().cyan(),
        "- YouTube data and Short highlight finder".dimmed()
    );
    println!();

    let registry = list::create_registry().await?;
    let providers = registry.list_providers();

    let mut total_tools = 0;
    let mut ready = Vec::new();
    let mut need_auth = Vec::new();
    for info in &providers {
        let Some(provider) = registry.get_provider(&info.name) else {
            continue;
        };
        let c = provider.lock().await;
        if let Ok(tools) = c
            .list_tools(Some(tubescout_core::PaginatedRequestParam { cursor: None }))
            .await
        {
            total_tools += tools.tools.len();
        }
        if c.config_schema().requires_auth() && c.test_auth().await.is_err() {
            need_auth.push(info.name.clone());
        } else {
            ready.push(info.name.clone());
        }
    }

    println!(
        "  {} connectors, {} tools",
        providers.len().to_string().green().bold(),
        total_tools.to_string().green().bold()
    );
    println!();

    if !ready.is_empty() {
        println!("{}", "Ready:".bold().green());
        let names: Vec<_> = ready.iter().map(|n| n.cyan().to_string()).collect();
        println!("  {}", names.join(", "));
        println!();
    }
    if !need_auth.is_empty() {
        println!(
            "{}",
            "Need an API key (run 'tubescout config set <name>'):".bold().yellow()
        );
        let names: Vec<_> = need_auth.iter().map(|n| n.yellow().to_string()).collect();
        println!("  {}", names.join(", "));
        println!();
    }

    println!("{}", "Quick Start:".bold().cyan());
    println!(
        "  {}{}",
        "tubescout tools".cyan(),
        "                       Show all tools".dimmed()
    );
    println!(
        "  {}{}",
        "tubescout segments <video>".cyan(),
        "            Suggest Shorts from comment timestamps".dimmed()
    );
    println!(
        "  {}{}",
        "tubescout youtube get_video <id>".cyan(),
        "      Call a tool directly".dimmed()
    );
    println!();
    println!(
        "{} Use {} for full help",
        "Tip:".dimmed(),
        "tubescout --help".cyan()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn connector_with_tool_becomes_call() {
        assert_eq!(
            expand_shorthand(args(&["tubescout", "youtube", "get_video", "abc"])),
            args(&["tubescout", "call", "youtube", "get_video", "abc"])
        );
    }

    #[test]
    fn bare_connector_lists_tools() {
        assert_eq!(
            expand_shorthand(args(&["tubescout", "--output", "json", "transcripts"])),
            args(&["tubescout", "--output", "json", "tools", "transcripts"])
        );
        assert_eq!(
            expand_shorthand(args(&["tubescout", "youtube"])),
            args(&["tubescout", "tools", "youtube"])
        );
    }

    #[test]
    fn built_ins_are_untouched() {
        let original = args(&["tubescout", "segments", "abc", "--max", "2"]);
        assert_eq!(expand_shorthand(original.clone()), original);
        assert_eq!(expand_shorthand(args(&["tubescout"])), args(&["tubescout"]));
    }
}
