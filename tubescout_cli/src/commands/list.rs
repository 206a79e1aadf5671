use crate::cli::{Cli, OutputFormat};
use crate::commands::Result;
use crate::output::{format_output, terminal_width, truncate_text, OutputData};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use tubescout_core::auth_store::{AuthStore, FileAuthStore};
use tubescout_core::ProviderRegistry;

pub async fn run(cli: &Cli) -> Result<()> {
    let registry = create_registry().await?;
    let providers = registry.list_providers();

    if providers.is_empty() {
        println!("{}", "No connectors available".yellow());
        return Ok(());
    }

    match cli.output {
        OutputFormat::Pretty => {
            let term_width = terminal_width();
            let desc_width = term_width.saturating_sub(40);

            println!("{}", "Available Connectors".bold().cyan());
            println!();

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_width(term_width as u16)
                .set_header(vec!["Name", "Description", "Auth"]);

            for provider in &providers {
                let auth = match registry.get_provider(&provider.name) {
                    Some(p) if p.lock().await.config_schema().requires_auth() => "api key",
                    _ => "none",
                };
                table.add_row(vec![
                    provider.name.clone(),
                    truncate_text(&provider.description, desc_width.max(30)),
                    auth.to_string(),
                ]);
            }

            println!("{}", table);
            println!();
            println!(
                "{} Use {} to see available tools for a connector",
                "Tip:".green().bold(),
                "tubescout tools <connector>".cyan()
            );
        }
        _ => format_output(&OutputData::ConnectorList(providers), &cli.output)?,
    }

    Ok(())
}

/// Registry of the compiled-in connectors, with saved credentials and
/// environment fallbacks applied.
pub async fn create_registry() -> Result<ProviderRegistry> {
    let store = FileAuthStore::new_default();
    Ok(tubescout_core::build_registry(Some(&store as &dyn AuthStore)).await)
}
