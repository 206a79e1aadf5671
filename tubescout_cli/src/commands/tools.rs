use crate::cli::{Cli, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, terminal_width, truncate_text, OutputData};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tubescout_core::{ConnectorConfigSchema, PaginatedRequestParam, ProviderRegistry, Tool};

pub async fn run(cli: &Cli, connector: Option<&str>) -> Result<()> {
    let registry = crate::commands::list::create_registry().await?;

    match connector {
        Some(connector_name) => show_connector_tools(cli, &registry, connector_name).await,
        None => show_all_tools(cli, &registry).await,
    }
}

async fn show_connector_tools(
    cli: &Cli,
    registry: &ProviderRegistry,
    connector_name: &str,
) -> Result<()> {
    let provider = registry
        .get_provider(connector_name)
        .ok_or_else(|| CommandError::ConnectorNotFound(connector_name.to_string()))?;

    let c = provider.lock().await;
    let tools = c
        .list_tools(Some(PaginatedRequestParam { cursor: None }))
        .await?
        .tools;
    let schema = c.config_schema();
    drop(c);

    match cli.output {
        OutputFormat::Pretty => format_pretty_connector_tools(connector_name, &tools, &schema),
        _ => {
            let data = OutputData::ToolsList {
                connector: Some(connector_name.to_string()),
                tools: json!({
                    "connector": connector_name,
                    "auth_required": schema.requires_auth(),
                    "auth_fields": schema.fields,
                    "tools": tools,
                }),
            };
            format_output(&data, &cli.output)
        }
    }
}

async fn show_all_tools(cli: &Cli, registry: &ProviderRegistry) -> Result<()> {
    let mut all_tools = Vec::new();

    for provider_info in registry.list_providers() {
        let Some(provider) = registry.get_provider(&provider_info.name) else {
            continue;
        };
        let c = provider.lock().await;
        let auth_required = c.config_schema().requires_auth();
        if let Ok(response) = c
            .list_tools(Some(PaginatedRequestParam { cursor: None }))
            .await
        {
            for tool in response.tools {
                all_tools.push(json!({
                    "connector": provider_info.name,
                    "name": tool.name,
                    "description": tool.description.as_deref().unwrap_or("No description"),
                    "input_schema": tool.input_schema,
                    "auth_required": auth_required,
                }));
            }
        }
    }

    match cli.output {
        OutputFormat::Pretty => format_pretty_all_tools(&all_tools),
        _ => format_output(
            &OutputData::ToolsList {
                connector: None,
                tools: json!(all_tools),
            },
            &cli.output,
        ),
    }
}

fn format_pretty_all_tools(tools: &[Value]) -> Result<()> {
    let term_width = terminal_width();
    let desc_width = term_width.saturating_sub(50);

    println!("{}", "Available Tools".bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(term_width as u16)
        .set_header(vec!["Connector", "Tool", "Auth", "Description"]);

    for tool in tools {
        let text = |key: &str| tool.get(key).and_then(Value::as_str).unwrap_or("").to_string();
        let auth = if tool["auth_required"].as_bool().unwrap_or(false) {
            "key"
        } else {
            ""
        };
        table.add_row(vec![
            text("connector"),
            text("name"),
            auth.to_string(),
            truncate_text(&text("description"), desc_width.max(30)),
        ]);
    }

    println!("{}", table);
    println!();
    println!(
        "{} Use {} to see parameters for a connector",
        "Tip:".dimmed(),
        "tubescout tools <connector>".cyan()
    );
    Ok(())
}

fn format_pretty_connector_tools(
    connector_name: &str,
    tools: &[Tool],
    schema: &ConnectorConfigSchema,
) -> Result<()> {
    println!("{} {}", "Tools for".bold().cyan(), connector_name.yellow());
    println!();

    if schema.requires_auth() {
        println!("  {}", "Authentication: required".yellow().bold());
        for field in &schema.fields {
            let req = if field.required { "*" } else { "" };
            println!("     {} {}{}", "•".dimmed(), field.label, req.red());
        }
        println!(
            "  {} {}",
            "Setup:".dimmed(),
            format!("tubescout config set {}", connector_name).cyan()
        );
    } else {
        println!("  {}", "Authentication: not required".green().bold());
    }
    println!();

    if tools.is_empty() {
        println!("{}", "No tools available for this connector".yellow());
        return Ok(());
    }

    let separator_width = terminal_width().min(80);
    for (i, tool) in tools.iter().enumerate() {
        if i > 0 {
            println!("{}", "─".repeat(separator_width).dimmed());
        }
        println!("{}", tool.name.cyan().bold());
        if let Some(description) = &tool.description {
            println!("  {}", description.dimmed());
        }
        print_parameters(&tool.input_schema);

        let example = match example_args(&tool.input_schema) {
            Some(args) => format!("tubescout call {} {} --args '{}'", connector_name, tool.name, args),
            None => format!("tubescout call {} {}", connector_name, tool.name),
        };
        println!("  {} {}", "Example:".bold(), example.cyan());
        println!();
    }

    Ok(())
}

fn print_parameters(schema: &Map<String, Value>) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    if properties.is_empty() {
        return;
    }
    let required = required_set(schema);

    println!("  {}", "Parameters:".bold());
    for (name, prop) in properties {
        let requirement = if required.contains(name.as_str()) {
            " (required)".red().to_string()
        } else {
            " (optional)".dimmed().to_string()
        };
        println!(
            "    {} {}{}",
            name.cyan(),
            format!("[{}]", param_type(prop)).dimmed(),
            requirement
        );
        if let Some(description) = prop.get("description").and_then(Value::as_str) {
            println!("      {}", description.dimmed());
        }
        if let Some(default) = prop.get("default") {
            println!("      {} {}", "Default:".dimmed(), default.to_string().dimmed());
        }
    }
}

fn required_set(schema: &Map<String, Value>) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// The JSON type of a property; `["string", "null"]` reads as `string`,
/// and enum references as `enum`.
fn param_type(prop: &Value) -> String {
    match prop.get("type") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("null")
            .to_string(),
        _ if prop.get("$ref").is_some() || prop.get("allOf").is_some() => "enum".to_string(),
        _ => "any".to_string(),
    }
}

/// Example arguments built from the required parameters.
fn example_args(schema: &Map<String, Value>) -> Option<String> {
    let props = schema.get("properties")?.as_object()?;
    let required = required_set(schema);

    let mut example = Map::new();
    for (name, prop) in props {
        if !required.contains(name.as_str()) {
            continue;
        }
        let value = match (param_type(prop).as_str(), name.as_str()) {
            ("string", "video_id") => json!("dQw4w9WgXcQ"),
            ("string", "query") => json!("rust tutorial"),
            ("string", "channel_id") => json!("UC_x5XG1OV2P6uZZ5FSM9Ttw"),
            ("string", "playlist_id") => json!("PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI"),
            ("integer" | "number", _) => json!(10),
            ("boolean", _) => json!(true),
            _ => json!(format!("<{}>", name)),
        };
        example.insert(name.clone(), value);
    }

    (!example.is_empty()).then(|| Value::Object(example).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn nullable_types_read_as_their_base_type() {
        assert_eq!(param_type(&json!({"type": ["string", "null"]})), "string");
        assert_eq!(param_type(&json!({"type": "integer"})), "integer");
        assert_eq!(param_type(&json!({"allOf": [{"$ref": "#/x"}]})), "enum");
    }

    #[test]
    fn examples_use_only_required_params() {
        let s = schema(json!({
            "properties": {
                "video_id": {"type": "string"},
                "max_segments": {"type": "integer"}
            },
            "required": ["video_id"]
        }));
        assert_eq!(example_args(&s).unwrap(), r#"{"video_id":"dQw4w9WgXcQ"}"#);

        let none = schema(json!({"properties": {"region_code": {"type": "string"}}}));
        assert!(example_args(&none).is_none());
    }
}
