use crate::cli::{Cli, OutputFormat};
use crate::commands::{spinner, CommandError, Result};
use crate::output::{format_output, format_pretty, OutputData};
use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};
use tubescout_core::{CallToolRequestParam, PaginatedRequestParam};

pub async fn run(
    cli: &Cli,
    connector: &str,
    tool: &str,
    args_json: Option<&str>,
    params: &[String],
) -> Result<()> {
    let registry = crate::commands::list::create_registry().await?;
    let provider = registry
        .get_provider(connector)
        .ok_or_else(|| CommandError::ConnectorNotFound(connector.to_string()))?;

    let c = provider.lock().await;

    let mut args_map: Map<String, Value> = Map::new();

    if let Some(s) = args_json.filter(|s| !s.trim().is_empty()) {
        match serde_json::from_str::<Value>(s)? {
            Value::Object(m) => args_map = m,
            _ => {
                return Err(CommandError::InvalidInput(
                    "--args must be a JSON object".to_string(),
                ))
            }
        }
    }

    if !params.is_empty() {
        let tools = c
            .list_tools(Some(PaginatedRequestParam { cursor: None }))
            .await?
            .tools;
        let tool_def = tools
            .iter()
            .find(|t| t.name == tool)
            .ok_or_else(|| CommandError::ToolNotFound(tool.to_string(), connector.to_string()))?;
        args_map.extend(map_params(tool, &tool_def.input_schema, params)?);
    }

    let request = CallToolRequestParam {
        name: tool.to_string().into(),
        arguments: Some(args_map),
    };

    let progress = (cli.output == OutputFormat::Pretty)
        .then(|| spinner(format!("Calling {}/{}...", connector, tool)));
    let result = c.call_tool(request).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let result = match result {
        Ok(r) => r,
        Err(tubescout_core::ConnectorError::ToolNotFound) => {
            return Err(CommandError::ToolNotFound(
                tool.to_string(),
                connector.to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    // Prefer structured content; fall back to the raw result.
    let payload = match result.structured_content.clone() {
        Some(sc) => sc,
        None => serde_json::to_value(&result).unwrap_or_else(|_| json!({"ok": true})),
    };

    match cli.output {
        OutputFormat::Pretty => {
            println!(
                "{} {}.{}",
                "Call".bold().cyan(),
                connector.yellow(),
                tool.cyan()
            );
            println!();
            println!("{}", format_pretty(&payload));
        }
        _ => {
            let data = OutputData::CallResult {
                connector: connector.to_string(),
                tool: tool.to_string(),
                result: payload,
            };
            format_output(&data, &cli.output)?;
        }
    }

    Ok(())
}

/// Map `--name value`, `--name=value`, bare flags and positional values onto a
/// tool's parameters. Positional values fill required parameters first, then
/// the rest in schema order; `--` forces everything after it to be positional.
fn map_params(
    tool: &str,
    schema: &Map<String, Value>,
    params: &[String],
) -> Result<Map<String, Value>> {
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut param_names: Vec<String> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    for key in properties.keys() {
        if !param_names.contains(key) {
            param_names.push(key.clone());
        }
    }

    let mut positional: Vec<&str> = Vec::new();
    let mut named: Vec<(String, String)> = Vec::new();
    let mut force_positional = false;
    let mut i = 0;

    while i < params.len() {
        let param = params[i].as_str();

        if param == "--" && !force_positional {
            force_positional = true;
            i += 1;
            continue;
        }

        if !force_positional {
            if let Some(flag) = param.strip_prefix("--") {
                if let Some((name, value)) = flag.split_once('=') {
                    named.push((name.replace('-', "_"), value.to_string()));
                    i += 1;
                } else if i + 1 < params.len() && !params[i + 1].starts_with("--") {
                    named.push((flag.replace('-', "_"), params[i + 1].clone()));
                    i += 2;
                } else {
                    named.push((flag.replace('-', "_"), "true".to_string()));
                    i += 1;
                }
                continue;
            }
        }

        positional.push(param);
        i += 1;
    }

    if positional.len() > param_names.len() {
        return Err(CommandError::InvalidInput(format!(
            "Too many arguments. Tool '{}' accepts at most {} positional arguments ({}), got {}.",
            tool,
            param_names.len(),
            param_names.join(", "),
            positional.len()
        )));
    }

    let mut args = Map::new();
    for (name, raw) in param_names.iter().zip(positional) {
        args.insert(name.clone(), coerce(raw, properties.get(name)));
    }
    for (name, raw) in named {
        let value = coerce(&raw, properties.get(&name));
        args.insert(name, value);
    }
    Ok(args)
}

/// Convert a command-line string to the JSON type the schema declares.
/// Unknown parameters get a best guess.
fn coerce(raw: &str, prop: Option<&Value>) -> Value {
    let declared = prop.and_then(|p| match p.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).find(|t| *t != "null"),
        _ => None,
    });

    match declared {
        Some("string") => json!(raw),
        Some("integer") => raw.parse::<i64>().map(|n| json!(n)).unwrap_or_else(|_| json!(raw)),
        Some("number") => raw.parse::<f64>().map(|n| json!(n)).unwrap_or_else(|_| json!(raw)),
        Some("boolean") => raw.parse::<bool>().map(|b| json!(b)).unwrap_or_else(|_| json!(raw)),
        Some("array") => json!(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()),
        _ if prop.is_some() => json!(raw),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                json!(n)
            } else if let Ok(b) = raw.parse::<bool>() {
                json!(b)
            } else {
                json!(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Map<String, Value> {
        json!({
            "properties": {
                "query": {"type": "string"},
                "max_results": {"type": "integer"},
                "channel_id": {"type": ["string", "null"]},
                "effects": {"type": "array"}
            },
            "required": ["query"]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positional_fills_required_first() {
        let args = map_params("search_videos", &schema(), &strings(&["1984", "--max-results", "5"]))
            .unwrap();
        assert_eq!(args["query"], json!("1984"));
        assert_eq!(args["max_results"], json!(5));
    }

    #[test]
    fn equals_flags_and_lists() {
        let args = map_params(
            "plan_short",
            &schema(),
            &strings(&["--channel-id=UC1", "--effects", "fade, mirror", "q"]),
        )
        .unwrap();
        assert_eq!(args["channel_id"], json!("UC1"));
        assert_eq!(args["effects"], json!(["fade", "mirror"]));
        assert_eq!(args["query"], json!("q"));
    }

    #[test]
    fn double_dash_forces_positional() {
        let args = map_params("search_videos", &schema(), &strings(&["--", "--weird"])).unwrap();
        assert_eq!(args["query"], json!("--weird"));
    }

    #[test]
    fn too_many_positionals_is_an_error() {
        let err = map_params("t", &schema(), &strings(&["a", "b", "c", "d", "e"])).unwrap_err();
        assert!(err.to_string().contains("at most 4"));
    }
}
