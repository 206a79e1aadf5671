use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;
use serde_json::{json, Value};
use std::io::{self, Write};
use tubescout_core::auth_store::{AuthStore, FileAuthStore};
use tubescout_core::capabilities::FieldType;
use tubescout_core::config::ENV_FALLBACKS;

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    let store = FileAuthStore::new_default();
    match action {
        ConfigAction::Show => show_config(cli, &store),
        ConfigAction::Set {
            connector,
            field,
            value,
        } => set_config(&store, &connector, field.as_deref(), value).await,
        ConfigAction::Remove { connector, yes } => remove_config(&store, &connector, yes),
        ConfigAction::Test { connector } => test_config(&connector).await,
    }
}

fn show_config(cli: &Cli, store: &dyn AuthStore) -> Result<()> {
    let providers = store.list_providers();
    let config = masked_config(store, &providers);

    match cli.output {
        OutputFormat::Pretty => {
            println!("{}", "Configured Connectors".bold().cyan());
            println!();

            if providers.is_empty() {
                println!("{}", "No connectors configured yet.".yellow());
            } else {
                for provider in &providers {
                    let fields: Vec<String> = store
                        .load(provider)
                        .map(|a| {
                            let mut keys: Vec<String> = a.keys().cloned().collect();
                            keys.sort();
                            keys
                        })
                        .unwrap_or_default();
                    println!("  {} - {}", provider.cyan().bold(), fields.join(", "));
                }
            }

            println!();
            println!("{}", "Environment fallbacks:".bold());
            for (provider, field, var) in ENV_FALLBACKS {
                let state = if std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false) {
                    "set".green().to_string()
                } else {
                    "unset".dimmed().to_string()
                };
                println!("  {} -> {}.{} ({})", var, provider, field, state);
            }
            println!();
        }
        _ => format_output(&OutputData::ConfigInfo(config), &cli.output)?,
    }

    Ok(())
}

/// Field names per provider with values replaced by `***`.
fn masked_config(store: &dyn AuthStore, providers: &[String]) -> Value {
    let mut config = json!({});
    for provider in providers {
        if let Some(auth) = store.load(provider) {
            let mut provider_config = json!({});
            for key in auth.keys() {
                provider_config[key] = json!("***");
            }
            config[provider] = provider_config;
        }
    }
    config
}

async fn set_config(
    store: &dyn AuthStore,
    connector: &str,
    field: Option<&str>,
    value: Option<String>,
) -> Result<()> {
    let registry = crate::commands::list::create_registry().await?;
    let provider = registry
        .get_provider(connector)
        .ok_or_else(|| CommandError::ConnectorNotFound(connector.to_string()))?;
    let schema = provider.lock().await.config_schema();

    let field_def = match field {
        Some(name) => schema.fields.iter().find(|f| f.name == name).ok_or_else(|| {
            let known: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
            CommandError::InvalidConfig(format!(
                "Unknown field '{}' for {}. Known fields: {}",
                name,
                connector,
                known.join(", ")
            ))
        })?,
        None => schema.fields.first().ok_or_else(|| {
            CommandError::InvalidConfig(format!("{} has no settings", connector))
        })?,
    };

    let value = match value {
        Some(v) => v,
        None => prompt_value(&field_def.label, field_def.field_type == FieldType::Secret)?,
    };
    if value.trim().is_empty() {
        return Err(CommandError::InvalidInput("value must not be empty".to_string()));
    }

    let mut auth = store.load(connector).unwrap_or_default();
    auth.insert(field_def.name.clone(), value.trim().to_string());
    store.save(connector, &auth)?;

    println!(
        "{} {} saved for {}",
        "Success!".green().bold(),
        field_def.label,
        connector.cyan()
    );
    println!(
        "Test with: {}",
        format!("tubescout config test {}", connector).cyan()
    );
    Ok(())
}

fn prompt_value(label: &str, secret: bool) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    if secret {
        // Falls back to plain input when there is no TTY.
        if let Ok(v) = rpassword::read_password() {
            return Ok(v);
        }
    }
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn remove_config(store: &dyn AuthStore, connector: &str, yes: bool) -> Result<()> {
    if store.load(connector).is_none() {
        println!(
            "{} No configuration found for {}",
            "Note:".yellow().bold(),
            connector.cyan()
        );
        return Ok(());
    }

    if !yes {
        print!(
            "Remove all settings for {}? [y/N] ",
            connector.cyan().bold()
        );
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.remove(connector)?;
    println!(
        "{} Removed configuration for {}",
        "Success!".green().bold(),
        connector.cyan()
    );
    Ok(())
}

async fn test_config(connector: &str) -> Result<()> {
    print!("{} {} ... ", "Testing".bold().cyan(), connector.cyan());
    io::stdout().flush()?;

    // The registry already carries stored and environment credentials.
    let registry = crate::commands::list::create_registry().await?;
    let provider = registry
        .get_provider(connector)
        .ok_or_else(|| CommandError::ConnectorNotFound(connector.to_string()))?;

    let result = provider.lock().await.test_auth().await;
    match result {
        Ok(()) => {
            println!("{}", "Success!".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}", "Failed".red().bold());
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubescout_core::auth::AuthDetails;
    use tubescout_core::auth_store::MemoryAuthStore;

    #[test]
    fn masked_config_hides_values() {
        let store = MemoryAuthStore::new();
        let mut auth = AuthDetails::new();
        auth.insert("api_key".into(), "AIzaSecret".into());
        store.save("youtube", &auth).unwrap();

        let config = masked_config(&store, &store.list_providers());
        assert_eq!(config["youtube"]["api_key"], "***");
        assert!(!config.to_string().contains("AIzaSecret"));
    }
}
