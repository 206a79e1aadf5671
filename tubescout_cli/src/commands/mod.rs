pub mod call;
pub mod config;
pub mod list;
pub mod segments;
pub mod tools;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Connector '{0}' not found")]
    ConnectorNotFound(String),

    #[error("Tool '{0}' not found for connector '{1}'")]
    ToolNotFound(String, String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Core library error: {0}")]
    Core(#[from] tubescout_core::error::ConnectorError),

    #[error("Credential store error: {0}")]
    Store(#[from] tubescout_core::auth_store::StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Spinner on stderr while a network call is in flight.
pub fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
