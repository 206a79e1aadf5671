use rmcp::model::ProtocolVersion;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tubescout_core::{
    auth_store::{AuthStore, FileAuthStore},
    mcp_server::{JsonRpcHandler, McpServer},
    transport::StdioTransport,
};

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        protocol = ?ProtocolVersion::LATEST,
        "Starting tubescout MCP server"
    );

    let store = Arc::new(FileAuthStore::new_default());
    info!(path = %store.config_path(), "Using credential store");

    let registry = tubescout_core::build_registry(Some(store.as_ref() as &dyn AuthStore)).await;
    let providers: Vec<String> = registry.list_providers().into_iter().map(|p| p.name).collect();
    info!(?providers, "Registered connectors");

    let server = McpServer::new(Arc::new(Mutex::new(registry))).with_store(store);
    let transport = StdioTransport::new(JsonRpcHandler::new(server));

    info!("MCP server ready, listening on stdio");

    tokio::select! {
        result = transport.run() => {
            if let Err(e) = result {
                error!(error = %e, "Transport error");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::InitializeRequestParam;
    use tubescout_core::ProviderRegistry;

    #[tokio::test]
    async fn initialize_reports_the_logged_protocol_version() {
        let server = McpServer::new(Arc::new(Mutex::new(ProviderRegistry::new())));
        let result = server
            .handle_initialize(InitializeRequestParam::default())
            .await
            .unwrap();
        assert_eq!(result.protocol_version, ProtocolVersion::LATEST);
        assert_eq!(result.server_info.name, "tubescout");
    }
}
