pub mod auth;
pub mod auth_store;
pub mod capabilities;
pub mod config;
pub mod connectors;
pub mod error;
pub mod mcp_server;
pub mod shorts;
pub mod transport;
pub mod utils;
use std::sync::Arc;

pub use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    PaginatedRequestParam, Prompt, ProtocolVersion, ReadResourceRequestParam, Resource,
    ResourceContents, ServerCapabilities, Tool,
};

use crate::auth::AuthDetails;
use crate::auth_store::AuthStore;
pub use crate::capabilities::ConnectorConfigSchema;
pub use crate::error::ConnectorError;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the unique name of the connector, used as the tool prefix.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn capabilities(&self) -> ServerCapabilities;

    async fn initialize(
        &self,
        request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError>;

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListResourcesResult, ConnectorError> {
        Ok(ListResourcesResult {
            resources: vec![],
            next_cursor: None,
        })
    }

    /// `ResourceNotFound` lets the server try the next connector.
    async fn read_resource(
        &self,
        _request: ReadResourceRequestParam,
    ) -> Result<Vec<ResourceContents>, ConnectorError> {
        Err(ConnectorError::ResourceNotFound)
    }

    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError>;

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError>;

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListPromptsResult, ConnectorError> {
        Ok(ListPromptsResult {
            prompts: vec![],
            next_cursor: None,
        })
    }

    async fn get_prompt(&self, name: &str) -> Result<Prompt, ConnectorError> {
        Err(ConnectorError::InvalidParams(format!(
            "Prompt with name {} not found",
            name
        )))
    }

    // --- Authentication and configuration ---

    async fn get_auth_details(&self) -> Result<AuthDetails, ConnectorError>;
    async fn set_auth_details(&mut self, details: AuthDetails) -> Result<(), ConnectorError>;
    async fn test_auth(&self) -> Result<(), ConnectorError>;
    fn config_schema(&self) -> ConnectorConfigSchema;
}

pub type SharedConnector = Arc<tokio::sync::Mutex<Box<dyn Connector>>>;

pub struct ProviderRegistry {
    pub providers: HashMap<String, SharedConnector>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry {
            providers: HashMap::new(),
        }
    }

    pub fn register_provider(&mut self, provider: Box<dyn Connector>) {
        self.providers.insert(
            provider.name().to_string(),
            Arc::new(tokio::sync::Mutex::new(provider)),
        );
    }

    pub fn get_provider(&self, name: &str) -> Option<&SharedConnector> {
        self.providers.get(name)
    }

    /// Registered connectors, sorted by name.
    pub fn list_providers(&self) -> Vec<ServerInfo> {
        let mut infos: Vec<ServerInfo> = self
            .providers
            .iter()
            .map(|(name, connector)| ServerInfo {
                name: name.clone(),
                description: connector
                    .try_lock()
                    .map(|c| c.description().to_string())
                    .unwrap_or_default(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a registry of the connectors enabled via Cargo features, asking
/// `resolve` for each connector's credentials.
pub async fn build_registry_with<F>(resolve: F) -> ProviderRegistry
where
    F: Fn(&str) -> AuthDetails,
{
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "youtube")]
    {
        match connectors::youtube::YouTubeConnector::new(resolve("youtube")).await {
            Ok(connector) => registry.register_provider(Box::new(connector)),
            Err(e) => tracing::warn!(error = %e, "Skipping youtube connector"),
        }
    }

    #[cfg(feature = "transcripts")]
    {
        match connectors::transcripts::TranscriptConnector::new(resolve("transcripts")).await {
            Ok(connector) => registry.register_provider(Box::new(connector)),
            Err(e) => tracing::warn!(error = %e, "Skipping transcripts connector"),
        }
    }

    #[cfg(not(any(feature = "youtube", feature = "transcripts")))]
    let _ = &resolve;

    registry
}

/// Build the default registry, resolving credentials from `store` and the environment.
pub async fn build_registry(store: Option<&dyn AuthStore>) -> ProviderRegistry {
    build_registry_with(|provider| config::resolve_auth(store, provider)).await
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub description: String,
}
