use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    auth::AuthDetails,
    auth_store::AuthStore,
    utils::{empty_input_schema, structured_result_with_text},
    ConnectorError, ProviderRegistry, SharedConnector,
};
use rmcp::model::*;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct AuthState {
    authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorized_at: Option<String>,
}

/// MCP server over a [`ProviderRegistry`]; tools are exposed as `connector/tool`.
pub struct McpServer {
    registry: Arc<Mutex<ProviderRegistry>>,
    auth_status: Arc<Mutex<HashMap<String, AuthState>>>,
    store: Option<Arc<dyn AuthStore>>,
}

impl McpServer {
    pub fn new(registry: Arc<Mutex<ProviderRegistry>>) -> Self {
        Self {
            registry,
            auth_status: Arc::new(Mutex::new(HashMap::new())),
            store: None,
        }
    }

    /// Persist credentials given through `secrets/set` into `store`.
    pub fn with_store(mut self, store: Arc<dyn AuthStore>) -> Self {
        self.store = Some(store);
        self
    }

    async fn connectors(&self) -> Vec<(String, SharedConnector)> {
        let registry = self.registry.lock().await;
        let mut connectors: Vec<(String, SharedConnector)> = registry
            .providers
            .iter()
            .map(|(name, c)| (name.clone(), c.clone()))
            .collect();
        connectors.sort_by(|a, b| a.0.cmp(&b.0));
        connectors
    }

    async fn connector(&self, name: &str) -> Result<SharedConnector, ConnectorError> {
        let registry = self.registry.lock().await;
        registry
            .get_provider(name)
            .cloned()
            .ok_or_else(|| ConnectorError::InvalidInput(format!("Unknown connector: {}", name)))
    }

    /// Union of the capabilities advertised by the connectors.
    pub async fn get_capabilities(&self) -> ServerCapabilities {
        let mut capabilities = ServerCapabilities::default();
        for (_name, connector) in self.connectors().await {
            let conn_caps = connector.lock().await.capabilities().await;
            if conn_caps.tools.is_some() {
                capabilities.tools = conn_caps.tools;
            }
            if conn_caps.resources.is_some() {
                capabilities.resources = conn_caps.resources;
            }
            if conn_caps.prompts.is_some() {
                capabilities.prompts = conn_caps.prompts;
            }
        }
        capabilities
    }

    pub async fn handle_initialize(
        &self,
        _request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError> {
        info!("MCP server initializing");

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.get_capabilities().await,
            server_info: Implementation {
                name: "tubescout".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "YouTube metadata, comments and transcripts, plus highlight segment selection for Shorts. \
                 Use youtube/find_short_segments to locate the moments viewers talk about."
                    .to_string(),
            ),
        })
    }

    pub async fn handle_list_resources(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListResourcesResult, ConnectorError> {
        let mut all_resources = Vec::new();
        for (name, connector) in self.connectors().await {
            let c = connector.lock().await;
            match c.list_resources(request.clone()).await {
                Ok(response) => all_resources.extend(response.resources),
                Err(e) => error!(connector = %name, error = %e, "Error listing resources"),
            }
        }

        Ok(ListResourcesResult {
            resources: all_resources,
            next_cursor: None,
        })
    }

    /// The first connector that recognises the URI answers.
    pub async fn handle_read_resource(
        &self,
        request: ReadResourceRequestParam,
    ) -> Result<Vec<ResourceContents>, ConnectorError> {
        for (_name, connector) in self.connectors().await {
            let c = connector.lock().await;
            match c.read_resource(request.clone()).await {
                Ok(contents) => return Ok(contents),
                Err(ConnectorError::ResourceNotFound) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(ConnectorError::ResourceNotFound)
    }

    pub async fn handle_list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let connectors = self.connectors().await;
        let mut all_tools = Vec::new();

        for (connector_name, connector) in connectors.iter() {
            let c = connector.lock().await;
            match c.list_tools(request.clone()).await {
                Ok(response) => {
                    all_tools.extend(response.tools.into_iter().map(|mut tool| {
                        tool.name = format!("{}/{}", connector_name, tool.name).into();
                        tool
                    }));
                }
                Err(e) => error!(connector = %connector_name, error = %e, "Error listing tools"),
            }
        }

        for (connector_name, connector) in connectors.iter() {
            let schema = connector.lock().await.config_schema();

            all_tools.push(Tool {
                name: format!("auth/{}/set", connector_name).into(),
                title: None,
                description: Some(
                    format!("Set credentials or settings for '{}'.", connector_name).into(),
                ),
                input_schema: Arc::new(schema.to_json_schema()),
                output_schema: None,
                annotations: None,
                icons: None,
            });
            all_tools.push(Tool {
                name: format!("auth/{}/test", connector_name).into(),
                title: None,
                description: Some("Test authentication for the connector.".into()),
                input_schema: empty_input_schema(),
                output_schema: None,
                annotations: None,
                icons: None,
            });
            all_tools.push(Tool {
                name: format!("auth/{}/get_schema", connector_name).into(),
                title: None,
                description: Some("Return the JSON schema of the connector's settings.".into()),
                input_schema: empty_input_schema(),
                output_schema: None,
                annotations: None,
                icons: None,
            });
        }

        Ok(ListToolsResult {
            tools: all_tools,
            next_cursor: None,
        })
    }

    async fn handle_auth_tool(
        &self,
        provider: &str,
        action: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> Result<CallToolResult, ConnectorError> {
        let connector = self.connector(provider).await?;

        match action {
            "set" => {
                let details = auth_details_from_json(arguments.unwrap_or_default());
                connector.lock().await.set_auth_details(details).await?;
                structured_result_with_text(&json!({"ok": true}), None)
            }
            "test" => {
                connector.lock().await.test_auth().await?;
                structured_result_with_text(&json!({"ok": true}), None)
            }
            "get_schema" => {
                let schema = connector.lock().await.config_schema();
                structured_result_with_text(&json!({"schema": schema.to_json_schema()}), None)
            }
            _ => Err(ConnectorError::ToolNotFound),
        }
    }

    /// Route `connector/tool` to the connector, or `auth/<provider>/<action>` to
    /// the credential helpers.
    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let parts: Vec<&str> = request.name.split('/').collect();
        match parts.as_slice() {
            ["auth", provider, action] => {
                self.handle_auth_tool(provider, action, request.arguments)
                    .await
            }
            ["auth", ..] => Err(ConnectorError::InvalidInput(
                "Auth tool must be 'auth/<provider>/<action>'".into(),
            )),
            [connector_name, tool_name] => {
                let connector = self.connector(connector_name).await?;
                debug!(connector = %connector_name, tool = %tool_name, "Calling tool");
                let unprefixed = CallToolRequestParam {
                    name: tool_name.to_string().into(),
                    arguments: request.arguments,
                };
                let c = connector.lock().await;
                c.call_tool(unprefixed).await
            }
            _ => Err(ConnectorError::InvalidInput(format!(
                "Tool name must be 'connector/tool' or 'auth/<provider>/<action>', got: {}",
                request.name
            ))),
        }
    }

    pub async fn handle_list_prompts(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListPromptsResult, ConnectorError> {
        let mut all_prompts = Vec::new();
        for (connector_name, connector) in self.connectors().await {
            let c = connector.lock().await;
            match c.list_prompts(request.clone()).await {
                Ok(response) => {
                    all_prompts.extend(response.prompts.into_iter().map(|mut prompt| {
                        prompt.name = format!("{}/{}", connector_name, prompt.name);
                        prompt
                    }));
                }
                Err(e) => error!(connector = %connector_name, error = %e, "Error listing prompts"),
            }
        }

        Ok(ListPromptsResult {
            prompts: all_prompts,
            next_cursor: None,
        })
    }

    pub async fn handle_get_prompt(&self, name: &str) -> Result<Prompt, ConnectorError> {
        let Some((connector_name, prompt_name)) = name.split_once('/') else {
            return Err(ConnectorError::InvalidInput(format!(
                "Prompt name must be in format 'connector/prompt', got: {}",
                name
            )));
        };

        let connector = self.connector(connector_name).await?;
        let c = connector.lock().await;
        let mut prompt = c.get_prompt(prompt_name).await?;
        prompt.name = name.to_string();
        Ok(prompt)
    }

    /// One entry per connector: its fields and whether any are required.
    pub async fn describe_authorization(&self) -> Value {
        let mut schemes = Vec::new();
        for (name, connector) in self.connectors().await {
            let schema = connector.lock().await.config_schema();
            let has_secret = schema
                .fields
                .iter()
                .any(|f| f.field_type == crate::capabilities::FieldType::Secret);
            schemes.push(json!({
                "provider": name,
                "type": if has_secret { "api_key" } else if schema.fields.is_empty() { "none" } else { "settings" },
                "requires_auth": schema.requires_auth(),
                "fields": schema.fields,
            }));
        }
        json!({ "schemes": schemes })
    }

    async fn set_secrets(
        &self,
        provider: &str,
        details: AuthDetails,
    ) -> Result<Value, ConnectorError> {
        let connector = self.connector(provider).await?;
        {
            let mut c = connector.lock().await;
            c.set_auth_details(details.clone()).await?;
            c.test_auth().await?;
        }

        if let Some(store) = &self.store {
            store
                .save(provider, &details)
                .map_err(|e| ConnectorError::Other(e.to_string()))?;
        }

        self.auth_status.lock().await.insert(
            provider.to_string(),
            AuthState {
                authorized: true,
                authorized_at: Some(chrono::Utc::now().to_rfc3339()),
            },
        );
        info!(provider, "Credentials updated");
        Ok(json!({"ok": true}))
    }

    async fn delete_secrets(&self, provider: &str) -> Result<Value, ConnectorError> {
        let connector = self.connector(provider).await?;
        connector
            .lock()
            .await
            .set_auth_details(AuthDetails::new())
            .await?;

        if let Some(store) = &self.store {
            if let Err(e) = store.remove(provider) {
                warn!(provider, error = %e, "Failed to remove stored credentials");
            }
        }

        self.auth_status.lock().await.insert(
            provider.to_string(),
            AuthState {
                authorized: false,
                authorized_at: None,
            },
        );
        Ok(json!({"ok": true}))
    }
}

fn auth_details_from_json(map: serde_json::Map<String, Value>) -> AuthDetails {
    let mut details = AuthDetails::new();
    for (k, v) in map {
        match v {
            Value::String(s) => {
                details.insert(k, s);
            }
            Value::Number(_) | Value::Bool(_) => {
                details.insert(k, v.to_string());
            }
            _ => {}
        }
    }
    details
}

fn provider_param(params: &Value) -> Result<String, ConnectorError> {
    params
        .get("provider")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConnectorError::InvalidParams("Missing provider".to_string()))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, ConnectorError> {
    serde_json::to_value(value).map_err(ConnectorError::SerdeJson)
}

/// JSON-RPC message handler for the MCP server
pub struct JsonRpcHandler {
    server: McpServer,
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        match method {
            "initialize" => {
                let req: InitializeRequestParam = serde_json::from_value(params)?;
                to_json(self.server.handle_initialize(req).await?)
            }
            "ping" => Ok(json!({})),
            "resources/list" => {
                let req: Option<PaginatedRequestParam> = serde_json::from_value(params)?;
                to_json(self.server.handle_list_resources(req).await?)
            }
            "resources/read" => {
                let req: ReadResourceRequestParam = serde_json::from_value(params)?;
                let contents = self.server.handle_read_resource(req).await?;
                Ok(json!({ "contents": contents }))
            }
            "tools/list" => {
                let req: Option<PaginatedRequestParam> = serde_json::from_value(params)?;
                to_json(self.server.handle_list_tools(req).await?)
            }
            "tools/call" => {
                let req: CallToolRequestParam = serde_json::from_value(params)?;
                to_json(self.server.handle_call_tool(req).await?)
            }
            "prompts/list" => {
                let req: Option<PaginatedRequestParam> = serde_json::from_value(params)?;
                to_json(self.server.handle_list_prompts(req).await?)
            }
            "prompts/get" => match params.get("name").and_then(Value::as_str) {
                Some(name) => to_json(self.server.handle_get_prompt(name).await?),
                None => Err(ConnectorError::InvalidInput(
                    "Missing 'name' parameter".to_string(),
                )),
            },
            "authorization/describe" => Ok(self.server.describe_authorization().await),
            "authorization/status" => {
                let mut providers: Vec<Value> = self
                    .server
                    .auth_status
                    .lock()
                    .await
                    .iter()
                    .map(|(provider, st)| {
                        json!({
                            "provider": provider,
                            "authorized": st.authorized,
                            "authorized_at": st.authorized_at,
                        })
                    })
                    .collect();
                providers.sort_by(|a, b| {
                    a["provider"]
                        .as_str()
                        .unwrap_or_default()
                        .cmp(b["provider"].as_str().unwrap_or_default())
                });
                Ok(json!({ "providers": providers }))
            }
            "secrets/set" => {
                let provider = provider_param(&params)?;
                let secrets = params
                    .get("secrets")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                self.server
                    .set_secrets(&provider, auth_details_from_json(secrets))
                    .await
            }
            "secrets/delete" => {
                let provider = provider_param(&params)?;
                self.server.delete_secrets(&provider).await
            }
            _ => Err(ConnectorError::MethodNotFound),
        }
    }

    /// Process a JSON-RPC request and return a response
    pub async fn handle_request(&self, request: Value) -> Value {
        debug!(request = %request, "Handling JSON-RPC request");

        let id = request.get("id").cloned();
        let method = request.get("method").and_then(Value::as_str).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(json!({}));
        // Treat `null` params like absent ones.
        let params = if params.is_null() { json!({}) } else { params };

        match self.dispatch(method, params).await {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(e) => {
                debug!(method, error = %e, "JSON-RPC request failed");
                json!({
                    "jsonrpc": "2.0",
                    "error": e.to_jsonrpc_error(),
                    "id": id,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_store::MemoryAuthStore;
    use crate::capabilities::{ConnectorConfigSchema, Field, FieldType};
    use crate::Connector;
    use async_trait::async_trait;

    struct EchoConnector {
        token: Option<String>,
    }

    #[async_trait]
    impl Connector for EchoConnector {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes its arguments"
        }

        async fn capabilities(&self) -> ServerCapabilities {
            ServerCapabilities::default()
        }

        async fn initialize(
            &self,
            _request: InitializeRequestParam,
        ) -> Result<InitializeResult, ConnectorError> {
            Err(ConnectorError::MethodNotFound)
        }

        async fn list_tools(
            &self,
            _request: Option<PaginatedRequestParam>,
        ) -> Result<ListToolsResult, ConnectorError> {
            Ok(ListToolsResult {
                tools: vec![Tool {
                    name: "say".into(),
                    title: None,
                    description: None,
                    input_schema: empty_input_schema(),
                    output_schema: None,
                    annotations: None,
                    icons: None,
                }],
                next_cursor: None,
            })
        }

        async fn call_tool(
            &self,
            request: CallToolRequestParam,
        ) -> Result<CallToolResult, ConnectorError> {
            match request.name.as_ref() {
                "say" => structured_result_with_text(&Value::Object(request.arguments.unwrap_or_default()), None),
                _ => Err(ConnectorError::ToolNotFound),
            }
        }

        async fn get_auth_details(&self) -> Result<AuthDetails, ConnectorError> {
            let mut d = AuthDetails::new();
            if let Some(t) = &self.token {
                d.insert("token".into(), t.clone());
            }
            Ok(d)
        }

        async fn set_auth_details(&mut self, details: AuthDetails) -> Result<(), ConnectorError> {
            self.token = details.get("token").cloned();
            Ok(())
        }

        async fn test_auth(&self) -> Result<(), ConnectorError> {
            match self.token.as_deref() {
                Some("good") => Ok(()),
                _ => Err(ConnectorError::Authentication("bad token".into())),
            }
        }

        fn config_schema(&self) -> ConnectorConfigSchema {
            ConnectorConfigSchema {
                fields: vec![Field::new("token", "Token", FieldType::Secret).required()],
            }
        }
    }

    fn handler_with_store(store: Arc<MemoryAuthStore>) -> JsonRpcHandler {
        let mut registry = ProviderRegistry::new();
        registry.register_provider(Box::new(EchoConnector { token: None }));
        let server = McpServer::new(Arc::new(Mutex::new(registry))).with_store(store);
        JsonRpcHandler::new(server)
    }

    fn rpc(method: &str, params: Value) -> Value {
        json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params})
    }

    #[tokio::test]
    async fn tools_are_prefixed_and_auth_tools_added() {
        let handler = handler_with_store(Arc::new(MemoryAuthStore::new()));
        let resp = handler.handle_request(rpc("tools/list", json!({}))).await;
        let names: Vec<&str> = resp["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["echo/say", "auth/echo/set", "auth/echo/test", "auth/echo/get_schema"]
        );
    }

    #[tokio::test]
    async fn calls_route_to_the_connector() {
        let handler = handler_with_store(Arc::new(MemoryAuthStore::new()));
        let resp = handler
            .handle_request(rpc(
                "tools/call",
                json!({"name": "echo/say", "arguments": {"word": "hi"}}),
            ))
            .await;
        assert!(resp["result"].to_string().contains(r#""word":"hi""#));

        let resp = handler
            .handle_request(rpc("tools/call", json!({"name": "nope/say"})))
            .await;
        assert_eq!(resp["error"]["code"], -32602);

        let resp = handler
            .handle_request(rpc("tools/call", json!({"name": "echo/shout"})))
            .await;
        assert_eq!(resp["error"]["data"]["reason"], "tool_not_found");
    }

    #[tokio::test]
    async fn secrets_are_tested_and_persisted() {
        let store = Arc::new(MemoryAuthStore::new());
        let handler = handler_with_store(store.clone());

        let resp = handler
            .handle_request(rpc(
                "secrets/set",
                json!({"provider": "echo", "secrets": {"token": "bad"}}),
            ))
            .await;
        assert_eq!(resp["error"]["data"]["reason"], "auth_failed");
        assert!(store.load("echo").is_none());

        let resp = handler
            .handle_request(rpc(
                "secrets/set",
                json!({"provider": "echo", "secrets": {"token": "good"}}),
            ))
            .await;
        assert_eq!(resp["result"]["ok"], true);
        assert_eq!(store.load("echo").unwrap()["token"], "good");

        let status = handler
            .handle_request(rpc("authorization/status", json!({})))
            .await;
        assert_eq!(status["result"]["providers"][0]["authorized"], true);

        let resp = handler
            .handle_request(rpc("secrets/delete", json!({"provider": "echo"})))
            .await;
        assert_eq!(resp["result"]["ok"], true);
        assert!(store.load("echo").is_none());
    }

    #[tokio::test]
    async fn describe_lists_connector_fields() {
        let handler = handler_with_store(Arc::new(MemoryAuthStore::new()));
        let resp = handler
            .handle_request(rpc("authorization/describe", json!({})))
            .await;
        let scheme = &resp["result"]["schemes"][0];
        assert_eq!(scheme["provider"], "echo");
        assert_eq!(scheme["type"], "api_key");
        assert_eq!(scheme["requires_auth"], true);
        assert_eq!(scheme["fields"][0]["name"], "token");
    }

    #[tokio::test]
    async fn unknown_methods_and_missing_provider_are_errors() {
        let handler = handler_with_store(Arc::new(MemoryAuthStore::new()));
        let resp = handler.handle_request(rpc("bogus/method", json!({}))).await;
        assert_eq!(resp["error"]["code"], -32601);
        assert_eq!(resp["id"], 1);

        let resp = handler.handle_request(rpc("secrets/set", json!({}))).await;
        assert_eq!(resp["error"]["code"], -32602);
    }
}
