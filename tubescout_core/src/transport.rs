use serde_json::{json, Value};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::error::ConnectorError;
use crate::mcp_server::JsonRpcHandler;

/// Line-delimited JSON-RPC over stdin/stdout.
pub struct StdioTransport {
    handler: JsonRpcHandler,
}

impl StdioTransport {
    pub fn new(handler: JsonRpcHandler) -> Self {
        Self { handler }
    }

    /// Serve until stdin closes.
    pub async fn run(&self) -> io::Result<()> {
        info!("Starting stdio transport");
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.serve(stdin, &mut stdout).await
    }

    /// Serve requests read from `reader`, writing one response per line to `writer`.
    pub async fn serve<R, W>(&self, reader: R, writer: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.process_line(&line).await {
                write_response(writer, &response).await?;
            }
        }
        debug!("EOF reached on input");
        Ok(())
    }

    /// Notifications (no `id`) are handled but never answered.
    async fn process_line(&self, line: &str) -> Option<Value> {
        debug!(line, "Processing line");

        match serde_json::from_str::<Value>(line) {
            Ok(request) => {
                let is_notification = request.get("id").is_none();
                let response = self.handler.handle_request(request).await;
                (!is_notification).then_some(response)
            }
            Err(e) => {
                error!(error = %e, "Failed to parse JSON-RPC request");
                let mut error = ConnectorError::ParseError.to_jsonrpc_error();
                error["data"]["detail"] = json!(e.to_string());
                Some(json!({
                    "jsonrpc": "2.0",
                    "error": error,
                    "id": null
                }))
            }
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Value) -> io::Result<()> {
    let response_str = serde_json::to_string(response)?;
    writer.write_all(response_str.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    debug!(response = %response_str, "Sent response");
    Ok(())
}
