//! Server loop: JSON-RPC over stdio, one message per line.
//!
//! stdout carries protocol frames only; all logging goes to stderr through
//! `tracing`. Requests are handled strictly in arrival order, which is also
//! the bridge's concurrency model: the engine underneath has no locking, so
//! overlapping mutations would race each other.

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::Value;

use crate::engine::Engine;
use crate::error::Result;

use super::handlers::ToolHandlers;
use super::protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability, ToolsListResult, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
use super::tools::get_tools;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpServer {
    handlers: ToolHandlers,
}

impl McpServer {
    pub fn new(engine: Engine) -> Self {
        Self {
            handlers: ToolHandlers::new(engine),
        }
    }

    /// Run until stdin closes.
    pub fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("server started, waiting for messages");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            tracing::debug!(message = %preview(&line), "incoming");

            let Some(response) = self.handle_message(&line) else {
                continue;
            };
            let encoded = serde_json::to_string(&response)?;
            tracing::debug!(message = %preview(&encoded), "outgoing");
            writeln!(stdout, "{encoded}")?;
            stdout.flush()?;
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one frame. `None` means the frame was a notification and
    /// gets no reply.
    pub fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => return Some(JsonRpcResponse::error(None, PARSE_ERROR, e.to_string())),
        };

        let suppress = request.is_notification();
        let id = request.id.clone();

        let response = match request.method.as_str() {
            "initialize" => success(
                id,
                InitializeResult {
                    protocol_version: PROTOCOL_VERSION.into(),
                    capabilities: ServerCapabilities {
                        tools: ToolsCapability {
                            list_changed: false,
                        },
                    },
                    server_info: ServerInfo {
                        name: env!("CARGO_PKG_NAME").into(),
                        version: env!("CARGO_PKG_VERSION").into(),
                    },
                },
            ),

            "tools/list" => success(id, ToolsListResult { tools: get_tools() }),

            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(request.params) {
                    Ok(params) => params,
                    Err(e) => {
                        return respond(
                            suppress,
                            JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
                        )
                    }
                };
                tracing::info!(tool = %params.name, "tool call");
                success(id, self.handlers.handle(&params.name, params.arguments))
            }

            method if method.starts_with("notifications/") => {
                tracing::debug!(method, "notification acknowledged");
                return None;
            }

            method => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown method: {method}"))
            }
        };

        respond(suppress, response)
    }
}

fn respond(suppress: bool, response: JsonRpcResponse) -> Option<JsonRpcResponse> {
    if suppress {
        None
    } else {
        Some(response)
    }
}

fn success(id: Option<Value>, result: impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("serialization error: {e}")),
    }
}

fn preview(line: &str) -> String {
    if line.len() > 120 {
        let cut = line
            .char_indices()
            .take_while(|(i, _)| *i < 120)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &line[..cut])
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(300);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert!(short.len() < 130);
        assert_eq!(preview("short"), "short");
    }
}
