use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use uuid::Uuid;

use casebridge_core::repository::CaseService;

mod config;
mod http_backend;
mod sso;
mod tools;
mod util;

pub use config::ServiceArgs;
use sso::SsoTokenIssuer;
use tools::{ToolOutput, execute_tool, tool_definitions};
use util::to_pretty_json;

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const MCP_SERVER_NAME: &str = "casebridge-mcp";

fn build_tool_call_response(envelope: Value, text: String, is_error: bool) -> Value {
    if is_error {
        json!({
            "isError": true,
            "content": [{ "type": "text", "text": text }],
            "structuredContent": envelope
        })
    } else {
        json!({
            "content": [{ "type": "text", "text": text }],
            "structuredContent": envelope
        })
    }
}

#[derive(Subcommand)]
pub enum McpCommands {
    /// Run the support case MCP server over stdio
    Serve(McpServeArgs),
    /// Check configuration, token exchange and API reachability, then exit
    Diagnose(McpDiagnoseArgs),
}

#[derive(Args, Clone, Debug)]
pub struct McpServeArgs {
    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Clone, Debug)]
pub struct McpDiagnoseArgs {
    #[command(flatten)]
    pub service: ServiceArgs,
    /// Also query the product catalog
    #[arg(long, default_value_t = false)]
    pub check_catalog: bool,
}

pub async fn run(command: McpCommands) -> i32 {
    match command {
        McpCommands::Serve(args) => {
            let server = match args.service.build_service() {
                Ok(service) => McpServer::new(service),
                Err(err) => return report_startup_error(&err),
            };
            if !server.service.is_configured() {
                tracing::warn!(
                    "CASEBRIDGE_OFFLINE_TOKEN is not set; case tools will report not_configured"
                );
            }
            match server.serve_stdio().await {
                Ok(()) => 0,
                Err(err) => {
                    let payload = json!({
                        "error": "mcp_server_error",
                        "message": err,
                    });
                    eprintln!("{}", to_pretty_json(&payload));
                    1
                }
            }
        }
        McpCommands::Diagnose(args) => {
            let server = match args.service.build_service() {
                Ok(service) => McpServer::new(service),
                Err(err) => return report_startup_error(&err),
            };
            let report = server.run_diagnostics(args.check_catalog).await;
            println!("{}", to_pretty_json(&report));
            if report
                .get("status")
                .and_then(Value::as_str)
                .is_some_and(|status| status == "ready")
            {
                0
            } else {
                2
            }
        }
    }
}

fn report_startup_error(message: &str) -> i32 {
    let payload = json!({
        "error": "invalid_configuration",
        "message": message,
    });
    eprintln!("{}", to_pretty_json(&payload));
    1
}

struct McpServer {
    service: CaseService<SsoTokenIssuer>,
    session_id: String,
}

impl McpServer {
    fn new(service: CaseService<SsoTokenIssuer>) -> Self {
        Self {
            service,
            session_id: format!("stdio-{}", Uuid::now_v7()),
        }
    }

    async fn serve_stdio(&self) -> Result<(), String> {
        tracing::info!(
            session_id = %self.session_id,
            version = env!("CARGO_PKG_VERSION"),
            configured = self.service.is_configured(),
            "mcp server listening on stdio"
        );
        let mut reader = BufReader::new(io::stdin());
        let mut stdout = io::stdout();
        self.serve(&mut reader, &mut stdout).await
    }

    async fn serve<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let incoming = read_framed_json(reader)
                .await
                .map_err(|e| format!("Failed to read MCP message: {e}"))?;
            let Some(incoming) = incoming else {
                break;
            };

            let responses = self.handle_incoming_message(incoming).await;
            for response in responses {
                write_framed_json(writer, &response)
                    .await
                    .map_err(|e| format!("Failed to write MCP response: {e}"))?;
            }
        }
        tracing::info!(session_id = %self.session_id, "stdin closed, shutting down");
        Ok(())
    }

    async fn handle_incoming_message(&self, incoming: Value) -> Vec<Value> {
        let mut responses = Vec::new();

        if let Some(batch) = incoming.as_array() {
            if batch.is_empty() {
                responses.push(error_response(
                    Value::Null,
                    RpcError::invalid_request("Batch request must not be empty"),
                ));
                return responses;
            }
            for item in batch {
                if let Some(response) = self.handle_single_message(item.clone()).await {
                    responses.push(response);
                }
            }
            return responses;
        }

        if let Some(response) = self.handle_single_message(incoming).await {
            responses.push(response);
        }
        responses
    }

    async fn handle_single_message(&self, incoming: Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        // A message without a method is a client response; this server never
        // sends requests, so there is nothing to correlate it with.
        let method = obj.get("method").and_then(Value::as_str)?;

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        match obj.get("id").cloned() {
            Some(id) => Some(match self.handle_request(method, params).await {
                Ok(payload) => success_response(id, payload),
                Err(err) => error_response(id, err),
            }),
            None => {
                tracing::debug!(method, "notification ignored");
                None
            }
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false
                },
                "resources": {
                    "listChanged": false
                },
                "prompts": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Start with get_account_info to confirm the Red Hat API connection. Before create_case, call get_entitlements to see which products allow case creation, then list_products and list_versions for exact product and version values. search_cases without filters lists open cases ordered by priority. update_case with status 'Waiting on Red Hat' reopens a closed case.",
            "configurationStatus": {
                "configured": self.service.is_configured(),
                "configured_products": self.service.products().len()
            }
        })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        tracing::info!(session_id = %self.session_id, tool = name, "tool call");
        Ok(match execute_tool(&self.service, name, &args).await {
            Ok(ToolOutput { text, data }) => {
                let envelope = json!({
                    "status": "success",
                    "phase": "final",
                    "tool": name,
                    "data": data
                });
                build_tool_call_response(envelope, text, false)
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    tool = name,
                    error = %err.code,
                    detail = %err.message,
                    "tool call failed"
                );
                let envelope = json!({
                    "status": "error",
                    "phase": "final",
                    "tool": name,
                    "error": err.to_value()
                });
                build_tool_call_response(envelope, err.to_text(), true)
            }
        })
    }

    /// Readiness report: configuration, a fresh token exchange and one
    /// authenticated read. `status` is `ready` only when every check passed.
    async fn run_diagnostics(&self, check_catalog: bool) -> Value {
        let configured = self.service.is_configured();
        let mut checks = Map::new();
        checks.insert("configured".to_string(), json!(configured));

        let mut ready = configured;
        if configured {
            let credentials = self.service.credentials();
            credentials.invalidate();
            let token_check = match credentials.get_token().await {
                Ok(_) => json!({ "ok": true, "client_id": credentials.client_id() }),
                Err(err) => {
                    ready = false;
                    json!({ "ok": false, "error": err.to_string() })
                }
            };
            checks.insert("token".to_string(), token_check);

            let account_check = match self.service.account_info().await {
                Ok(account) => json!({
                    "ok": true,
                    "account_number": account.account_number,
                    "name": account.name
                }),
                Err(err) => {
                    ready = false;
                    ToolError::from(err).to_value()
                }
            };
            checks.insert("account".to_string(), account_check);

            if check_catalog {
                let catalog_check = match self.service.catalog_products().await {
                    Ok(products) => json!({ "ok": true, "active_products": products.len() }),
                    Err(err) => {
                        ready = false;
                        ToolError::from(err).to_value()
                    }
                };
                checks.insert("catalog".to_string(), catalog_check);
            }
        }

        let status = match (configured, ready) {
            (false, _) => "not_configured",
            (true, true) => "ready",
            (true, false) => "degraded",
        };
        json!({
            "server": MCP_SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "status": status,
            "checks": checks,
            "tools": tool_definitions().len()
        })
    }
}

fn tools_list_payload() -> Value {
    let tools: Vec<Value> = tool_definitions()
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect();
    json!({ "tools": tools })
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct ToolError {
    code: String,
    message: String,
    field: Option<String>,
    docs_hint: Option<String>,
    details: Option<Value>,
}

impl ToolError {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
            docs_hint: None,
            details: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    fn with_docs_hint(mut self, docs_hint: impl Into<String>) -> Self {
        self.docs_hint = Some(docs_hint.into());
        self
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn to_value(&self) -> Value {
        let mut payload = json!({
            "error": self.code,
            "message": self.message
        });
        if let Some(field) = &self.field {
            payload["field"] = Value::String(field.clone());
        }
        if let Some(docs_hint) = &self.docs_hint {
            payload["docs_hint"] = Value::String(docs_hint.clone());
        }
        if let Some(details) = &self.details {
            payload["details"] = details.clone();
        }
        payload
    }

    /// Text block shown to agents alongside the structured error.
    fn to_text(&self) -> String {
        match &self.docs_hint {
            Some(hint) => format!("ERROR: {}\n\n{hint}", self.message),
            None => format!("ERROR: {}", self.message),
        }
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}

async fn read_framed_json<R>(reader: &mut R) -> Result<Option<Value>, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            if content_length.is_none() {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Unexpected EOF while reading MCP headers",
            ));
        }

        if line == "\r\n" || line == "\n" {
            break;
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.to_ascii_lowercase().starts_with("content-length:") {
            let raw_len = line
                .split_once(':')
                .map(|(_, right)| right.trim())
                .unwrap_or_default();
            let parsed = raw_len.parse::<usize>().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Invalid Content-Length header",
                )
            })?;
            content_length = Some(parsed);
        }
    }

    let content_length = content_length.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Missing Content-Length header",
        )
    })?;
    let mut payload = vec![0_u8; content_length];
    reader.read_exact(&mut payload).await?;

    let json: Value = serde_json::from_slice(&payload).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Invalid JSON payload: {e}"),
        )
    })?;
    Ok(Some(json))
}

async fn write_framed_json<W>(writer: &mut W, value: &Value) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(value).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to serialize JSON: {e}"),
        )
    })?;
    let header = format!(
        "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n",
        body.len()
    );
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}
