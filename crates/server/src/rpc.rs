//! MCP over stdio: one JSON-RPC message per line, typed with rmcp's model.
//!
//! Everything except `tools/call` is answered inline by [`route_line`]. Tool calls come back
//! as [`Routed::Call`] so the caller can run them on their own task.

use bugcrowd_tools::{BugcrowdTools, ToolError, error_result};
use rmcp::model::{
    CallToolResult, ClientJsonRpcMessage, ClientRequest, EmptyResult, ErrorCode, ErrorData,
    Implementation, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    JsonRpcVersion2_0, ListToolsResult, ProtocolVersion, RequestId, ServerCapabilities,
    ServerJsonRpcMessage, ServerResult,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Methods this server answers. A malformed request for one of these is `INVALID_PARAMS`;
/// anything else is `METHOD_NOT_FOUND`.
const SERVED_METHODS: &[&str] = &["initialize", "ping", "tools/list", "tools/call"];

#[derive(Debug)]
pub enum Routed {
    Reply(ServerJsonRpcMessage),
    Call {
        id: RequestId,
        name: String,
        arguments: Value,
    },
    Ignore,
}

pub fn route_line(tools: &BugcrowdTools, line: &str) -> Routed {
    let line = line.trim();
    if line.is_empty() {
        return Routed::Ignore;
    }

    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "dropping unparseable message");
            return Routed::Ignore;
        }
    };

    match serde_json::from_value::<ClientJsonRpcMessage>(raw.clone()) {
        Ok(message) => route_message(tools, message),
        Err(e) => reject_untyped(&raw, &e),
    }
}

fn route_message(tools: &BugcrowdTools, message: ClientJsonRpcMessage) -> Routed {
    let ClientJsonRpcMessage::Request(JsonRpcRequest { id, request, .. }) = message else {
        debug!("ignoring non-request message");
        return Routed::Ignore;
    };

    let result = match request {
        ClientRequest::InitializeRequest(req) => {
            ServerResult::InitializeResult(initialize_result(req.params.protocol_version))
        }
        ClientRequest::PingRequest(_) => ServerResult::EmptyResult(EmptyResult {}),
        ClientRequest::ListToolsRequest(_) => ServerResult::ListToolsResult(ListToolsResult {
            tools: tools.list_tools(),
            ..Default::default()
        }),
        ClientRequest::CallToolRequest(req) => {
            return Routed::Call {
                id,
                name: req.params.name.into_owned(),
                arguments: req.params.arguments.map_or(Value::Null, Value::Object),
            };
        }
        _ => {
            return Routed::Reply(error_message(
                id,
                ErrorCode::METHOD_NOT_FOUND,
                "method not found",
            ));
        }
    };
    Routed::Reply(response_message(id, result))
}

/// Answer a message rmcp's model could not type: unknown methods and malformed params.
fn reject_untyped(raw: &Value, err: &serde_json::Error) -> Routed {
    let Some(method) = raw.get("method").and_then(Value::as_str) else {
        return Routed::Ignore;
    };
    // Notifications carry no `id`.
    let Some(id) = raw
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok())
    else {
        debug!(method, "ignoring notification");
        return Routed::Ignore;
    };

    let reply = if SERVED_METHODS.contains(&method) {
        warn!(method, error = %err, "malformed request");
        error_message(id, ErrorCode::INVALID_PARAMS, err.to_string())
    } else {
        error_message(id, ErrorCode::METHOD_NOT_FOUND, "method not found")
    };
    Routed::Reply(reply)
}

/// Run one tool call to completion and build its response.
///
/// API failures become a successful response carrying an `isError` tool result; unknown tools
/// and malformed arguments are protocol errors.
pub async fn call_tool(
    tools: &BugcrowdTools,
    id: RequestId,
    name: &str,
    arguments: Value,
) -> ServerJsonRpcMessage {
    let result: CallToolResult = match tools.call_tool(name, arguments).await {
        Ok(result) => result,
        Err(ToolError::Api(err)) => {
            warn!(tool = name, error = %err, "tool call failed");
            error_result(&err)
        }
        Err(err @ (ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. })) => {
            return error_message(id, ErrorCode::INVALID_PARAMS, err.to_string());
        }
    };
    response_message(id, ServerResult::CallToolResult(result))
}

fn initialize_result(protocol_version: ProtocolVersion) -> InitializeResult {
    InitializeResult {
        protocol_version,
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: Implementation {
            name: "bugcrowd-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn response_message(id: RequestId, result: ServerResult) -> ServerJsonRpcMessage {
    ServerJsonRpcMessage::Response(JsonRpcResponse {
        jsonrpc: JsonRpcVersion2_0,
        id,
        result,
    })
}

fn error_message(
    id: RequestId,
    code: ErrorCode,
    message: impl Into<std::borrow::Cow<'static, str>>,
) -> ServerJsonRpcMessage {
    ServerJsonRpcMessage::Error(JsonRpcError {
        jsonrpc: JsonRpcVersion2_0,
        id,
        error: ErrorData::new(code, message, None),
    })
}
