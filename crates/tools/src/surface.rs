//! The tool surface a front-end talks to: list the catalog, call one entry.

use crate::catalog::{Operation, operations};
use crate::error::{Result, ToolError};
use crate::semantics::annotations_for_verb;
use bugcrowd_api::{ApiClient, ApiError};
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct BugcrowdTools {
    inner: Arc<BugcrowdToolsInner>,
}

struct BugcrowdToolsInner {
    client: ApiClient,
    operations: Vec<Operation>,
}

impl BugcrowdTools {
    /// Bind the full catalog to an executor.
    ///
    /// The resulting instance is immutable and safe to share across tasks.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(BugcrowdToolsInner {
                client,
                operations: operations(),
            }),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.inner.operations
    }

    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.inner.operations.iter().find(|o| o.name == name)
    }

    /// List the MCP `Tool`s exposed by the catalog.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.inner
            .operations
            .iter()
            .map(|op| {
                let schema_obj = input_schema(op)
                    .as_object()
                    .cloned()
                    .unwrap_or_else(JsonObject::new);
                let mut tool = Tool::new(
                    op.name.clone(),
                    op.description.clone(),
                    Arc::new(schema_obj),
                );
                tool.annotations = Some(annotations_for_verb(op.verb(), None));
                tool
            })
            .collect()
    }

    /// Invoke one operation and return the decoded API response verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the tool name is unknown
    /// - the arguments do not fit the operation
    /// - the API call fails (configuration, transport, non-2xx, or undecodable body)
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value> {
        let op = self
            .operation(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let request = op.build_request(arguments)?;
        debug!(tool = %op.name, verb = %request.verb, "invoking tool");
        Ok(self.inner.client.execute(request).await?)
    }

    /// Invoke one operation and wrap the result as MCP tool content.
    ///
    /// # Errors
    ///
    /// Same as [`BugcrowdTools::invoke`].
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let body = self.invoke(name, arguments).await?;
        let text = serde_json::to_string(&body).unwrap_or_else(|_| body.to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// Render an API failure as an MCP tool result with `isError: true`.
///
/// The text carries the classified error; `structuredContent` carries its parts so callers can
/// branch on status codes.
#[must_use]
pub fn error_result(err: &ApiError) -> CallToolResult {
    let detail = match err {
        ApiError::Configuration(msg) => json!({"kind": "configuration", "message": msg}),
        ApiError::HttpStatus { status, body } => {
            json!({"kind": "http_status", "status": status, "body": body})
        }
        ApiError::Decode(msg) => json!({"kind": "decode", "message": msg}),
        ApiError::Transport(msg) => json!({"kind": "transport", "message": msg}),
        ApiError::InvalidRequest(msg) => json!({"kind": "invalid_request", "message": msg}),
    };
    CallToolResult {
        content: vec![Content::text(err.to_string())],
        structured_content: Some(json!({ "error": detail })),
        is_error: Some(true),
        meta: None,
    }
}

fn input_schema(op: &Operation) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required: Vec<&str> = Vec::new();

    if op.kind.targets_item() {
        properties.insert(
            "id".to_string(),
            json!({
                "type": ["string", "integer"],
                "description": format!("ID of the {}", op.resource.label),
            }),
        );
        required.push("id");
    }
    if op.kind.accepts_body() {
        properties.insert(
            "data".to_string(),
            json!({
                "type": "object",
                "description": "JSON:API request document sent as the request body",
            }),
        );
        required.push("data");
    }
    if op.kind.accepts_query() {
        properties.extend(query_properties());
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": op.kind.accepts_query(),
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

fn query_properties() -> serde_json::Map<String, Value> {
    let string_list = json!({
        "anyOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "string"}}
        ]
    });
    let props = json!({
        "page_limit": {"type": "integer", "minimum": 1, "description": "page[limit]"},
        "page_offset": {"type": "integer", "minimum": 0, "description": "page[offset]"},
        "include": {
            "description": "Related resources to include (comma-joined when a list)",
            "anyOf": string_list["anyOf"].clone(),
        },
        "fields": {
            "type": "object",
            "description": "Sparse fieldsets keyed by resource type: fields[<type>]",
            "additionalProperties": string_list,
        },
        "filter": {
            "type": "object",
            "description": "Filters keyed by attribute: filter[<key>]",
        },
        "sort": {"type": "string", "description": "Sort expression, e.g. -submitted_at"},
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
