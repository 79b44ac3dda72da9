//! HTTP semantics helpers.
//!
//! Generates MCP `ToolAnnotations` for catalog operations from RFC 9110-style method semantics.

use bugcrowd_api::Verb;
use rmcp::model::ToolAnnotations;

/// Generate MCP tool annotations based on HTTP method semantics.
///
/// `openWorldHint` is always `true`: every tool talks to the remote API.
#[must_use]
pub fn annotations_for_verb(verb: Verb, title: Option<String>) -> ToolAnnotations {
    let open_world_hint = Some(true);

    match verb {
        Verb::Get => ToolAnnotations {
            title,
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint,
        },
        Verb::Post => ToolAnnotations {
            title,
            read_only_hint: Some(false),
            destructive_hint: Some(false),
            idempotent_hint: Some(false),
            open_world_hint,
        },
        Verb::Patch => ToolAnnotations {
            title,
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            // PATCH may or may not be idempotent; do not guess.
            idempotent_hint: None,
            open_world_hint,
        },
        Verb::Delete => ToolAnnotations {
            title,
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(true),
            open_world_hint,
        },
    }
}
