//! The Bugcrowd API operation catalog, exposed as MCP tools.
//!
//! Each tool is a thin adapter: it shapes caller arguments into one
//! [`bugcrowd_api::ApiRequest`] and hands it to the shared executor. No tool carries retry,
//! validation or business logic of its own.

pub mod catalog;
pub mod error;
pub mod query_options;
pub mod semantics;
pub mod surface;

pub use catalog::{OpKind, Operation, RESOURCES, ResourceSpec, operations};
pub use error::ToolError;
pub use query_options::QueryOptions;
pub use surface::{BugcrowdTools, error_result};
