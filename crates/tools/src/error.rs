//! Error types for `bugcrowd-tools`.

use bugcrowd_api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// The arguments do not fit the operation (missing `id`/`data`, wrong types).
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// The API call itself failed; carried unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, ToolError>;
