//! Shared request layer for the Bugcrowd REST API.
//!
//! This crate is intended to be used by:
//! - `bugcrowd-tools` (the operation catalog)
//! - `bugcrowd-mcp` (the stdio front-end, for configuration only)
//!
//! It intentionally contains **no** knowledge of individual resources; every endpoint goes
//! through [`client::ApiClient::execute`].

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod redact;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use config::{ApiConfig, CredentialSource, Credentials};
pub use error::{ApiError, Result};
pub use request::{ApiRequest, Verb};
pub use transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport};
