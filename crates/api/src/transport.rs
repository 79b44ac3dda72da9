//! The network seam of the executor.
//!
//! [`Transport`] is the only place that performs I/O. Production uses [`ReqwestTransport`];
//! tests inject recording or scripted implementations.

use crate::error::Result;
use crate::request::Verb;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

/// A fully built request: absolute URL, final headers, optional JSON body.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub verb: Verb,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// Status, content type and raw body bytes, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and collect the complete response.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Transport`] for failures below the HTTP layer. Non-2xx
    /// statuses are *not* errors at this level.
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse>;
}

/// `reqwest`-backed transport.
///
/// Every call builds its own client, so no connection is reused across calls; the client and
/// its connections are dropped before `send` returns, on success and error alike. Timeouts
/// are reqwest's defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse> {
        let client = reqwest::Client::builder().build()?;

        let mut builder = client
            .request(request.verb.as_method(), request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
