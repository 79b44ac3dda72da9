//! The request executor.
//!
//! Every operation in the catalog funnels through [`ApiClient::execute`], which:
//! 1. resolves credentials (failing before any network activity),
//! 2. builds the absolute URL and normalizes query parameters,
//! 3. pins `Accept`, `Authorization` and `Bugcrowd-Version` over any caller headers,
//! 4. dispatches through the configured [`Transport`],
//! 5. classifies the response: non-2xx → [`ApiError::HttpStatus`], a 2xx body that is not JSON
//!    (empty included) → [`ApiError::Decode`].

use crate::config::{ACCEPT_MEDIA_TYPE, ApiConfig, Credentials, VERSION_HEADER};
use crate::error::{ApiError, Result};
use crate::query::normalize_query;
use crate::redact::RedactedUrl;
use crate::request::ApiRequest;
use crate::transport::{OutboundRequest, ReqwestTransport, Transport};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build an executor that talks to the network through [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the base URL or API version is invalid.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport))
    }

    /// Build an executor over an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the base URL or API version is invalid.
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ApiError::Configuration(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ApiError::Configuration(format!(
                "unsupported base URL scheme '{}'",
                base.scheme()
            )));
        }
        HeaderValue::from_str(&config.api_version).map_err(|_| {
            ApiError::Configuration(format!("invalid API version '{}'", config.api_version))
        })?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { config, transport }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Execute one API call and return the decoded JSON body verbatim.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Configuration`] if credentials are missing (no request is sent)
    /// - [`ApiError::InvalidRequest`] if the query shape or URL is unusable (no request is sent)
    /// - [`ApiError::Transport`] for connection-level failures
    /// - [`ApiError::HttpStatus`] for non-2xx responses
    /// - [`ApiError::Decode`] if a 2xx body is not JSON
    pub async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let credentials = self.inner.config.credentials.resolve()?;
        let outbound = self.build_outbound(&request, &credentials)?;

        let verb = outbound.verb;
        let target = RedactedUrl(&outbound.url).to_string();
        debug!(%verb, url = %target, "dispatching API request");

        let started = Instant::now();
        let response = match self.inner.transport.send(outbound).await {
            Ok(r) => r,
            Err(e) => {
                warn!(%verb, url = %target, error = %e, "API request failed in transport");
                return Err(e);
            }
        };
        let elapsed_ms = started.elapsed().as_millis();

        if !response.is_success() {
            warn!(
                %verb,
                url = %target,
                status = response.status,
                elapsed_ms,
                "API returned an error status"
            );
            return Err(ApiError::HttpStatus {
                status: response.status,
                body: decode_error_body(&response.body),
            });
        }

        debug!(
            %verb,
            url = %target,
            status = response.status,
            elapsed_ms,
            "API request completed"
        );
        decode_success_body(&response.body, response.content_type.as_deref())
    }

    /// Build the outbound request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for unusable query shapes, URLs or caller headers,
    /// and [`ApiError::Configuration`] if the credentials cannot form a header value.
    pub fn build_outbound(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
    ) -> Result<OutboundRequest> {
        let query = normalize_query(request.query.as_ref())?;
        let url = build_url(&self.inner.config.base_url, &request.path, query.as_deref())?;
        let headers = self.build_headers(&request.headers, credentials)?;

        Ok(OutboundRequest {
            verb: request.verb,
            url,
            headers,
            body: request.body.clone(),
        })
    }

    fn build_headers(
        &self,
        extra: &[(String, String)],
        credentials: &Credentials,
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiError::InvalidRequest(format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ApiError::InvalidRequest(format!("invalid value for header '{name}': {e}"))
            })?;
            headers.append(name, value);
        }

        // `insert` replaces every caller value under the same (case-insensitive) name.
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));

        let mut auth = HeaderValue::from_str(&credentials.authorization_value()).map_err(|_| {
            ApiError::Configuration(
                "API credentials contain characters not allowed in an HTTP header".to_string(),
            )
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let version = HeaderValue::from_str(&self.inner.config.api_version).map_err(|_| {
            ApiError::Configuration(format!(
                "invalid API version '{}'",
                self.inner.config.api_version
            ))
        })?;
        let version_name = HeaderName::from_bytes(VERSION_HEADER.as_bytes())
            .map_err(|e| ApiError::Configuration(format!("invalid version header name: {e}")))?;
        headers.insert(version_name, version);

        Ok(headers)
    }
}

fn build_url(base_url: &str, path: &str, query: Option<&str>) -> Result<Url> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let mut url =
        Url::parse(&url).map_err(|e| ApiError::InvalidRequest(format!("invalid URL: {e}")))?;
    url.set_query(query);
    Ok(url)
}

/// A 2xx body must be JSON; an empty body is not.
fn decode_success_body(bytes: &[u8], content_type: Option<&str>) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| {
        ApiError::Decode(format!(
            "response body is not JSON (content-type: {}): {e}",
            content_type.unwrap_or("unknown")
        ))
    })
}

fn decode_error_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
