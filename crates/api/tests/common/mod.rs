use async_trait::async_trait;
use bugcrowd_api::{
    ApiClient, ApiConfig, ApiError, CredentialSource, Credentials, OutboundRequest, RawResponse,
    Transport,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Transport that replays canned responses and records what it was asked to send.
///
/// `bugcrowd_test_support::RecordingTransport` does the same job for the other crates. It
/// cannot be used here: test-support depends on this crate, so as a dev-dependency it would
/// link a second copy of `bugcrowd-api` whose `Transport` trait does not match this one.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, ApiError>>>,
    sent: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn push_json(&self, status: u16, body: &serde_json::Value) {
        self.push_raw(status, Some("application/json"), body.to_string().as_bytes());
    }

    pub fn push_raw(&self, status: u16, content_type: Option<&str>, body: &[u8]) {
        self.responses.lock().push_back(Ok(RawResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.to_vec(),
        }));
    }

    pub fn push_error(&self, err: ApiError) {
        self.responses.lock().push_back(Err(err));
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ApiError> {
        self.sent.lock().push(request);
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Ok(RawResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: b"{}".to_vec(),
            })
        })
    }
}

pub fn static_credentials() -> CredentialSource {
    CredentialSource::Static(Credentials::new("researcher", "hunter2").expect("credentials"))
}

pub fn client_with(transport: Arc<ScriptedTransport>, credentials: CredentialSource) -> ApiClient {
    let cfg = ApiConfig::default()
        .with_base_url("https://api.example.test")
        .with_credentials(credentials);
    ApiClient::with_transport(cfg, transport).expect("valid config")
}
