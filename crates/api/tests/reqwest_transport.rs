use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::{any, get};
use bugcrowd_api::{ApiClient, ApiConfig, ApiError, ApiRequest, CredentialSource, Credentials};
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn echo_handler(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> axum::Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    axum::Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "accept": header("accept"),
        "authorization": header("authorization"),
        "version": header("bugcrowd-version"),
        "content_type": header("content-type"),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn not_found() -> (StatusCode, axum::Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({"errors": [{"detail": "not found"}]})),
    )
}

async fn plain_text() -> &'static str {
    "definitely not json"
}

struct EchoServer {
    base_url: String,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl EchoServer {
    async fn start() -> anyhow::Result<Self> {
        let app = Router::new()
            .route("/missing", get(not_found))
            .route("/text", get(plain_text))
            .route("/{*path}", any(echo_handler));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let handle = tokio::spawn(async move { server.await });

        Ok(Self {
            base_url: format!("http://{addr}"),
            shutdown_tx,
            handle,
        })
    }

    async fn stop(self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.handle.await??;
        Ok(())
    }
}

fn client(base_url: &str) -> ApiClient {
    let creds = Credentials::new("researcher", "hunter2").expect("credentials");
    let cfg = ApiConfig::default()
        .with_base_url(base_url)
        .with_credentials(CredentialSource::Static(creds));
    ApiClient::new(cfg).expect("valid config")
}

#[tokio::test]
async fn get_over_the_wire_carries_fixed_headers_and_no_query() -> anyhow::Result<()> {
    let server = EchoServer::start().await?;
    let api = client(&server.base_url);

    let echoed = api
        .execute(ApiRequest::get("/reports").with_query(json!({"filter[state]": ""})))
        .await?;

    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/reports");
    assert_eq!(echoed["query"], Value::Null);
    assert_eq!(echoed["accept"], "application/vnd.bugcrowd.v4+json");
    assert_eq!(echoed["authorization"], "Token researcher:hunter2");
    assert_eq!(echoed["version"], "2025-04-23");

    server.stop().await
}

#[tokio::test]
async fn patch_over_the_wire_sends_json_body_and_query() -> anyhow::Result<()> {
    let server = EchoServer::start().await?;
    let api = client(&server.base_url);

    let echoed = api
        .execute(
            ApiRequest::patch("/submissions/s-1")
                .with_query(json!({"include": "target"}))
                .with_body(json!({"data": {"type": "submission", "attributes": {"title": "t"}}})),
        )
        .await?;

    assert_eq!(echoed["method"], "PATCH");
    assert_eq!(echoed["path"], "/submissions/s-1");
    assert_eq!(echoed["query"], "include=target");
    assert_eq!(echoed["content_type"], "application/json");
    let body: Value = serde_json::from_str(echoed["body"].as_str().unwrap_or_default())?;
    assert_eq!(body["data"]["attributes"]["title"], "t");

    server.stop().await
}

#[tokio::test]
async fn status_and_decode_errors_over_the_wire() -> anyhow::Result<()> {
    let server = EchoServer::start().await?;
    let api = client(&server.base_url);

    let err = api.execute(ApiRequest::get("/missing")).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::HttpStatus { status: 404, ref body } if body["errors"][0]["detail"] == "not found"
    ));

    let err = api.execute(ApiRequest::get("/text")).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "{err:?}");

    server.stop().await
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let api = client(&format!("http://127.0.0.1:{port}"));

    let err = api
        .execute(ApiRequest::get("/reports").with_query(json!({"filter[secret]": "x"})))
        .await
        .unwrap_err();
    match err {
        ApiError::Transport(msg) => {
            assert!(!msg.contains("filter"), "{msg}");
            assert!(msg.contains(&format!("127.0.0.1:{port}/reports")), "{msg}");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}
