mod common;

use bugcrowd_api::{ApiError, ApiRequest, CredentialSource, Verb};
use common::{ScriptedTransport, client_with, static_credentials};
use serde_json::{Value, json};
use std::sync::Arc;

fn header(req: &bugcrowd_api::OutboundRequest, name: &str) -> Option<String> {
    req.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn missing_credentials_fail_before_any_network_call() {
    let transport = Arc::new(ScriptedTransport::default());
    let creds = CredentialSource::Env {
        identifier_var: "BUGCROWD_EXECUTOR_TEST_UNSET_ID".to_string(),
        secret_var: "BUGCROWD_EXECUTOR_TEST_UNSET_SECRET".to_string(),
    };
    let client = client_with(transport.clone(), creds);

    for verb in Verb::ALL {
        let err = client
            .execute(ApiRequest::new(verb, "/reports"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)), "{verb}: {err}");
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn fixed_headers_are_sent_for_every_verb() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(transport.clone(), static_credentials());

    for verb in Verb::ALL {
        let mut req = ApiRequest::new(verb, "/submissions/abc");
        if matches!(verb, Verb::Post | Verb::Patch) {
            req = req.with_body(json!({"data": {"type": "submission"}}));
        }
        client.execute(req).await.expect("execute");
    }

    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    for (req, verb) in sent.iter().zip(Verb::ALL) {
        assert_eq!(req.verb, verb);
        assert_eq!(
            header(req, "accept").as_deref(),
            Some("application/vnd.bugcrowd.v4+json")
        );
        assert_eq!(
            header(req, "authorization").as_deref(),
            Some("Token researcher:hunter2")
        );
        assert_eq!(header(req, "bugcrowd-version").as_deref(), Some("2025-04-23"));
        assert_eq!(req.url.path(), "/submissions/abc");
    }
}

#[tokio::test]
async fn empty_query_shapes_send_no_query_string() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(transport.clone(), static_credentials());

    let shapes = [
        json!({}),
        json!({"page[limit]": null, "filter[state]": ""}),
        json!(""),
        json!("  "),
        json!([]),
    ];
    for q in shapes {
        client
            .execute(ApiRequest::get("/reports").with_query(q))
            .await
            .expect("execute");
    }
    client
        .execute(ApiRequest::get("/reports"))
        .await
        .expect("execute");

    for req in transport.sent() {
        assert_eq!(req.url.query(), None, "{}", req.url);
        assert_eq!(req.url.as_str(), "https://api.example.test/reports");
    }
}

#[tokio::test]
async fn non_empty_query_is_sent_exactly() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(transport.clone(), static_credentials());

    client
        .execute(ApiRequest::get("/submissions").with_query(json!({
            "filter[program]": "acme",
            "page[limit]": 10,
        })))
        .await
        .expect("execute");

    let sent = transport.sent();
    let mut pairs: Vec<(String, String)> = sent[0].url.query_pairs().into_owned().collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("filter[program]".to_string(), "acme".to_string()),
            ("page[limit]".to_string(), "10".to_string()),
        ]
    );
}

#[tokio::test]
async fn created_resource_is_returned_verbatim() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push_json(201, &json!({"report": {"id": "abc123"}}));
    let client = client_with(transport.clone(), static_credentials());

    let out = client
        .execute(ApiRequest::post("/reports").with_body(json!({"title": "test"})))
        .await
        .expect("execute");

    assert_eq!(out, json!({"report": {"id": "abc123"}}));
    assert_eq!(transport.sent()[0].body, Some(json!({"title": "test"})));
}

#[tokio::test]
async fn not_found_is_a_status_error_with_body() {
    let transport = Arc::new(ScriptedTransport::default());
    let error_body = json!({"errors": [{"status": "404", "detail": "Report not found"}]});
    transport.push_json(404, &error_body);
    let client = client_with(transport, static_credentials());

    let err = client
        .execute(ApiRequest::get("/reports/missing"))
        .await
        .unwrap_err();

    match err {
        ApiError::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, error_body);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push_raw(502, Some("text/html"), b"<html>Bad Gateway</html>");
    let client = client_with(transport, static_credentials());

    let err = client
        .execute(ApiRequest::get("/programs"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(matches!(
        err,
        ApiError::HttpStatus { body: Value::String(ref s), .. } if s.contains("Bad Gateway")
    ));
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push_raw(200, Some("text/plain"), b"all good");
    let client = client_with(transport, static_credentials());

    let err = client
        .execute(ApiRequest::get("/users"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn empty_success_body_is_a_decode_error() {
    for body in [&b""[..], b"   "] {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_raw(200, Some("text/plain"), body);
        let client = client_with(transport.clone(), static_credentials());

        let err = client
            .execute(ApiRequest::get("/reports/abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
        assert_eq!(transport.call_count(), 1);
    }
}

#[tokio::test]
async fn transport_errors_propagate_unchanged() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push_error(ApiError::Transport("connection refused".to_string()));
    let client = client_with(transport, static_credentials());

    let err = client
        .execute(ApiRequest::get("/users"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(ref m) if m == "connection refused"));
}

#[tokio::test]
async fn invalid_query_shape_is_rejected_before_dispatch() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(transport.clone(), static_credentials());

    let err = client
        .execute(ApiRequest::get("/users").with_query(json!(true)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn repeated_get_yields_identical_results() {
    let transport = Arc::new(ScriptedTransport::default());
    let body = json!({"data": {"id": "u-1", "type": "identity", "attributes": {"name": "A"}}});
    transport.push_json(200, &body);
    transport.push_json(200, &body);
    let client = client_with(transport, static_credentials());

    let first = client
        .execute(ApiRequest::get("/users/u-1"))
        .await
        .expect("first");
    let second = client
        .execute(ApiRequest::get("/users/u-1"))
        .await
        .expect("second");

    assert_eq!(
        serde_json::to_vec(&first).expect("ser"),
        serde_json::to_vec(&second).expect("ser")
    );
}
