//! End-to-end exercises of `GatewayClient` against an in-process gateway.
//!
//! The fake gateway records every request (method + uri) and answers with
//! canned responses keyed by connector id / resource name, covering the
//! full failure taxonomy of the execute path plus the fault-as-value
//! knowledge-base and conversation paths.

use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Query, Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use colloquy_client::{GatewayClient, GatewayConfig};
use colloquy_core::normalize::EXECUTE_ERROR;
use colloquy_core::outcome::ExecuteOutcome;
use colloquy_types::action::{ApiConfig, ExecuteRequest};
use colloquy_types::conversation::{FindConversationsParams, SortField, SortOrder};
use colloquy_types::fault::Fault;

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl Seen {
    fn last(&self) -> (String, String) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

fn execute_response(connector: &str) -> Response {
    match connector {
        "ok" => Json(json!({
            "connector_id": "ok",
            "status": "ok",
            "data": "Hello from the connector",
            "trace_data": {"transaction_id": "tx-1", "trace_id": "tr-1"}
        }))
        .into_response(),
        "svc-error" => Json(json!({
            "connector_id": "svc-error",
            "status": "error",
            "service_message": "the model melted"
        }))
        .into_response(),
        "bare-error" => Json(json!({
            "connector_id": "bare-error",
            "status": "error"
        }))
        .into_response(),
        "empty-data" => Json(json!({
            "connector_id": "empty-data",
            "status": "ok",
            "data": ""
        }))
        .into_response(),
        "stream" => {
            let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                Ok(Bytes::from_static(b"first chunk | ")),
                Ok(Bytes::from_static(b"second chunk")),
            ];
            Body::from_stream(futures_util::stream::iter(chunks)).into_response()
        }
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "connector missing"})),
        )
            .into_response(),
        "no-body" => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn knowledge_base_response(method: &Method, resource: &str) -> Response {
    if resource == "locked" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "resource is locked"})),
        )
            .into_response();
    }
    if method == Method::GET {
        let resource_exists = if resource.is_empty() {
            serde_json::Value::Null
        } else {
            json!(true)
        };
        Json(json!({
            "index_exists": true,
            "pipeline_exists": true,
            "model_exists": true,
            "resource_exists": resource_exists
        }))
        .into_response()
    } else {
        Json(json!({"success": true})).into_response()
    }
}

fn find_response(uri: &Uri) -> Response {
    match Query::<FindConversationsParams>::try_from_uri(uri) {
        Ok(Query(params)) => Json(json!({
            "page": params.page,
            "perPage": params.per_page,
            "total": 1,
            "data": [{
                "id": "c1",
                "title": "Alert triage",
                "isDefault": true,
                "createdAt": "2025-06-01T12:00:00Z"
            }]
        }))
        .into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "invalid query"})),
        )
            .into_response(),
    }
}

async fn gateway(State(seen): State<Seen>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    seen.requests
        .lock()
        .unwrap()
        .push((method.to_string(), uri.to_string()));

    let path = uri.path().to_string();

    if let Some(connector) = path
        .strip_prefix("/internal/assistant/actions/connector/")
        .and_then(|rest| rest.strip_suffix("/_execute"))
    {
        return execute_response(connector);
    }

    if let Some(resource) = path.strip_prefix("/internal/assistant/knowledge_base/") {
        return knowledge_base_response(&method, resource);
    }

    if path == "/internal/assistant/conversations/_find" {
        return find_response(&uri);
    }

    StatusCode::NOT_FOUND.into_response()
}

async fn start_gateway() -> (GatewayClient, Seen) {
    let seen = Seen::default();
    let app = Router::new().fallback(gateway).with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client =
        GatewayClient::new(GatewayConfig::default()).with_base_url(format!("http://{addr}"));
    (client, seen)
}

fn execute_request(connector: &str, streaming: bool) -> ExecuteRequest {
    let mut request = ExecuteRequest::new(
        "conv-1",
        ApiConfig {
            connector_id: connector.to_string(),
            action_type_id: ".inference".to_string(),
            model: None,
            provider: None,
        },
    );
    request.message = Some("hello".to_string());
    request.streaming = streaming;
    request
}

async fn collect(outcome: ExecuteOutcome) -> String {
    let mut stream = outcome.into_stream().expect("expected a streamed outcome");
    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    String::from_utf8(collected).unwrap()
}

#[tokio::test]
async fn buffered_success_surfaces_data_and_trace() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("ok", false), None).await;

    assert!(!outcome.is_stream());
    assert!(!outcome.is_error());
    assert_eq!(outcome.text(), Some("Hello from the connector"));
    let trace = outcome.trace().unwrap();
    assert_eq!(trace.trace_id, "tr-1");
    assert_eq!(trace.transaction_id, "tx-1");
}

#[tokio::test]
async fn buffered_failure_prefers_service_message() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("svc-error", false), None).await;

    assert!(outcome.is_error());
    assert!(!outcome.is_stream());
    let text = outcome.text().unwrap();
    assert!(text.starts_with(EXECUTE_ERROR));
    assert!(text.contains("the model melted"));
}

#[tokio::test]
async fn buffered_failure_without_service_message_uses_marker() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("bare-error", false), None).await;

    assert!(outcome.is_error());
    assert_eq!(outcome.text(), Some(EXECUTE_ERROR));
}

#[tokio::test]
async fn buffered_empty_data_is_failure() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("empty-data", false), None).await;
    assert!(outcome.is_error());
}

#[tokio::test]
async fn streaming_hands_over_live_bytes() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("stream", true), None).await;

    assert!(outcome.is_stream());
    assert!(!outcome.is_error());
    assert_eq!(collect(outcome).await, "first chunk | second chunk");
}

#[tokio::test]
async fn streaming_http_fault_recovers_body_as_errored_stream() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("boom", true), None).await;

    assert!(outcome.is_stream());
    assert!(outcome.is_error());
    assert!(collect(outcome).await.contains("connector missing"));
}

#[tokio::test]
async fn streaming_without_a_body_downgrades_to_buffered_error() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("no-body", true), None).await;

    assert!(!outcome.is_stream());
    assert!(outcome.is_error());
    assert!(outcome.text().unwrap().contains("reader"));
}

#[tokio::test]
async fn buffered_http_fault_uses_body_message() {
    let (client, _) = start_gateway().await;
    let outcome = client.execute(execute_request("boom", false), None).await;

    assert!(outcome.is_error());
    assert!(!outcome.is_stream());
    assert!(outcome.text().unwrap().contains("connector missing"));
}

#[tokio::test]
async fn transport_fault_folds_into_buffered_error() {
    // Bind and immediately drop a listener so the port refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        GatewayClient::new(GatewayConfig::default()).with_base_url(format!("http://{addr}"));
    let outcome = client.execute(execute_request("ok", false), None).await;

    assert!(outcome.is_error());
    assert!(!outcome.is_stream());
    assert!(outcome.text().unwrap().starts_with(EXECUTE_ERROR));
}

#[tokio::test]
async fn knowledge_base_scopes_address_the_right_paths() {
    let (client, seen) = start_gateway().await;

    let status = client.knowledge_base_status(None, None).await.unwrap();
    assert!(status.is_ready());
    assert!(status.resource_exists.is_none());
    assert_eq!(
        seen.last(),
        (
            "GET".to_string(),
            "/internal/assistant/knowledge_base/".to_string()
        )
    );

    let ack = client
        .create_knowledge_base(Some("esql-docs"), None)
        .await
        .unwrap();
    assert!(ack.success);
    assert_eq!(
        seen.last(),
        (
            "POST".to_string(),
            "/internal/assistant/knowledge_base/esql-docs".to_string()
        )
    );

    let ack = client
        .delete_knowledge_base(Some("esql-docs"), None)
        .await
        .unwrap();
    assert!(ack.success);
    assert_eq!(
        seen.last(),
        (
            "DELETE".to_string(),
            "/internal/assistant/knowledge_base/esql-docs".to_string()
        )
    );
}

#[tokio::test]
async fn knowledge_base_fault_is_returned_as_a_value() {
    let (client, _) = start_gateway().await;
    let fault = client
        .delete_knowledge_base(Some("locked"), None)
        .await
        .unwrap_err();

    assert_eq!(
        fault,
        Fault::Status {
            status: 500,
            message: Some("resource is locked".to_string()),
        }
    );
}

#[tokio::test]
async fn find_conversations_roundtrips_params() {
    let (client, seen) = start_gateway().await;

    let page = client
        .find_conversations(FindConversationsParams::default(), None)
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 20);
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, "c1");
    assert!(page.data[0].is_default);

    let params = FindConversationsParams {
        fields: Some(vec!["id".to_string(), "title".to_string()]),
        filter: Some("triage".to_string()),
        sort_field: Some(SortField::UpdatedAt),
        sort_order: Some(SortOrder::Desc),
        page: 3,
        per_page: 5,
    };
    let page = client.find_conversations(params, None).await.unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.per_page, 5);

    let (_, uri) = seen.last();
    assert!(uri.contains("sort_field=updated_at"));
    assert!(uri.contains("sort_order=desc"));
    assert!(uri.contains("filter=triage"));
}

#[tokio::test]
async fn find_conversations_query_defaults_and_bounds() {
    // Server-side view of the contract: omitted paging fields default,
    // per_page=0 is a valid boundary, page=0 is rejected.
    let uri: Uri = "/internal/assistant/conversations/_find?filter=x"
        .parse()
        .unwrap();
    let Query(params) = Query::<FindConversationsParams>::try_from_uri(&uri).unwrap();
    assert_eq!(params.page, 1);
    assert_eq!(params.per_page, 20);

    let uri: Uri = "/internal/assistant/conversations/_find?per_page=0"
        .parse()
        .unwrap();
    let Query(params) = Query::<FindConversationsParams>::try_from_uri(&uri).unwrap();
    assert_eq!(params.per_page, 0);

    let uri: Uri = "/internal/assistant/conversations/_find?page=0"
        .parse()
        .unwrap();
    assert!(Query::<FindConversationsParams>::try_from_uri(&uri).is_err());
}

#[tokio::test]
async fn cancellation_takes_the_fault_path() {
    let (client, _) = start_gateway().await;
    let token = CancellationToken::new();
    token.cancel();

    let outcome = client
        .execute(execute_request("ok", false), Some(token.clone()))
        .await;
    assert!(outcome.is_error());
    assert!(!outcome.is_stream());
    assert!(outcome.text().unwrap().contains("cancelled"));

    let fault = client
        .knowledge_base_status(None, Some(token))
        .await
        .unwrap_err();
    assert_eq!(fault, Fault::Cancelled);
}
