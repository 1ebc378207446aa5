//! `HttpClient` against a small axum stand-in for the Mayan REST API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use mayanedms_provider::client::{MetadataTypeApi, Tag, TagApi};
use mayanedms_provider::{
    ClientConfig, ClientError, HttpClient, MayanEdmsProvider, ProviderError, ProviderService,
};

const TOKEN: &str = "0123456789abcdef";

struct Server {
    addr: SocketAddr,
    requests: Mutex<Vec<String>>,
}

type Shared = Arc<Server>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Token {}", TOKEN))
}

async fn obtain_token(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "secret" {
        Json(json!({"token": TOKEN})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            r#"{"non_field_errors":["Unable to log in with provided credentials."]}"#,
        )
            .into_response()
    }
}

async fn get_tag(
    State(server): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    server.requests.lock().unwrap().push(format!("GET tags/{}", id));
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "no token").into_response();
    }
    match id {
        1 => Json(json!({"id": 1, "label": "urgent", "color": "#ff0000", "url": "ignored"}))
            .into_response(),
        _ => (StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#).into_response(),
    }
}

async fn delete_tag(State(server): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    server.requests.lock().unwrap().push(format!("DELETE tags/{}", id));
    StatusCode::NO_CONTENT
}

async fn create_tag(Json(body): Json<Value>) -> Response {
    if body["label"].as_str().map_or(true, str::is_empty) {
        return (
            StatusCode::BAD_REQUEST,
            r#"{"label":["This field may not be blank."]}"#,
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({"id": 7, "label": body["label"], "color": body["color"]})))
        .into_response()
}

async fn metadata_types(
    State(server): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    server.requests.lock().unwrap().push(format!("GET metadata_types page {}", page));

    let next = |n: u32| json!(format!("http://{}/api/v4/metadata_types/?page={}", server.addr, n));
    let body = match page {
        1 => json!({
            "count": 5,
            "next": next(2),
            "results": [
                {"id": 1, "label": "Invoice", "name": "invoice"},
                {"id": 2, "label": "Vendor", "name": "vendor"}
            ]
        }),
        2 => json!({
            "count": 5,
            "next": next(3),
            "results": [
                {"id": 3, "label": "Amount", "name": "amount", "default": "0"},
                {"id": 4, "label": "Due", "name": "due_date"}
            ]
        }),
        _ => json!({
            "count": 5,
            "next": null,
            "results": [{"id": 5, "label": "Notes", "name": "notes"}]
        }),
    };
    Json(body)
}

fn document_type(id: i64, label: &str) -> Value {
    json!({
        "id": id,
        "label": label,
        "delete_time_period": 30,
        "delete_time_unit": "days",
        "trash_time_period": null,
        "trash_time_unit": null,
        "filename_generator_backend": "uuid",
        "filename_generator_backend_arguments": null
    })
}

/// Two reachable pages, then a `next` link to a port nothing listens on.
async fn document_types(
    State(server): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    server
        .requests
        .lock()
        .unwrap()
        .push(format!("GET document_types page {}", page));

    let body = match page {
        1 => json!({
            "count": 3,
            "next": format!("http://{}/api/v4/document_types/?page=2", server.addr),
            "results": [document_type(1, "Receipt")]
        }),
        _ => json!({
            "count": 3,
            "next": "http://127.0.0.1:1/api/v4/document_types/?page=3",
            "results": [document_type(2, "Invoice")]
        }),
    };
    Json(body)
}

async fn start() -> (Shared, HttpClient) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Arc::new(Server {
        addr: listener.local_addr().unwrap(),
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/v4/auth/token/obtain/", post(obtain_token))
        .route("/api/v4/tags/", post(create_tag))
        .route("/api/v4/tags/{id}/", get(get_tag).delete(delete_tag))
        .route("/api/v4/metadata_types/", get(metadata_types))
        .route("/api/v4/document_types/", get(document_types))
        .with_state(server.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpClient::connect(&ClientConfig {
        url: format!("http://{}", server.addr),
        username: "admin".into(),
        password: "secret".into(),
        insecure: false,
    })
    .await
    .unwrap();
    (server, client)
}

#[tokio::test]
async fn test_authenticated_requests_carry_token() {
    let (_, client) = start().await;
    assert!(client.is_authenticated());

    let tag = client.get_tag(1).await.unwrap();
    assert_eq!(tag.label, "urgent");
    assert_eq!(tag.color, "#ff0000");
}

#[tokio::test]
async fn test_bad_credentials_fail_login() {
    let (server, _) = start().await;
    let err = HttpClient::connect(&ClientConfig {
        url: format!("http://{}/", server.addr),
        username: "admin".into(),
        password: "wrong".into(),
        insecure: false,
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::Authentication(_)));
    assert!(err.to_string().contains("Unable to log in with provided credentials."));
}

#[tokio::test]
async fn test_error_body_is_passed_through() {
    let (_, client) = start().await;

    let err = client.get_tag(99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), r#"API error (404): {"detail":"Not found."}"#);

    let err = client
        .create_tag(&Tag {
            label: String::new(),
            color: "#000".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, r#"{"label":["This field may not be blank."]}"#);
        }
        other => panic!("expected API error, got {}", other),
    }
}

#[tokio::test]
async fn test_create_and_delete() {
    let (server, client) = start().await;
    let created = client
        .create_tag(&Tag {
            label: "archive".into(),
            color: "#00ff00".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 7);

    client.delete_tag(7).await.unwrap();
    assert!(server
        .requests
        .lock()
        .unwrap()
        .contains(&"DELETE tags/7".to_string()));
}

#[tokio::test]
async fn test_lookup_stops_at_matching_page() {
    let (server, client) = start().await;

    let found = client.find_metadata_type_by_name("amount").await.unwrap().unwrap();
    assert_eq!(found.id, 3);
    assert_eq!(found.default, "0");

    let pages: Vec<String> = server
        .requests
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.starts_with("GET metadata_types"))
        .cloned()
        .collect();
    assert_eq!(pages, vec!["GET metadata_types page 1", "GET metadata_types page 2"]);
}

#[tokio::test]
async fn test_lookup_miss_walks_every_page() {
    let (server, client) = start().await;
    assert!(client.find_metadata_type_by_name("missing").await.unwrap().is_none());
    assert_eq!(server.requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_document_type_data_source_over_pages() {
    let (server, client) = start().await;
    let provider = MayanEdmsProvider::with_client(Arc::new(client));

    let found = provider
        .read_data_source("mayanedms_document_type", json!({"label": "Invoice"}))
        .await
        .unwrap();
    assert_eq!(found["id"], "2");
    assert_eq!(found["filename_generator_backend_arguments"], "");
    assert_eq!(
        server.requests.lock().unwrap().clone(),
        vec!["GET document_types page 1", "GET document_types page 2"]
    );

    // A miss follows the link to the dead third page.
    let err = provider
        .read_data_source("mayanedms_document_type", json!({"label": "Contract"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Client(ClientError::Transport(_))));
    assert!(!err.is_not_found());
}
