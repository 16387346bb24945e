//! End-to-end checks of the reqwest transport against a local axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use addressbook::net::types::{ContactQuery, Credentials, ImportFile};
use addressbook::net::{ApiRequest, HttpTransport};
use addressbook::notify::NoticeLog;
use addressbook::{ApiClient, ApiError, ClientConfig, MemoryStorage, Session, SessionStore, Storage};
use axum::extract::{Multipart, RawQuery};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

const SESSION_COOKIE: &str = "session=abc123";

fn user() -> serde_json::Value {
    json!({ "id": 1, "username": "amy", "email": "amy@example.com", "created_at": "2024-01-01T00:00:00" })
}

async fn login() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
        Json(json!({ "message": "logged in", "user": user() })),
    )
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookie| cookie.contains(SESSION_COOKIE));
    if has_session {
        (StatusCode::OK, Json(json!({ "user": user() })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "please log in first" })))
    }
}

async fn contacts(RawQuery(query): RawQuery) -> impl IntoResponse {
    match query.as_deref() {
        None | Some("favorite=true&search=ann") => (StatusCode::OK, Json(json!({ "contacts": [], "total": 0 }))),
        Some(other) => (StatusCode::BAD_REQUEST, Json(json!({ "error": format!("unexpected query {other}") }))),
    }
}

async fn import(mut multipart: Multipart) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await.unwrap();
        return (
            StatusCode::OK,
            Json(json!({ "message": format!("{filename}:{}", bytes.len()), "imported_count": bytes.len() })),
        );
    }
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "please upload an Excel file" })))
}

async fn export() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            (header::CONTENT_DISPOSITION, "attachment; filename=contacts.xlsx"),
        ],
        vec![0x50_u8, 0x4b, 0x03, 0x04],
    )
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({}))
}

async fn forbidden() -> impl IntoResponse {
    StatusCode::FORBIDDEN
}

async fn spawn_server() -> String {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/contacts", get(contacts))
        .route("/contacts/{id}", get(forbidden))
        .route("/import", post(import))
        .route("/export", get(export))
        .route("/slow", get(slow));
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn transport(base_url: &str, timeout: Duration) -> HttpTransport {
    let config = ClientConfig::new(base_url, timeout, PathBuf::from("unused")).unwrap();
    HttpTransport::new(&config).unwrap()
}

fn client(base_url: &str) -> (ApiClient<HttpTransport>, Arc<NoticeLog>) {
    let log = Arc::new(NoticeLog::default());
    (ApiClient::with_notifier(transport(base_url, Duration::from_secs(5)), log.clone()), log)
}

#[tokio::test]
async fn login_cookie_is_sent_on_later_requests() {
    let base = spawn_server().await;
    let (api, _log) = client(&base);
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
    let mut session = Session::new(SessionStore::load(storage));

    let credentials = Credentials { username: "amy".into(), password: "secret".into() };
    session.login(&api, &credentials).await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(api.transport().session_cookie().as_deref(), Some(SESSION_COOKIE));

    let user = api.current_user().await.unwrap();
    assert_eq!(user.username, "amy");
}

#[tokio::test]
async fn restored_cookie_authenticates_new_transport() {
    let base = spawn_server().await;
    let (api, _log) = client(&base);
    assert!(api.transport().session_cookie().is_none());

    api.transport().restore_session_cookie(SESSION_COOKIE);
    assert_eq!(api.current_user().await.unwrap().id, 1);
}

#[tokio::test]
async fn missing_cookie_yields_unauthorized_with_server_message() {
    let base = spawn_server().await;
    let (api, log) = client(&base);

    let err = api.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "please log in first");
    assert_eq!(log.notices().len(), 1);
}

#[tokio::test]
async fn contact_query_reaches_server() {
    let base = spawn_server().await;
    let (api, _log) = client(&base);

    let query = ContactQuery { favorite: true, search: Some("ann".into()) };
    let list = api.list_contacts(&query).await.unwrap();
    assert_eq!(list.total, 0);
    api.list_contacts(&ContactQuery::default()).await.unwrap();
}

#[tokio::test]
async fn bare_status_uses_message_table() {
    let base = spawn_server().await;
    let (api, _log) = client(&base);

    let err = api.get_contact(3).await.unwrap_err();
    assert_eq!(err, ApiError::Forbidden { message: "access denied".to_owned() });

    let err = api.toggle_favorite(3).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn import_uploads_multipart_file() {
    let base = spawn_server().await;
    let (api, _log) = client(&base);

    let summary =
        api.import_contacts(ImportFile { filename: "people.xlsx".into(), bytes: vec![1, 2, 3] }).await.unwrap();
    assert_eq!(summary.message, "people.xlsx:3");
    assert_eq!(summary.imported_count, 3);
}

#[tokio::test]
async fn export_downloads_binary_body() {
    let base = spawn_server().await;
    let (api, _log) = client(&base);

    let file = api.export_contacts().await.unwrap();
    assert_eq!(file.bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    assert_eq!(file.filename.as_deref(), Some("contacts.xlsx"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let base = spawn_server().await;
    let log = Arc::new(NoticeLog::default());
    let api = ApiClient::with_notifier(transport(&base, Duration::from_millis(200)), log.clone());

    let err = api.execute(ApiRequest::get("/slow")).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout { timeout_ms: 200 });
    assert_eq!(log.notices()[0].message, "timeout of 200ms exceeded");
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (api, _log) = client(&format!("http://{addr}/api"));

    let err = api.health().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}
