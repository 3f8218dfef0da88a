//! Shared test utilities: an in-process fake of the query service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const USER: &str = "manager";
pub const PASSWORD: &str = "secret";
pub const COMPANY: &str = "SBODEMO";
const TOKEN: &str = "sess-1";

/// Knobs and recordings of the fake server.
#[derive(Default)]
pub struct FakeService {
    /// Stored queries by code.
    pub queries: Mutex<HashMap<String, Value>>,
    /// Answer lookups of missing queries with 400 and the not-found marker.
    pub marker_for_missing: bool,
    /// Accept creates without storing them.
    pub drop_creates: bool,
    /// Fixed status for lookups of these codes.
    pub check_status: HashMap<String, u16>,
    /// Fixed status for creates of these codes.
    pub create_status: HashMap<String, u16>,
    /// Delay lookups of these codes.
    pub slow_checks: HashMap<String, Duration>,
    /// Bodies of every accepted or refused create.
    pub create_bodies: Mutex<Vec<Value>>,
    /// Cookie header of every lookup.
    pub check_cookies: Mutex<Vec<Option<String>>>,
    pub logins: AtomicUsize,
    pub logouts: AtomicUsize,
}

impl FakeService {
    pub fn with_queries(codes: &[&str]) -> Self {
        let svc = Self::default();
        {
            let mut queries = svc.queries.lock().unwrap();
            for code in codes {
                queries.insert(code.to_string(), json!({"SqlCode": code}));
            }
        }
        svc
    }

    pub fn stored(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.queries.lock().unwrap().keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn create_count(&self) -> usize {
        self.create_bodies.lock().unwrap().len()
    }
}

type Shared = Arc<FakeService>;

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.split(';').any(|p| p.trim().ends_with(&format!("={}", TOKEN))))
}

fn error_body(code: i64, message: &str) -> Json<Value> {
    Json(json!({"error": {"code": code, "message": {"lang": "en-us", "value": message}}}))
}

async fn login(State(svc): State<Shared>, Json(body): Json<Value>) -> Response {
    svc.logins.fetch_add(1, Ordering::SeqCst);
    let field = |a: &str, b: &str| {
        body.get(a)
            .or_else(|| body.get(b))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    if field("UserName", "username") != USER
        || field("Password", "password") != PASSWORD
        || field("CompanyDB", "company") != COMPANY
    {
        return (StatusCode::UNAUTHORIZED, error_body(-304, "Fail to get DB Credentials")).into_response();
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("B1SESSION={}; HttpOnly; path=/b1s", TOKEN))],
        Json(json!({"SessionId": TOKEN, "SessionTimeout": 30})),
    )
        .into_response()
}

async fn logout(State(svc): State<Shared>) -> StatusCode {
    svc.logouts.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn lookup(svc: Shared, code: String, headers: HeaderMap) -> Response {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    svc.check_cookies.lock().unwrap().push(cookie);

    if let Some(delay) = svc.slow_checks.get(&code) {
        tokio::time::sleep(*delay).await;
    }
    if let Some(status) = svc.check_status.get(&code) {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, error_body(-1, "Internal error")).into_response();
    }
    if !has_session(&headers) {
        return (StatusCode::UNAUTHORIZED, error_body(301, "Invalid session")).into_response();
    }

    let found = svc.queries.lock().unwrap().get(&code).cloned();
    match found {
        Some(query) => (StatusCode::OK, Json(query)).into_response(),
        None if svc.marker_for_missing => (
            StatusCode::BAD_REQUEST,
            error_body(-2028, "No matching records found (ODBC -2028)"),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, error_body(-2028, "Not found")).into_response(),
    }
}

async fn lookup_service_layer(
    State(svc): State<Shared>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    let code = key
        .strip_prefix("SQLQueries('")
        .and_then(|k| k.strip_suffix("')"))
        .map(|k| k.replace("''", "'"));
    match code {
        Some(code) => lookup(svc, code, headers).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn lookup_generic(
    State(svc): State<Shared>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Response {
    lookup(svc, code, headers).await
}

async fn create(State(svc): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    svc.create_bodies.lock().unwrap().push(body.clone());
    if !has_session(&headers) {
        return (StatusCode::UNAUTHORIZED, error_body(301, "Invalid session")).into_response();
    }

    let code = body
        .get("SqlCode")
        .or_else(|| body.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if let Some(status) = svc.create_status.get(&code) {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, error_body(-10, "Invalid SQL text")).into_response();
    }

    let mut queries = svc.queries.lock().unwrap();
    if queries.contains_key(&code) {
        return (StatusCode::BAD_REQUEST, error_body(-2035, "This entry already exists")).into_response();
    }
    if !svc.drop_creates {
        queries.insert(code, body.clone());
    }
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Fake query service bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub service: Shared,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    pub async fn spawn(service: FakeService) -> Self {
        let service = Arc::new(service);
        let router = Router::new()
            .route("/b1s/v1/Login", post(login))
            .route("/b1s/v1/Logout", post(logout))
            .route("/b1s/v1/SQLQueries", post(create))
            .route("/b1s/v1/{key}", get(lookup_service_layer))
            .route("/login", post(login))
            .route("/resources", post(create))
            .route("/resources/{code}", get(lookup_generic))
            .with_state(service.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr,
            service,
            shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}
