//! Router test helpers backed by a sea-orm `MockDatabase`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use bursar_shared::LedgerConfig;
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

/// Builds state over the given connection with default ledger rules.
pub fn state_with(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        ledger_config: Arc::new(LedgerConfig::default()),
        lock_timeout_ms: 5_000,
    }
}

/// State whose database answers nothing. Use for requests that must be
/// rejected before any query runs.
pub fn empty_state() -> AppState {
    state_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// A mock database primed for a unit of work (`SET LOCAL lock_timeout`).
pub fn unit_of_work_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    }])
}

/// Sends a JSON request through the full router.
pub async fn send(
    state: AppState,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map_or_else(String::new, |v| v.to_string());
    send_raw(state, method, uri, &body).await
}

/// Sends a raw body through the full router.
pub async fn send_raw(state: AppState, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = create_router(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
