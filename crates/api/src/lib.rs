//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for accounts, transfers and pending transactions
//! - Error rendering shared by every handler
//! - Application state and router construction

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use bursar_db::{AccountRepository, LedgerRepository};
use bursar_shared::LedgerConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Account creation rules.
    pub ledger_config: Arc<LedgerConfig>,
    /// Bound on row-lock waits inside a unit of work.
    pub lock_timeout_ms: u64,
}

impl AppState {
    /// Returns an account repository over the shared pool.
    #[must_use]
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(Arc::clone(&self.db))
    }

    /// Returns a ledger repository over the shared pool.
    #[must_use]
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(Arc::clone(&self.db), self.lock_timeout_ms)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
