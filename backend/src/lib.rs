//! # Debt Tracker Backend
//!
//! Tracks a single running debt: payments reduce it, borrows increase it, and
//! simple daily interest is charged whenever a transaction is recorded. The
//! last ten transactions can be undone.
//!
//! ## Architecture
//!
//! ```text
//! CLI (main.rs) / REST API (io)
//!     ↓
//! Domain (ledger service, accrual, undo history)
//!     ↓
//! Storage (ledger repository over a key-value store)
//! ```
//!
//! The same [`LedgerService`] backs both the CLI and the REST server.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::LedgerConfig;
use crate::domain::{Clock, LedgerService};
use crate::storage::{KeyValueStore, LedgerRepository};

/// Shared application state. Commands are serialized through the mutex, so
/// two requests never interleave on the ledger.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<LedgerService>>,
}

/// Load the ledger from `store` and wrap it in application state
pub async fn initialize_backend(
    config: &LedgerConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> Result<AppState> {
    info!("Setting up ledger");
    let repository = LedgerRepository::new(store);
    let service = LedgerService::load(repository, config, clock)
        .await
        .context("failed to load the ledger")?;

    Ok(AppState {
        ledger: Arc::new(Mutex::new(service)),
    })
}

/// Create the Axum router with CORS restricted to `allowed_origin`
pub fn create_router(app_state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("invalid allowed origin '{}'", allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new().nest("/ledger", io::rest::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
