//! # Route Layer
//!
//! REST API handlers and router assembly.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Surface                                   │
//! │                                                                         │
//! │  GET  /api/health                 Liveness + database reachability     │
//! │                                                                         │
//! │  GET  /api/medications            Paged list (?schedule=&page=&limit=) │
//! │  POST /api/medications            Create                               │
//! │  GET  /api/medications/:slug      Detail + full transaction history    │
//! │                                                                         │
//! │  POST /api/transactions           The ledger operation                 │
//! │  GET  /api/transactions           Paged list (?type=&medicationId=)    │
//! │                                                                         │
//! │  GET  /api/audit-log              Paged list (?entityType=)            │
//! │                                                                         │
//! │  Success bodies:  { "data": ... }                                      │
//! │  List bodies:     { "data": [...], "pagination": {...} }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audit_log;
pub mod health;
pub mod medications;
pub mod transactions;

use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use rxledger_core::Pagination;

/// Creates the API router with all routes and middleware attached.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route(
            "/api/medications",
            get(medications::list_medications).post(medications::create_medication),
        )
        .route("/api/medications/:slug", get(medications::get_medication))
        .route(
            "/api/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route("/api/audit-log", get(audit_log::list_audit_log))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `{ "data": ... }` success envelope.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

/// `{ "data": [...], "pagination": {...} }` list envelope.
#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
