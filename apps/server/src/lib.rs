//! # RxLedger Server Library
//!
//! Router construction and shared state for the REST API. Split from the
//! binary so integration tests can drive the router in-process with
//! `tower::ServiceExt::oneshot` instead of a live socket.

pub mod config;
pub mod error;
pub mod routes;

use rxledger_db::Database;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub use routes::create_router;
