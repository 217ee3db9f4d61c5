//! # rxledger-db: Database Layer for RxLedger
//!
//! This crate provides database access for the RxLedger medication
//! inventory tracker. It uses SQLite for storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RxLedger Data Flow                               │
//! │                                                                         │
//! │  Route Handler (POST /api/transactions)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    rxledger-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(transaction.rs│    │  (embedded)  │  │   │
//! │  │   │               │    │ medication.rs)│    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Stock ledger  │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ Audit append  │    │              │  │   │
//! │  │   │ Management    │    │ List queries  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          ./rxledger.db (WAL mode, foreign keys on)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (medication, user,
//!   transaction, audit)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxledger_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/rxledger.db");
//! let db = Database::new(config).await?;
//!
//! let page = db.medications().list(&filter, params).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::medication::MedicationRepository;
pub use repository::transaction::TransactionRepository;
pub use repository::user::UserRepository;
