//! # rxledger-core: Pure Domain Logic for RxLedger
//!
//! This crate is the **heart** of RxLedger, a controlled-substance
//! medication inventory tracker. It contains the domain model and every
//! business rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RxLedger Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    REST API (apps/server)                       │   │
//! │  │    /api/medications  /api/transactions  /api/audit-log         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ rxledger-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐                 │   │
//! │  │   │   types   │  │ validation │  │   error   │                 │   │
//! │  │   │ Medication│  │   rules    │  │ CoreError │                 │   │
//! │  │   │Transaction│  │  field     │  │ Validation│                 │   │
//! │  │   │ AuditEntry│  │  reports   │  │  Errors   │                 │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  rxledger-db (Database Layer)                   │   │
//! │  │        SQLite repositories, migrations, stock ledger            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Medication, User, Transaction, AuditLogEntry)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation producing complete field-error reports
//!
//! ## Design Principles
//!
//! 1. **Closed enumerations**: schedule, unit, transaction type, and role are
//!    tagged enums at every boundary - wire parsing, persistence, and domain
//!    logic all reject values outside the known sets.
//! 2. **Total validation**: every constraint is checked independently and all
//!    failures are reported at once, so a caller gets one round trip to fix a
//!    form, not one-error-per-request.
//! 3. **Explicit Errors**: all errors are typed, never strings or panics.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use rxledger_core::Medication` instead of
// `use rxledger_core::types::Medication`

pub use error::{CoreError, FieldError, ValidationErrors};
pub use types::*;
pub use validation::{
    validate_audit_log_query, validate_create_medication, validate_create_transaction,
    validate_medication_query, validate_transaction_query,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default page number for list queries when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for list queries when the client omits `limit`.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Maximum page size for list queries
///
/// ## Business Reason
/// Keeps any single read bounded; clients asking for more than this fail
/// validation rather than being silently clamped.
pub const MAX_PAGE_LIMIT: u32 = 100;
