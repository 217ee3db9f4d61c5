//! # Repository Module
//!
//! Database repository implementations for RxLedger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Route Handler                                                         │
//! │       │                                                                 │
//! │       │  db.transactions().create(&cmd)                                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── create(&self, cmd)      ← the atomic stock-ledger unit            │
//! │  ├── list(&self, filter, params)                                       │
//! │  └── count(&self, filter)                                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • The all-or-nothing transaction boundary lives in exactly one spot   │
//! │  • Easy to test against an in-memory database                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`medication::MedicationRepository`] - Medication CRUD and listing
//! - [`user::UserRepository`] - Staff lookups
//! - [`transaction::TransactionRepository`] - The stock ledger
//! - [`audit::AuditLogRepository`] - Append-only compliance trail

pub mod audit;
pub mod medication;
pub mod transaction;
pub mod user;
