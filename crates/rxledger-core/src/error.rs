//! # Error Types
//!
//! Domain-specific error types for rxledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rxledger-core errors (this file)                                      │
//! │  ├── CoreError         - Lookup and domain-invariant failures          │
//! │  └── ValidationErrors  - Complete field-level failure reports          │
//! │                                                                         │
//! │  rxledger-db errors (separate crate)                                   │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  HTTP boundary (apps/server)                                           │
//! │  └── ApiError          - Status code + uniform JSON error body         │
//! │                                                                         │
//! │  Flow: ValidationErrors → CoreError → DbError → ApiError → client      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (available stock, unit, etc.)
//! 3. Validation never throws past the boundary: it reports every violated
//!    field at once as a list of (path, message) pairs

use serde::Serialize;
use thiserror::Error;

use crate::types::Unit;

// =============================================================================
// Validation Errors
// =============================================================================

/// A single violated constraint: which field, and why.
///
/// `path` uses the wire-format (camelCase) field name so the caller can map
/// it straight back onto a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The complete set of constraint violations for one request.
///
/// Validation is total: every rule is checked independently, so this always
/// lists every violated field, not just the first.
#[derive(Debug, Clone, Default, Error)]
#[error("Validation Error")]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors { errors: Vec::new() }
    }

    /// Records one violated constraint.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the collector: `Ok(value)` when nothing was violated,
    /// otherwise the full report.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Lookup and domain-invariant failures.
///
/// These carry exactly the message the API boundary surfaces, so the
/// translation layer never has to re-derive wording.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced medication id or slug does not exist.
    #[error("Medication not found")]
    MedicationNotFound,

    /// The referenced nurse user does not exist.
    #[error("Nurse not found")]
    NurseNotFound,

    /// The referenced witness user does not exist.
    #[error("Witness not found")]
    WitnessNotFound,

    /// A CHECKOUT would drive the stock counter negative.
    ///
    /// ## When This Occurs
    /// ```text
    /// CHECKOUT quantity=600
    ///      │
    ///      ▼
    /// medication.stock_quantity = 450
    ///      │
    ///      ▼
    /// InsufficientStock { available: 450, unit: Mg, requested: 600 }
    ///      │
    ///      ▼
    /// 400 "Insufficient stock. Available: 450 mg"
    /// ```
    #[error("Insufficient stock. Available: {available} {unit}")]
    InsufficientStock {
        available: i64,
        unit: Unit,
        requested: i64,
    },

    /// Input validation failed (wraps the complete field report).
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
