//! # Domain Types
//!
//! Core domain types used throughout RxLedger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Medication    │   │   Transaction   │   │ AuditLogEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  slug (business)│   │  medication_id  │   │  action         │       │
//! │  │  schedule       │   │  nurse/witness  │   │  entity (type,  │       │
//! │  │  stock_quantity │   │  type, quantity │   │   id) pair      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Schedule     │   │ TransactionType │   │      Unit       │       │
//! │  │  II III IV V    │   │ CHECKOUT RETURN │   │   mg mcg ml     │       │
//! │  │ (DEA classes)   │   │ WASTE           │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Medications carry two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `slug`: human-readable business key, used for detail lookup

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Schedule
// =============================================================================

/// DEA controlled-substance classification.
///
/// Schedule II is the most restrictive class the system stocks; Schedule I
/// substances have no accepted medical use and are never inventoried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[allow(clippy::upper_case_acronyms)]
pub enum Schedule {
    II,
    III,
    IV,
    V,
}

impl Schedule {
    /// Parses a wire-format schedule string, rejecting anything outside
    /// the known set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "II" => Some(Schedule::II),
            "III" => Some(Schedule::III),
            "IV" => Some(Schedule::IV),
            "V" => Some(Schedule::V),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Schedule::II => "II",
            Schedule::III => "III",
            Schedule::IV => "IV",
            Schedule::V => "V",
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit
// =============================================================================

/// Unit of measure for a medication's stock counter.
///
/// One canonical enumeration applied at every boundary: wire parsing,
/// validation, and the database CHECK constraint all accept exactly this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Milligrams.
    Mg,
    /// Micrograms.
    Mcg,
    /// Milliliters.
    Ml,
}

impl Unit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mg" => Some(Unit::Mg),
            "mcg" => Some(Unit::Mcg),
            "ml" => Some(Unit::Ml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Mg => "mg",
            Unit::Mcg => "mcg",
            Unit::Ml => "ml",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// The three chain-of-custody transaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Removal from stock (decrements the medication counter).
    Checkout,
    /// Return to stock (increments the medication counter).
    Return,
    /// Documented disposal. Stock is untouched; notes are mandatory.
    Waste,
}

impl TransactionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CHECKOUT" => Some(TransactionType::Checkout),
            "RETURN" => Some(TransactionType::Return),
            "WASTE" => Some(TransactionType::Waste),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Checkout => "CHECKOUT",
            TransactionType::Return => "RETURN",
            TransactionType::Waste => "WASTE",
        }
    }

    /// Audit-log action code for a transaction of this kind.
    pub fn audit_action(&self) -> &'static str {
        match self {
            TransactionType::Checkout => "TRANSACTION_CHECKOUT",
            TransactionType::Return => "TRANSACTION_RETURN",
            TransactionType::Waste => "TRANSACTION_WASTE",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Advisory staff classification. Not an authorization boundary: the core
/// never gates an operation on role, it only records who acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Nurse,
    Witness,
    Admin,
}

// =============================================================================
// Medication
// =============================================================================

/// A controlled-substance medication and its aggregate stock counter.
///
/// `stock_quantity` is never mutated directly by any endpoint; it only moves
/// through transaction processing, and the invariant `stock_quantity >= 0`
/// is enforced by rejecting checkouts that would violate it - never by
/// clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable medication name.
    pub name: String,

    /// DEA schedule classification.
    pub schedule: Schedule,

    /// Unit of measure for the stock counter.
    pub unit: Unit,

    /// Current stock level. Invariant: never negative.
    pub stock_quantity: i64,

    /// Unique human-readable lookup key (e.g. "morphine-sulfate").
    pub slug: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A clinical staff member. Referenced, never mutated, by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The only user projection ever attached to API responses.
/// Role, email verification state, etc. are never leaked through joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A chain-of-custody transaction. Immutable once created: there is no
/// update or delete path anywhere in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub medication_id: String,
    pub nurse_id: String,
    /// Second required actor, distinct from the nurse.
    pub witness_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always strictly positive.
    pub quantity: i64,
    /// Free-text notes; mandatory and non-blank for WASTE.
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A transaction joined with its nurse and witness summaries.
/// Used in medication detail history, where the parent medication is implied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithActors {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub nurse: UserSummary,
    pub witness: UserSummary,
}

/// A transaction joined with its medication and both actor summaries.
/// This is the shape returned by POST /transactions and GET /transactions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub medication: Medication,
    pub nurse: UserSummary,
    pub witness: UserSummary,
}

/// A medication joined with its full transaction history, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDetail {
    #[serde(flatten)]
    pub medication: Medication,
    pub transactions: Vec<TransactionWithActors>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// An append-only compliance record. Never mutated or deleted.
///
/// `details` is a loosely-typed bag whose shape varies per action code; for
/// `TRANSACTION_*` actions it is the point-in-time snapshot
/// `{transactionType, medicationId, medicationName, quantity, unit,
/// witnessId, notes}`. The medication name is captured at call time, so
/// later renames never retroactively alter historical audit text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    /// Free-text action code, e.g. "TRANSACTION_CHECKOUT".
    pub action: String,
    /// What was acted upon, as a loosely-typed (type, id) pair.
    pub entity_type: String,
    pub entity_id: String,
    pub performed_by_id: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An audit entry joined with the performing user's summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    #[serde(flatten)]
    pub entry: AuditLogEntry,
    pub performed_by: UserSummary,
}

// =============================================================================
// Validated Commands
// =============================================================================
// These are the fully-typed outputs of the validation layer. Anything
// holding one of these has already passed every structural constraint.

/// A validated medication-create command.
#[derive(Debug, Clone)]
pub struct CreateMedication {
    pub name: String,
    pub schedule: Schedule,
    pub unit: Unit,
    pub slug: String,
    pub stock_quantity: i64,
}

/// A validated transaction-create command.
///
/// Identity fields are verified UUID tokens; referential existence is the
/// entity-lookup gate's job, not this type's.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub medication_id: String,
    pub nurse_id: String,
    pub witness_id: String,
    pub kind: TransactionType,
    pub quantity: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Validated pagination parameters. `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    /// Row offset for the current page.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageParams {
    fn default() -> Self {
        PageParams {
            page: crate::DEFAULT_PAGE,
            limit: crate::DEFAULT_PAGE_LIMIT,
        }
    }
}

/// The pagination envelope attached to every list response.
///
/// `total` is a true row count over the active filter (a separate COUNT
/// query), not the length of the returned page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        Pagination {
            page: params.page,
            limit: params.limit,
            total,
            total_pages: (total + params.limit as i64 - 1) / params.limit as i64,
        }
    }
}

// =============================================================================
// List Filters
// =============================================================================

/// Optional single-field filter for medication listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedicationFilter {
    pub schedule: Option<Schedule>,
}

/// Optional filters for transaction listing.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub medication_id: Option<String>,
}

/// Optional filter for audit-log listing.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_round_trip() {
        for s in ["II", "III", "IV", "V"] {
            assert_eq!(Schedule::parse(s).unwrap().as_str(), s);
        }
        assert!(Schedule::parse("I").is_none());
        assert!(Schedule::parse("ii").is_none());
    }

    #[test]
    fn test_unit_round_trip() {
        for u in ["mg", "mcg", "ml"] {
            assert_eq!(Unit::parse(u).unwrap().as_str(), u);
        }
        assert!(Unit::parse("MG").is_none());
        assert!(Unit::parse("g").is_none());
    }

    #[test]
    fn test_transaction_type_audit_action() {
        assert_eq!(
            TransactionType::Checkout.audit_action(),
            "TRANSACTION_CHECKOUT"
        );
        assert_eq!(TransactionType::Return.audit_action(), "TRANSACTION_RETURN");
        assert_eq!(TransactionType::Waste.audit_action(), "TRANSACTION_WASTE");
    }

    #[test]
    fn test_transaction_serializes_type_field() {
        let tx = Transaction {
            id: "t-1".to_string(),
            medication_id: "m-1".to_string(),
            nurse_id: "n-1".to_string(),
            witness_id: "w-1".to_string(),
            kind: TransactionType::Checkout,
            quantity: 50,
            notes: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "CHECKOUT");
        assert_eq!(json["medicationId"], "m-1");
    }

    #[test]
    fn test_pagination_total_pages() {
        let params = PageParams { page: 1, limit: 20 };
        assert_eq!(Pagination::new(params, 0).total_pages, 0);
        assert_eq!(Pagination::new(params, 1).total_pages, 1);
        assert_eq!(Pagination::new(params, 20).total_pages, 1);
        assert_eq!(Pagination::new(params, 21).total_pages, 2);
    }

    #[test]
    fn test_page_params_offset() {
        assert_eq!(PageParams { page: 1, limit: 20 }.offset(), 0);
        assert_eq!(PageParams { page: 3, limit: 20 }.offset(), 40);
    }
}
