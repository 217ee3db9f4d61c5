//! # Validation Module
//!
//! Input validation for RxLedger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum extractors)                                       │
//! │  ├── JSON well-formedness                                              │
//! │  └── Query-string decoding                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Raw, loosely-typed request → fully-typed command                  │
//! │  └── Every constraint checked; all failures reported at once           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / CHECK constraints                             │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Request types here are deliberately loose (every field optional, numbers
//! untyped) so that a missing or malformed field becomes a reported
//! `FieldError` instead of a deserialization failure. The validators return
//! either a constraint-satisfying command from [`crate::types`] or the
//! complete [`ValidationErrors`] report.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ValidationErrors;
use crate::types::{
    AuditLogFilter, CreateMedication, CreateTransaction, MedicationFilter, PageParams, Schedule,
    TransactionFilter, TransactionType, Unit,
};
use crate::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Raw Request Types
// =============================================================================

/// Raw transaction-create body, before any constraint has been checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub medication_id: Option<String>,
    #[serde(default)]
    pub nurse_id: Option<String>,
    #[serde(default)]
    pub witness_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub quantity: Option<serde_json::Number>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Raw medication-create body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<serde_json::Number>,
}

/// Raw query string for GET /medications.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationListQuery {
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Raw query string for GET /transactions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub medication_id: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Raw query string for GET /audit-log.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogListQuery {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a UUID identity token, reporting under the given field path.
fn check_uuid(report: &mut ValidationErrors, path: &str, value: Option<&str>, message: &str) {
    match value {
        Some(v) if Uuid::parse_str(v).is_ok() => {}
        _ => report.push(path, message),
    }
}

/// Validates a strictly positive integer quantity.
///
/// Fractional and non-numeric values are rejected; stock moves in whole
/// units of the medication's unit-of-measure.
fn check_positive_int(
    report: &mut ValidationErrors,
    path: &str,
    value: Option<&serde_json::Number>,
    message: &str,
) -> Option<i64> {
    match value.and_then(|n| n.as_i64()) {
        Some(n) if n > 0 => Some(n),
        _ => {
            report.push(path, message);
            None
        }
    }
}

/// Validates pagination parameters, appending to the shared report.
///
/// ## Rules
/// - `page` >= 1, default 1
/// - `limit` in 1..=100, default 20; values above 100 fail validation
///   rather than being clamped
fn check_page_params(
    report: &mut ValidationErrors,
    page: Option<&str>,
    limit: Option<&str>,
) -> PageParams {
    let page = match page {
        None => DEFAULT_PAGE,
        Some(raw) => match raw.parse::<i64>() {
            Ok(p) if p >= 1 => p as u32,
            _ => {
                report.push("page", "Page must be a positive integer");
                DEFAULT_PAGE
            }
        },
    };

    let limit = match limit {
        None => DEFAULT_PAGE_LIMIT,
        Some(raw) => match raw.parse::<i64>() {
            Ok(l) if l >= 1 && l <= MAX_PAGE_LIMIT as i64 => l as u32,
            Ok(l) if l > MAX_PAGE_LIMIT as i64 => {
                report.push("limit", "Limit cannot exceed 100");
                DEFAULT_PAGE_LIMIT
            }
            _ => {
                report.push("limit", "Limit must be a positive integer");
                DEFAULT_PAGE_LIMIT
            }
        },
    };

    PageParams { page, limit }
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a transaction-create request.
///
/// All rules are applied together; the report lists every violated field:
/// - `medicationId`, `nurseId`, `witnessId` are well-formed UUIDs
/// - `type` ∈ {CHECKOUT, RETURN, WASTE}
/// - `quantity` is a strictly positive integer
/// - `nurseId ≠ witnessId` (a person cannot witness their own transaction)
/// - `notes` required and non-blank when `type` = WASTE
pub fn validate_create_transaction(
    req: &CreateTransactionRequest,
) -> Result<CreateTransaction, ValidationErrors> {
    let mut report = ValidationErrors::new();

    check_uuid(
        &mut report,
        "medicationId",
        req.medication_id.as_deref(),
        "Invalid medication ID format",
    );
    check_uuid(
        &mut report,
        "nurseId",
        req.nurse_id.as_deref(),
        "Invalid nurse ID format",
    );
    check_uuid(
        &mut report,
        "witnessId",
        req.witness_id.as_deref(),
        "Invalid witness ID format",
    );

    let kind = match req.kind.as_deref().and_then(TransactionType::parse) {
        Some(kind) => Some(kind),
        None => {
            report.push("type", "Type must be one of CHECKOUT, RETURN, WASTE");
            None
        }
    };

    let quantity = check_positive_int(
        &mut report,
        "quantity",
        req.quantity.as_ref(),
        "Quantity must be a positive number",
    );

    // Distinct-actor rule: only meaningful once both ids are present.
    if let (Some(nurse), Some(witness)) = (req.nurse_id.as_deref(), req.witness_id.as_deref()) {
        if nurse == witness {
            report.push(
                "witnessId",
                "Witness must be a different person than the nurse",
            );
        }
    }

    // Conditional mandatory field: WASTE must document what was disposed.
    if kind == Some(TransactionType::Waste) {
        let blank = req
            .notes
            .as_deref()
            .map(|n| n.trim().is_empty())
            .unwrap_or(true);
        if blank {
            report.push("notes", "Notes are required for WASTE transactions");
        }
    }

    if !report.is_empty() {
        return Err(report);
    }

    // Unwraps below cannot fire: an empty report implies every field parsed.
    Ok(CreateTransaction {
        medication_id: req.medication_id.clone().unwrap_or_default(),
        nurse_id: req.nurse_id.clone().unwrap_or_default(),
        witness_id: req.witness_id.clone().unwrap_or_default(),
        kind: kind.unwrap_or(TransactionType::Checkout),
        quantity: quantity.unwrap_or_default(),
        notes: req.notes.clone().filter(|n| !n.trim().is_empty()),
    })
}

/// Validates a medication-create request.
///
/// `stockQuantity` is optional and defaults to zero, but when supplied it
/// must be a strictly positive integer.
pub fn validate_create_medication(
    req: &CreateMedicationRequest,
) -> Result<CreateMedication, ValidationErrors> {
    let mut report = ValidationErrors::new();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        report.push("name", "Name is required");
    }

    let schedule = match req.schedule.as_deref().and_then(Schedule::parse) {
        Some(schedule) => Some(schedule),
        None => {
            report.push("schedule", "Schedule must be one of II, III, IV, V");
            None
        }
    };

    let unit = match req.unit.as_deref().and_then(Unit::parse) {
        Some(unit) => Some(unit),
        None => {
            report.push("unit", "Unit must be one of mg, mcg, ml");
            None
        }
    };

    let slug = req.slug.as_deref().map(str::trim).unwrap_or_default();
    if slug.is_empty() {
        report.push("slug", "Slug is required");
    }

    let stock_quantity = match req.stock_quantity.as_ref() {
        None => 0,
        Some(n) => check_positive_int(
            &mut report,
            "stockQuantity",
            Some(n),
            "Stock quantity must be a positive number",
        )
        .unwrap_or_default(),
    };

    report.into_result(CreateMedication {
        name: name.to_string(),
        schedule: schedule.unwrap_or(Schedule::II),
        unit: unit.unwrap_or(Unit::Mg),
        slug: slug.to_string(),
        stock_quantity,
    })
}

// =============================================================================
// Query Validators
// =============================================================================

/// Validates GET /medications query parameters.
pub fn validate_medication_query(
    query: &MedicationListQuery,
) -> Result<(MedicationFilter, PageParams), ValidationErrors> {
    let mut report = ValidationErrors::new();

    let schedule = match query.schedule.as_deref() {
        None => None,
        Some(raw) => match Schedule::parse(raw) {
            Some(schedule) => Some(schedule),
            None => {
                report.push("schedule", "Schedule must be one of II, III, IV, V");
                None
            }
        },
    };

    let params = check_page_params(&mut report, query.page.as_deref(), query.limit.as_deref());

    report.into_result((MedicationFilter { schedule }, params))
}

/// Validates GET /transactions query parameters.
pub fn validate_transaction_query(
    query: &TransactionListQuery,
) -> Result<(TransactionFilter, PageParams), ValidationErrors> {
    let mut report = ValidationErrors::new();

    let kind = match query.kind.as_deref() {
        None => None,
        Some(raw) => match TransactionType::parse(raw) {
            Some(kind) => Some(kind),
            None => {
                report.push("type", "Type must be one of CHECKOUT, RETURN, WASTE");
                None
            }
        },
    };

    let medication_id = match query.medication_id.as_deref() {
        None => None,
        Some(raw) => {
            if Uuid::parse_str(raw).is_ok() {
                Some(raw.to_string())
            } else {
                report.push("medicationId", "Invalid medication ID format");
                None
            }
        }
    };

    let params = check_page_params(&mut report, query.page.as_deref(), query.limit.as_deref());

    report.into_result((
        TransactionFilter {
            kind,
            medication_id,
        },
        params,
    ))
}

/// Validates GET /audit-log query parameters.
///
/// `entityType` is a free string (the audit log references entities by a
/// loosely-typed pair, so no closed set applies).
pub fn validate_audit_log_query(
    query: &AuditLogListQuery,
) -> Result<(AuditLogFilter, PageParams), ValidationErrors> {
    let mut report = ValidationErrors::new();

    let entity_type = query
        .entity_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let params = check_page_params(&mut report, query.page.as_deref(), query.limit.as_deref());

    report.into_result((AuditLogFilter { entity_type }, params))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MED_ID: &str = "00000000-0000-4000-8000-000000000001";
    const NURSE_ID: &str = "00000000-0000-4000-8000-000000000002";
    const WITNESS_ID: &str = "00000000-0000-4000-8000-000000000003";

    fn valid_checkout() -> CreateTransactionRequest {
        CreateTransactionRequest {
            medication_id: Some(MED_ID.to_string()),
            nurse_id: Some(NURSE_ID.to_string()),
            witness_id: Some(WITNESS_ID.to_string()),
            kind: Some("CHECKOUT".to_string()),
            quantity: Some(serde_json::Number::from(50)),
            notes: None,
        }
    }

    fn paths(errors: &ValidationErrors) -> Vec<&str> {
        errors.errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_valid_checkout_passes() {
        let cmd = validate_create_transaction(&valid_checkout()).unwrap();
        assert_eq!(cmd.kind, TransactionType::Checkout);
        assert_eq!(cmd.quantity, 50);
        assert_eq!(cmd.medication_id, MED_ID);
        assert!(cmd.notes.is_none());
    }

    #[test]
    fn test_all_violations_reported_at_once() {
        let req = CreateTransactionRequest {
            medication_id: Some("not-a-uuid".to_string()),
            nurse_id: None,
            witness_id: None,
            kind: Some("BORROW".to_string()),
            quantity: Some(serde_json::Number::from(0)),
            notes: None,
        };
        let err = validate_create_transaction(&req).unwrap_err();
        let paths = paths(&err);
        assert!(paths.contains(&"medicationId"));
        assert!(paths.contains(&"nurseId"));
        assert!(paths.contains(&"witnessId"));
        assert!(paths.contains(&"type"));
        assert!(paths.contains(&"quantity"));
    }

    #[test]
    fn test_nurse_cannot_witness_own_transaction() {
        let mut req = valid_checkout();
        req.witness_id = Some(NURSE_ID.to_string());
        let err = validate_create_transaction(&req).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].path, "witnessId");
        assert_eq!(
            err.errors[0].message,
            "Witness must be a different person than the nurse"
        );
    }

    #[test]
    fn test_waste_requires_notes() {
        let mut req = valid_checkout();
        req.kind = Some("WASTE".to_string());

        let err = validate_create_transaction(&req).unwrap_err();
        assert_eq!(paths(&err), vec!["notes"]);

        req.notes = Some("   ".to_string());
        let err = validate_create_transaction(&req).unwrap_err();
        assert_eq!(paths(&err), vec!["notes"]);

        req.notes = Some("Contaminated".to_string());
        let cmd = validate_create_transaction(&req).unwrap();
        assert_eq!(cmd.notes.as_deref(), Some("Contaminated"));
    }

    #[test]
    fn test_checkout_notes_optional() {
        let mut req = valid_checkout();
        req.notes = Some("Patient 1402".to_string());
        let cmd = validate_create_transaction(&req).unwrap();
        assert_eq!(cmd.notes.as_deref(), Some("Patient 1402"));
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let mut req = valid_checkout();
        req.quantity = serde_json::Number::from_f64(2.5);
        let err = validate_create_transaction(&req).unwrap_err();
        assert_eq!(paths(&err), vec!["quantity"]);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut req = valid_checkout();
        req.quantity = Some(serde_json::Number::from(-5));
        let err = validate_create_transaction(&req).unwrap_err();
        assert_eq!(paths(&err), vec!["quantity"]);
    }

    #[test]
    fn test_valid_medication_passes() {
        let req = CreateMedicationRequest {
            name: Some("Morphine Sulfate".to_string()),
            schedule: Some("II".to_string()),
            unit: Some("mg".to_string()),
            slug: Some("morphine-sulfate".to_string()),
            stock_quantity: Some(serde_json::Number::from(500)),
        };
        let cmd = validate_create_medication(&req).unwrap();
        assert_eq!(cmd.schedule, Schedule::II);
        assert_eq!(cmd.unit, Unit::Mg);
        assert_eq!(cmd.stock_quantity, 500);
    }

    #[test]
    fn test_medication_stock_defaults_to_zero() {
        let req = CreateMedicationRequest {
            name: Some("Codeine".to_string()),
            schedule: Some("III".to_string()),
            unit: Some("mg".to_string()),
            slug: Some("codeine".to_string()),
            stock_quantity: None,
        };
        assert_eq!(validate_create_medication(&req).unwrap().stock_quantity, 0);
    }

    #[test]
    fn test_medication_missing_fields_all_reported() {
        let req = CreateMedicationRequest::default();
        let err = validate_create_medication(&req).unwrap_err();
        let paths = paths(&err);
        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"schedule"));
        assert!(paths.contains(&"unit"));
        assert!(paths.contains(&"slug"));
    }

    #[test]
    fn test_medication_unknown_unit_rejected() {
        let req = CreateMedicationRequest {
            name: Some("Test".to_string()),
            schedule: Some("IV".to_string()),
            unit: Some("tablets".to_string()),
            slug: Some("test".to_string()),
            stock_quantity: None,
        };
        let err = validate_create_medication(&req).unwrap_err();
        assert_eq!(paths(&err), vec!["unit"]);
    }

    #[test]
    fn test_page_defaults() {
        let (_, params) = validate_medication_query(&MedicationListQuery::default()).unwrap();
        assert_eq!(params, PageParams { page: 1, limit: 20 });
    }

    #[test]
    fn test_page_below_one_rejected() {
        let query = MedicationListQuery {
            page: Some("0".to_string()),
            ..Default::default()
        };
        let err = validate_medication_query(&query).unwrap_err();
        assert_eq!(paths(&err), vec!["page"]);
    }

    #[test]
    fn test_limit_above_max_rejected() {
        let query = MedicationListQuery {
            limit: Some("101".to_string()),
            ..Default::default()
        };
        let err = validate_medication_query(&query).unwrap_err();
        assert_eq!(err.errors[0].message, "Limit cannot exceed 100");
    }

    #[test]
    fn test_limit_at_max_accepted() {
        let query = MedicationListQuery {
            limit: Some("100".to_string()),
            ..Default::default()
        };
        let (_, params) = validate_medication_query(&query).unwrap();
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn test_non_numeric_page_rejected() {
        let query = MedicationListQuery {
            page: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(validate_medication_query(&query).is_err());
    }

    #[test]
    fn test_schedule_filter_parsed() {
        let query = MedicationListQuery {
            schedule: Some("II".to_string()),
            ..Default::default()
        };
        let (filter, _) = validate_medication_query(&query).unwrap();
        assert_eq!(filter.schedule, Some(Schedule::II));
    }

    #[test]
    fn test_unknown_schedule_filter_rejected() {
        let query = MedicationListQuery {
            schedule: Some("VI".to_string()),
            ..Default::default()
        };
        assert!(validate_medication_query(&query).is_err());
    }

    #[test]
    fn test_transaction_query_filters() {
        let query = TransactionListQuery {
            kind: Some("WASTE".to_string()),
            medication_id: Some(MED_ID.to_string()),
            ..Default::default()
        };
        let (filter, _) = validate_transaction_query(&query).unwrap();
        assert_eq!(filter.kind, Some(TransactionType::Waste));
        assert_eq!(filter.medication_id.as_deref(), Some(MED_ID));
    }

    #[test]
    fn test_audit_query_blank_entity_type_ignored() {
        let query = AuditLogListQuery {
            entity_type: Some("  ".to_string()),
            ..Default::default()
        };
        let (filter, _) = validate_audit_log_query(&query).unwrap();
        assert!(filter.entity_type.is_none());
    }
}
