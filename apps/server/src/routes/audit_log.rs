//! Audit log endpoint.
//!
//! Read-only: the trail is written exclusively by transaction processing,
//! inside the same database transaction as the event it describes.

use axum::extract::{Query, State};
use axum::Json;

use crate::error::ApiError;
use crate::routes::PageBody;
use crate::AppState;
use rxledger_core::validation::AuditLogListQuery;
use rxledger_core::{validate_audit_log_query, AuditLogView, Pagination};

/// GET /api/audit-log
///
/// Paged list, newest first, optional `?entityType=` filter. Each entry
/// carries the performing user's summary and the loosely-typed `details`
/// snapshot captured when the entry was written.
pub async fn list_audit_log(
    State(state): State<AppState>,
    Query(query): Query<AuditLogListQuery>,
) -> Result<Json<PageBody<AuditLogView>>, ApiError> {
    let (filter, params) = validate_audit_log_query(&query)?;

    let repo = state.db.audit_log();
    let data = repo.list(&filter, params).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(PageBody {
        data,
        pagination: Pagination::new(params, total),
    }))
}
