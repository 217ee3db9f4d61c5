//! Transaction endpoints.
//!
//! POST is the system's core operation: one validated command processed as
//! a single atomic unit in the database layer (stock mutation, transaction
//! record, audit entry). This handler only translates HTTP to the command
//! and back; it holds no ledger logic of its own.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::routes::{DataBody, PageBody};
use crate::AppState;
use rxledger_core::validation::{CreateTransactionRequest, TransactionListQuery};
use rxledger_core::{
    validate_create_transaction, validate_transaction_query, Pagination, TransactionView,
};

/// POST /api/transactions
///
/// ## Status Codes
/// * `201` - Created; the body carries the transaction with the
///   post-mutation medication and both actor summaries
/// * `400` - Validation failure (all field errors at once) or
///   insufficient stock
/// * `404` - Unknown medication, nurse, or witness
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<DataBody<TransactionView>>), ApiError> {
    let cmd = validate_create_transaction(&body)?;

    let view = state.db.transactions().create(&cmd).await?;

    info!(
        id = %view.transaction.id,
        kind = %view.transaction.kind,
        medication = %view.medication.slug,
        "Transaction recorded"
    );

    Ok((StatusCode::CREATED, Json(DataBody { data: view })))
}

/// GET /api/transactions
///
/// Paged list, newest first, optional `?type=` and `?medicationId=`
/// filters (ANDed when both present).
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<PageBody<TransactionView>>, ApiError> {
    let (filter, params) = validate_transaction_query(&query)?;

    let repo = state.db.transactions();
    let data = repo.list(&filter, params).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(PageBody {
        data,
        pagination: Pagination::new(params, total),
    }))
}
