//! Medication endpoints.
//!
//! Listing, slug-keyed detail with full transaction history, and creation.
//! Note there is no update or delete: the stock counter only moves through
//! transaction processing, and medications are otherwise immutable here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::routes::{DataBody, PageBody};
use crate::AppState;
use rxledger_core::validation::{CreateMedicationRequest, MedicationListQuery};
use rxledger_core::{
    validate_create_medication, validate_medication_query, Medication, MedicationDetail,
    Pagination,
};

/// GET /api/medications
///
/// Paged list, name ascending, optional `?schedule=` filter. The envelope
/// total is a true count over the filter, independent of the page slice.
pub async fn list_medications(
    State(state): State<AppState>,
    Query(query): Query<MedicationListQuery>,
) -> Result<Json<PageBody<Medication>>, ApiError> {
    let (filter, params) = validate_medication_query(&query)?;

    let repo = state.db.medications();
    let data = repo.list(&filter, params).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(PageBody {
        data,
        pagination: Pagination::new(params, total),
    }))
}

/// GET /api/medications/:slug
///
/// Detail lookup by business key, with the complete transaction history
/// (newest first) and both actors attached to each entry.
pub async fn get_medication(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DataBody<MedicationDetail>>, ApiError> {
    let medication = state
        .db
        .medications()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Medication not found".to_string()))?;

    let transactions = state
        .db
        .transactions()
        .list_for_medication(&medication.id)
        .await?;

    Ok(Json(DataBody {
        data: MedicationDetail {
            medication,
            transactions,
        },
    }))
}

/// POST /api/medications
pub async fn create_medication(
    State(state): State<AppState>,
    Json(body): Json<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<DataBody<Medication>>), ApiError> {
    let cmd = validate_create_medication(&body)?;

    let medication = state.db.medications().insert(&cmd).await?;

    info!(slug = %medication.slug, "Medication created");

    Ok((StatusCode::CREATED, Json(DataBody { data: medication })))
}
