//! Read-only view over the external payment feed.

use axum::extract::{Path, State};
use axum::Json;

use sokoni_core::types::DbId;
use sokoni_db::models::payment::PaymentTransaction;
use sokoni_db::repositories::PaymentRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/sellers/{id}/payments
///
/// Completed transactions only; the engine never exposes or mutates
/// in-flight payment state.
pub async fn list_completed(
    State(state): State<AppState>,
    Path(seller_id): Path<DbId>,
) -> AppResult<Json<Vec<PaymentTransaction>>> {
    let transactions = PaymentRepo::list_completed_for_seller(&state.pool, seller_id).await?;
    Ok(Json(transactions))
}
