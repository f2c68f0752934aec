//! The read-only quota peek exposed to the listing workflow UI.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use sokoni_core::types::DbId;
use sokoni_db::quota_gate::QuotaGate;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CanActivateResponse {
    pub allow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// GET /api/v1/sellers/{id}/can-activate
///
/// `CanActivateListing(sellerId)`: a non-binding preview of the decision
/// the gate will make at the activation instant.
pub async fn can_activate(
    State(state): State<AppState>,
    Path(seller_id): Path<DbId>,
) -> AppResult<Json<CanActivateResponse>> {
    let decision = QuotaGate::can_activate(&state.pool, seller_id).await?;
    Ok(Json(CanActivateResponse {
        allow: decision.is_allowed(),
        reason: decision.reason().map(|r| r.as_str()),
    }))
}
