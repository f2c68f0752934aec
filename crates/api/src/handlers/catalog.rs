//! Read-only entitlement configuration (tiers and promotion slots).

use axum::extract::State;
use axum::Json;

use sokoni_db::models::promotion::PromotionSlot;
use sokoni_db::models::tier::Tier;
use sokoni_db::repositories::{PromotionRepo, TierRepo};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/tiers
pub async fn list_tiers(State(state): State<AppState>) -> AppResult<Json<Vec<Tier>>> {
    let tiers = TierRepo::list(&state.pool).await?;
    Ok(Json(tiers))
}

/// GET /api/v1/promotion-slots
pub async fn list_promotion_slots(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PromotionSlot>>> {
    let slots = PromotionRepo::list_slots(&state.pool).await?;
    Ok(Json(slots))
}
