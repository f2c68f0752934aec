//! Notification read endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;

use sokoni_core::error::CoreError;
use sokoni_core::types::DbId;
use sokoni_db::models::notification::{Notification, NotificationListQuery};
use sokoni_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/sellers/{id}/notifications
pub async fn list_for_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<DbId>,
    Query(params): Query<NotificationListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = NotificationRepo::list_for_user(&state.pool, seller_id, &params).await?;
    Ok(Json(notifications))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let marked = NotificationRepo::mark_read(&state.pool, id).await?;
    if !marked {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }));
    }
    Ok(Json(serde_json::json!({ "read": true })))
}
