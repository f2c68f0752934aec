//! Promotion slot configuration and the occupancy ledger.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sokoni_core::types::{DbId, Timestamp};

/// A row from the `promotion_slots` table. Read-only configuration.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromotionSlot {
    pub id: DbId,
    pub placement_key: String,
    /// Global cap on concurrent live occupants of this placement.
    pub max_ads: i32,
    pub duration_days: i32,
    pub price_cents: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a promotion slot (operator configuration surface).
#[derive(Debug, Deserialize)]
pub struct CreatePromotionSlot {
    pub placement_key: String,
    pub max_ads: i32,
    pub duration_days: i32,
    pub price_cents: Option<i64>,
}

/// A row from the `promotion_occupancies` ledger.
///
/// One row per granted promotion window; rows with `released_at IS NULL`
/// count against the slot's cap. The sweep closes rows whose window has
/// passed so capacity recomputes correctly on the next allocation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromotionOccupancy {
    pub id: DbId,
    pub slot_id: DbId,
    pub listing_id: DbId,
    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
    pub released_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
