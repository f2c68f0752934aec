//! Repository for promotion slots and the occupancy ledger.

use sqlx::PgPool;

use sokoni_core::types::DbId;

use crate::models::promotion::{CreatePromotionSlot, PromotionOccupancy, PromotionSlot};

const SLOT_COLUMNS: &str = "id, placement_key, max_ads, duration_days, price_cents, created_at";

const OCCUPANCY_COLUMNS: &str =
    "id, slot_id, listing_id, starts_at, expires_at, released_at, created_at";

/// Read access to promotion slot configuration and the occupancy ledger.
pub struct PromotionRepo;

impl PromotionRepo {
    pub async fn create_slot(
        pool: &PgPool,
        input: &CreatePromotionSlot,
    ) -> Result<PromotionSlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO promotion_slots (placement_key, max_ads, duration_days, price_cents) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SLOT_COLUMNS}"
        );
        sqlx::query_as::<_, PromotionSlot>(&query)
            .bind(&input.placement_key)
            .bind(input.max_ads)
            .bind(input.duration_days)
            .bind(input.price_cents.unwrap_or(0))
            .fetch_one(pool)
            .await
    }

    pub async fn find_slot_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PromotionSlot>, sqlx::Error> {
        let query = format!("SELECT {SLOT_COLUMNS} FROM promotion_slots WHERE id = $1");
        sqlx::query_as::<_, PromotionSlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_slots(pool: &PgPool) -> Result<Vec<PromotionSlot>, sqlx::Error> {
        let query = format!("SELECT {SLOT_COLUMNS} FROM promotion_slots ORDER BY placement_key");
        sqlx::query_as::<_, PromotionSlot>(&query)
            .fetch_all(pool)
            .await
    }

    /// Current number of open occupancy rows for a slot: the figure the
    /// slot's `max_ads` cap is checked against.
    pub async fn count_open_occupants(pool: &PgPool, slot_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM promotion_occupancies \
             WHERE slot_id = $1 AND released_at IS NULL",
        )
        .bind(slot_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// The ledger rows for one listing, newest first.
    pub async fn list_for_listing(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Vec<PromotionOccupancy>, sqlx::Error> {
        let query = format!(
            "SELECT {OCCUPANCY_COLUMNS} FROM promotion_occupancies \
             WHERE listing_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, PromotionOccupancy>(&query)
            .bind(listing_id)
            .fetch_all(pool)
            .await
    }
}
