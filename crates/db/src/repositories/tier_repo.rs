//! Repository for the `tiers` configuration table.

use sqlx::PgPool;

use sokoni_core::types::DbId;

use crate::models::tier::{CreateTier, Tier};

const COLUMNS: &str = "id, name, priority_weight, max_ads, price_cents, created_at";

/// Read access to tier configuration, plus the operator create surface.
/// The engine itself never mutates tiers.
pub struct TierRepo;

impl TierRepo {
    pub async fn create(pool: &PgPool, input: &CreateTier) -> Result<Tier, sqlx::Error> {
        let query = format!(
            "INSERT INTO tiers (name, priority_weight, max_ads, price_cents) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tier>(&query)
            .bind(&input.name)
            .bind(input.priority_weight)
            .bind(input.max_ads)
            .bind(input.price_cents.unwrap_or(0))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tiers WHERE id = $1");
        sqlx::query_as::<_, Tier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tiers, heaviest placement weight first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Tier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tiers ORDER BY priority_weight DESC");
        sqlx::query_as::<_, Tier>(&query).fetch_all(pool).await
    }
}
