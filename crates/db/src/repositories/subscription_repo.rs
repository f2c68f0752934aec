//! Repository for the `subscriptions` table.

use sqlx::PgPool;

use sokoni_core::types::DbId;

use crate::models::status::SubscriptionStatus;
use crate::models::subscription::{CreateSubscription, Subscription};

/// Column list for `subscriptions` queries.
pub(crate) const COLUMNS: &str =
    "id, seller_id, plan_name, max_listings, status_id, expires_at, created_at, updated_at";

/// Provides CRUD operations for seller subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Create a new active subscription. The partial unique index on
    /// `(seller_id) WHERE status_id = active` rejects a second active row
    /// for the same seller with a unique violation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (seller_id, plan_name, max_listings, status_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.seller_id)
            .bind(&input.plan_name)
            .bind(input.max_listings)
            .bind(SubscriptionStatus::Active.id())
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a subscription by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The seller's stored-active subscription, if any. Callers must still
    /// check `expires_at` against now: a lapsed row the sweep has not yet
    /// rewritten is dead at the gate.
    pub async fn find_active_for_seller(
        pool: &PgPool,
        seller_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM subscriptions WHERE seller_id = $1 AND status_id = $2");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(seller_id)
            .bind(SubscriptionStatus::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// List all of a seller's subscriptions, newest first.
    pub async fn list_by_seller(
        pool: &PgPool,
        seller_id: DbId,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE seller_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(seller_id)
            .fetch_all(pool)
            .await
    }

    /// Cancel an active subscription. Returns `false` if it was not active.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(SubscriptionStatus::Cancelled.id())
        .bind(SubscriptionStatus::Active.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
