//! Conditional-update batches for the five expiry phases.
//!
//! Every phase is a single `UPDATE … WHERE <expiry predicate> … RETURNING`
//! whose row set is selected with `FOR UPDATE SKIP LOCKED`. Two overlapping
//! sweep runs therefore cannot both claim the same expired row: the second
//! run's predicate simply matches zero rows, which is a correct, silent
//! no-op. The `RETURNING` set is exactly the set of rows *this* invocation
//! transitioned, and is the only set notifications are emitted for.
//!
//! Each call processes at most `batch` rows so a slow sweep stays bounded
//! and interruptible; callers loop until a short batch comes back.

use sqlx::{FromRow, PgPool, Postgres, Transaction};

use sokoni_core::types::DbId;

use crate::models::status::{ListingState, SubscriptionStatus};

/// A listing transitioned by an expiry phase, as returned for notification.
#[derive(Debug, Clone, FromRow)]
pub struct ExpiredListing {
    pub id: DbId,
    pub seller_id: DbId,
    pub title: String,
}

/// A subscription expired by phase 2.
#[derive(Debug, Clone, FromRow)]
pub struct ExpiredSubscription {
    pub id: DbId,
    pub seller_id: DbId,
    pub plan_name: String,
}

/// Result of the subscription phase: expired subscriptions plus the
/// `active` listings drafted by the cascade.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionExpiryBatch {
    pub subscriptions: Vec<ExpiredSubscription>,
    pub cascaded_listings: Vec<ExpiredListing>,
}

/// SQL fragment clearing every entitlement grant. Applied whenever a
/// lifecycle downgrade leaves `active` for a non-terminal state, so the
/// invariant "no live entitlement on a non-active listing" holds within the
/// same statement.
const CLEAR_ENTITLEMENTS: &str = "\
    tier_id = NULL, tier_priority = 0, tier_expires_at = NULL, \
    is_featured = FALSE, featured_until = NULL, \
    promotion_slot_id = NULL, promotion_expires_at = NULL";

/// The expiry phase queries. All mutation performed by the sweep lives here.
pub struct SweepRepo;

impl SweepRepo {
    /// Phase 1: `active` listings whose own lifetime has passed revert to
    /// `draft` with entitlements cleared and occupancies released.
    pub async fn expire_listing_lifetimes(
        pool: &PgPool,
        batch: i64,
    ) -> Result<Vec<ExpiredListing>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE listings \
             SET status_id = $1, {CLEAR_ENTITLEMENTS}, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM listings \
                 WHERE status_id = $2 \
                   AND listing_expires_at IS NOT NULL \
                   AND listing_expires_at < NOW() \
                 ORDER BY listing_expires_at \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING id, seller_id, title"
        );
        let rows: Vec<ExpiredListing> = sqlx::query_as(&query)
            .bind(ListingState::Draft.id())
            .bind(ListingState::Active.id())
            .bind(batch)
            .fetch_all(&mut *tx)
            .await?;

        Self::release_occupancies(&mut tx, &rows).await?;
        tx.commit().await?;
        Ok(rows)
    }

    /// Phase 2: `active` subscriptions past expiry become `expired`, and
    /// every remaining `active` listing of each affected seller is drafted
    /// in the same transaction (distinct cause from phase 1, so the
    /// notifications carry the subscription reason).
    pub async fn expire_subscriptions(
        pool: &PgPool,
        batch: i64,
    ) -> Result<SubscriptionExpiryBatch, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let subscriptions: Vec<ExpiredSubscription> = sqlx::query_as(
            "UPDATE subscriptions \
             SET status_id = $1, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM subscriptions \
                 WHERE status_id = $2 \
                   AND expires_at IS NOT NULL \
                   AND expires_at < NOW() \
                 ORDER BY expires_at \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING id, seller_id, plan_name",
        )
        .bind(SubscriptionStatus::Expired.id())
        .bind(SubscriptionStatus::Active.id())
        .bind(batch)
        .fetch_all(&mut *tx)
        .await?;

        if subscriptions.is_empty() {
            tx.commit().await?;
            return Ok(SubscriptionExpiryBatch::default());
        }

        let seller_ids: Vec<DbId> = subscriptions.iter().map(|s| s.seller_id).collect();

        let cascade_query = format!(
            "UPDATE listings \
             SET status_id = $1, {CLEAR_ENTITLEMENTS}, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM listings \
                 WHERE seller_id = ANY($2) AND status_id = $3 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING id, seller_id, title"
        );
        let cascaded_listings: Vec<ExpiredListing> = sqlx::query_as(&cascade_query)
            .bind(ListingState::Draft.id())
            .bind(&seller_ids)
            .bind(ListingState::Active.id())
            .fetch_all(&mut *tx)
            .await?;

        Self::release_occupancies(&mut tx, &cascaded_listings).await?;
        tx.commit().await?;

        Ok(SubscriptionExpiryBatch {
            subscriptions,
            cascaded_listings,
        })
    }

    /// Phase 3: lapsed tier grants are cleared, all three fields in one
    /// statement, never a partial clear. Lifecycle status is untouched; an
    /// active listing without a tier is the free default, not an error.
    /// Terminal listings are frozen and excluded.
    pub async fn expire_tiers(pool: &PgPool, batch: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings \
             SET tier_id = NULL, tier_priority = 0, tier_expires_at = NULL, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM listings \
                 WHERE tier_id IS NOT NULL \
                   AND tier_expires_at IS NOT NULL \
                   AND tier_expires_at < NOW() \
                   AND tier_priority > 0 \
                   AND status_id NOT IN ($1, $2) \
                 ORDER BY tier_expires_at \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             )",
        )
        .bind(ListingState::Sold.id())
        .bind(ListingState::Rejected.id())
        .bind(batch)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Phase 4: lapsed featured windows are cleared. Soft downgrade, no
    /// notification.
    pub async fn expire_featured(pool: &PgPool, batch: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings \
             SET is_featured = FALSE, featured_until = NULL, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM listings \
                 WHERE is_featured \
                   AND featured_until IS NOT NULL \
                   AND featured_until < NOW() \
                   AND status_id NOT IN ($1, $2) \
                 ORDER BY featured_until \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             )",
        )
        .bind(ListingState::Sold.id())
        .bind(ListingState::Rejected.id())
        .bind(batch)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Phase 5: lapsed promotion grants are cleared from listings, and the
    /// occupancy ledger is closed for every expired window (including rows
    /// whose listing fields were already cleared by an earlier downgrade) so
    /// slot-capacity counts recompute correctly on the next allocation.
    pub async fn expire_promotions(pool: &PgPool, batch: i64) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE listings \
             SET promotion_slot_id = NULL, promotion_expires_at = NULL, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM listings \
                 WHERE promotion_slot_id IS NOT NULL \
                   AND promotion_expires_at IS NOT NULL \
                   AND promotion_expires_at < NOW() \
                   AND status_id NOT IN ($1, $2) \
                 ORDER BY promotion_expires_at \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             )",
        )
        .bind(ListingState::Sold.id())
        .bind(ListingState::Rejected.id())
        .bind(batch)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE promotion_occupancies SET released_at = NOW() \
             WHERE released_at IS NULL AND expires_at < NOW()",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Release open occupancy rows for listings that just left `active`.
    async fn release_occupancies(
        tx: &mut Transaction<'_, Postgres>,
        listings: &[ExpiredListing],
    ) -> Result<(), sqlx::Error> {
        if listings.is_empty() {
            return Ok(());
        }
        let ids: Vec<DbId> = listings.iter().map(|l| l.id).collect();
        sqlx::query(
            "UPDATE promotion_occupancies SET released_at = NOW() \
             WHERE listing_id = ANY($1) AND released_at IS NULL",
        )
        .bind(&ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
