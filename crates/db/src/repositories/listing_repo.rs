//! Repository for the `listings` table.
//!
//! Lifecycle writes are conditional updates whose `WHERE` clause re-checks
//! the current status, so a transition raced by the sweep or by another
//! request simply matches zero rows. Activation (the quota-gated write) is
//! in [`crate::quota_gate`], not here.

use chrono::Utc;
use sqlx::PgPool;

use sokoni_core::ranking::RankKey;
use sokoni_core::types::DbId;

use crate::models::listing::{CreateListing, Listing, RankedListingQuery};
use crate::models::status::ListingState;

/// Column list for `listings` queries.
pub(crate) const COLUMNS: &str = "\
    id, seller_id, category, title, description, price_cents, status_id, \
    listing_expires_at, tier_id, tier_priority, tier_expires_at, \
    is_featured, featured_until, promotion_slot_id, promotion_expires_at, \
    bumped_at, created_at, updated_at";

/// Maximum page size for listing reads.
const MAX_LIMIT: i64 = 100;

/// Default page size for listing reads.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD and lifecycle operations for listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Create a new draft listing.
    pub async fn create(pool: &PgPool, input: &CreateListing) -> Result<Listing, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings (seller_id, category, title, description, price_cents, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(input.seller_id)
            .bind(&input.category)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price_cents.unwrap_or(0))
            .bind(ListingState::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// Find a listing by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all of a seller's listings, newest first.
    pub async fn list_by_seller(pool: &PgPool, seller_id: DbId) -> Result<Vec<Listing>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM listings WHERE seller_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Listing>(&query)
            .bind(seller_id)
            .fetch_all(pool)
            .await
    }

    /// Count a seller's currently `active` listings (the subscription-quota
    /// usage figure).
    pub async fn count_active_for_seller(
        pool: &PgPool,
        seller_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM listings WHERE seller_id = $1 AND status_id = $2")
                .bind(seller_id)
                .bind(ListingState::Active.id())
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Count a seller's `active` listings currently holding the given tier
    /// (the tier's per-seller cap usage figure).
    pub async fn count_active_at_tier(
        pool: &PgPool,
        seller_id: DbId,
        tier_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM listings \
             WHERE seller_id = $1 AND status_id = $2 AND tier_id = $3",
        )
        .bind(seller_id)
        .bind(ListingState::Active.id())
        .bind(tier_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Ranked read path: `active` listings in a category, ordered by the
    /// same precedence as [`RankKey`] (promotion for the rendered placement,
    /// then effective tier weight, then effective featured, then recency).
    ///
    /// The query recomputes effective status against `NOW()` to preselect
    /// and page; the ranking composer then orders the page at read time, so
    /// an expired-but-unswept grant never boosts a row regardless of sweep
    /// latency.
    pub async fn list_ranked(
        pool: &PgPool,
        params: &RankedListingQuery,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = format!(
            "SELECT {COLUMNS} FROM listings \
             WHERE status_id = $1 AND category = $2 \
             ORDER BY \
                ($3::BIGINT IS NOT NULL AND promotion_slot_id = $3 \
                 AND (promotion_expires_at IS NULL OR promotion_expires_at > NOW())) DESC, \
                (CASE WHEN tier_id IS NOT NULL AND tier_priority > 0 \
                      AND (tier_expires_at IS NULL OR tier_expires_at > NOW()) \
                      THEN tier_priority ELSE 0 END) DESC, \
                (is_featured AND (featured_until IS NULL OR featured_until > NOW())) DESC, \
                bumped_at DESC \
             LIMIT $4 OFFSET $5"
        );
        let mut rows = sqlx::query_as::<_, Listing>(&query)
            .bind(ListingState::Active.id())
            .bind(&params.category)
            .bind(params.placement)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let now = Utc::now();
        rows.sort_by(|a, b| {
            let ka = RankKey::compute(&a.entitlements(), a.bumped_at, params.placement, now);
            let kb = RankKey::compute(&b.entitlements(), b.bumped_at, params.placement, now);
            kb.cmp(&ka)
        });
        Ok(rows)
    }

    /// Seller submits a draft for moderation. Returns `false` if the listing
    /// was not in `draft`.
    pub async fn submit(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(ListingState::PendingReview.id())
        .bind(ListingState::Draft.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Seller withdraws a listing back to `draft`, from `active` or
    /// `pending_review`. Leaving `active` clears every entitlement grant in
    /// the same statement and releases any open promotion occupancy.
    pub async fn withdraw(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE listings \
             SET status_id = $2, \
                 tier_id = NULL, tier_priority = 0, tier_expires_at = NULL, \
                 is_featured = FALSE, featured_until = NULL, \
                 promotion_slot_id = NULL, promotion_expires_at = NULL, \
                 updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($3, $4)",
        )
        .bind(id)
        .bind(ListingState::Draft.id())
        .bind(ListingState::Active.id())
        .bind(ListingState::PendingReview.id())
        .execute(&mut *tx)
        .await?;

        let withdrawn = result.rows_affected() > 0;
        if withdrawn {
            sqlx::query(
                "UPDATE promotion_occupancies SET released_at = NOW() \
                 WHERE listing_id = $1 AND released_at IS NULL",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(withdrawn)
    }

    /// Externally driven `active -> sold`. Entitlement fields are frozen,
    /// not cleared; the open occupancy is released so the slot frees up.
    pub async fn mark_sold(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        Self::terminal_transition(pool, id, ListingState::Sold).await
    }

    /// Externally driven rejection, from `pending_review` or `active`.
    pub async fn reject(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        Self::terminal_transition(pool, id, ListingState::Rejected).await
    }

    /// Refresh the recency key of an `active` listing.
    pub async fn bump(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings SET bumped_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(ListingState::Active.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Shared terminal transition: entitlement fields stay as they were
    /// (frozen), but slot capacity must not stay consumed by a listing that
    /// is no longer rankable.
    async fn terminal_transition(
        pool: &PgPool,
        id: DbId,
        to: ListingState,
    ) -> Result<bool, sqlx::Error> {
        let from: &[ListingState] = match to {
            ListingState::Sold => &[ListingState::Active],
            _ => &[ListingState::Active, ListingState::PendingReview],
        };

        let mut tx = pool.begin().await?;

        let result = if from.len() == 1 {
            sqlx::query(
                "UPDATE listings SET status_id = $2, updated_at = NOW() \
                 WHERE id = $1 AND status_id = $3",
            )
            .bind(id)
            .bind(to.id())
            .bind(from[0].id())
            .execute(&mut *tx)
            .await?
        } else {
            sqlx::query(
                "UPDATE listings SET status_id = $2, updated_at = NOW() \
                 WHERE id = $1 AND status_id IN ($3, $4)",
            )
            .bind(id)
            .bind(to.id())
            .bind(from[0].id())
            .bind(from[1].id())
            .execute(&mut *tx)
            .await?
        };

        let transitioned = result.rows_affected() > 0;
        if transitioned {
            sqlx::query(
                "UPDATE promotion_occupancies SET released_at = NOW() \
                 WHERE listing_id = $1 AND released_at IS NULL",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(transitioned)
    }
}
