//! The quota gate: the single write path into `active`.
//!
//! [`QuotaGate::can_activate`] is the read-only peek exposed to callers
//! (`CanActivateListing`). [`QuotaGate::activate`] is the gated write: it
//! re-runs the same decision inside a transaction that locks the seller
//! row, so two concurrent activations for one seller serialize and cannot
//! both slip under the quota. Tier and promotion capacity are evaluated
//! independently of the subscription quota, each against its own cap.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};

use sokoni_core::lifecycle::{self, ListingState};
use sokoni_core::quota::{
    evaluate_activation, evaluate_promotion_assignment, evaluate_tier_assignment,
    ActivationDecision, DenyReason,
};
use sokoni_core::types::{DbId, Timestamp};

use crate::models::listing::{ActivateListing, Listing};
use crate::models::status::SubscriptionStatus;
use crate::repositories::listing_repo::COLUMNS as LISTING_COLUMNS;

/// Default listing lifetime granted at activation.
pub const DEFAULT_LISTING_LIFETIME_DAYS: i64 = 30;

/// Default tier validity granted when a tier accompanies activation.
pub const DEFAULT_TIER_DURATION_DAYS: i64 = 30;

/// Outcome of a gated activation attempt.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// The listing is now `active`; the updated row is returned.
    Activated(Listing),
    /// Denied with an actionable reason; nothing was written.
    Denied(DenyReason),
}

/// Failure modes of the activation write that are not quota denials.
#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    #[error("Listing not found")]
    ListingNotFound,

    #[error("Tier not found")]
    TierNotFound,

    #[error("Promotion slot not found")]
    SlotNotFound,

    #[error("{0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct QuotaGate;

impl QuotaGate {
    /// `CanActivateListing(sellerId)`: may this seller hold one more
    /// `active` listing right now? Read-only; no locks taken.
    pub async fn can_activate(
        pool: &PgPool,
        seller_id: DbId,
    ) -> Result<ActivationDecision, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::decide(&mut *conn, seller_id, false).await
    }

    /// Gated transition into `active`.
    ///
    /// Runs in one transaction: lock the listing row, validate the
    /// lifecycle transition, lock the seller row and re-run the quota
    /// decision, validate any tier/promotion assignment against its cap,
    /// then perform the conditional status write. Entitlement assignments
    /// always carry a fresh expiry written atomically with the status, so a
    /// stale unswept grant can never coexist with a new one.
    pub async fn activate(
        pool: &PgPool,
        listing_id: DbId,
        input: &ActivateListing,
    ) -> Result<ActivationOutcome, ActivateError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1 FOR UPDATE");
        let listing: Listing = sqlx::query_as(&query)
            .bind(listing_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ActivateError::ListingNotFound)?;

        let from = ListingState::from_id(listing.status_id).ok_or_else(|| {
            ActivateError::InvalidTransition(format!("Unknown status id {}", listing.status_id))
        })?;
        lifecycle::validate_transition(from, ListingState::Active)
            .map_err(ActivateError::InvalidTransition)?;

        let decision = Self::decide(&mut *tx, listing.seller_id, true).await?;
        if let Some(reason) = decision.reason() {
            tracing::debug!(
                listing_id,
                seller_id = listing.seller_id,
                reason = reason.as_str(),
                "Activation denied at the quota gate"
            );
            return Ok(ActivationOutcome::Denied(reason));
        }

        // Tier assignment: checked against the tier's own per-seller cap,
        // independently of the subscription quota.
        let (tier_id, tier_priority, tier_expires_at) = match input.tier_id {
            Some(requested) => {
                let tier: Option<(i32, i32)> =
                    sqlx::query_as("SELECT priority_weight, max_ads FROM tiers WHERE id = $1")
                        .bind(requested)
                        .fetch_optional(&mut *tx)
                        .await?;
                let (priority_weight, max_ads) = tier.ok_or(ActivateError::TierNotFound)?;

                let held: (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM listings \
                     WHERE seller_id = $1 AND status_id = $2 AND tier_id = $3",
                )
                .bind(listing.seller_id)
                .bind(ListingState::Active.id())
                .bind(requested)
                .fetch_one(&mut *tx)
                .await?;

                if let Some(reason) = evaluate_tier_assignment(max_ads, held.0).reason() {
                    return Ok(ActivationOutcome::Denied(reason));
                }

                let days = input.tier_days.unwrap_or(DEFAULT_TIER_DURATION_DAYS);
                (
                    Some(requested),
                    priority_weight,
                    Some(now + Duration::days(days)),
                )
            }
            None => (None, 0, None),
        };

        // Promotion assignment: checked against the slot's global cap.
        let promotion: Option<(DbId, Timestamp)> = match input.promotion_slot_id {
            Some(slot_id) => {
                let slot: Option<(i32, i32)> =
                    sqlx::query_as("SELECT max_ads, duration_days FROM promotion_slots WHERE id = $1")
                        .bind(slot_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                let (max_ads, duration_days) = slot.ok_or(ActivateError::SlotNotFound)?;

                let open: (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM promotion_occupancies \
                     WHERE slot_id = $1 AND released_at IS NULL",
                )
                .bind(slot_id)
                .fetch_one(&mut *tx)
                .await?;

                if let Some(reason) = evaluate_promotion_assignment(max_ads, open.0).reason() {
                    return Ok(ActivationOutcome::Denied(reason));
                }

                Some((slot_id, now + Duration::days(i64::from(duration_days))))
            }
            None => None,
        };

        let lifetime_days = input.lifetime_days.unwrap_or(DEFAULT_LISTING_LIFETIME_DAYS);
        let listing_expires_at = now + Duration::days(lifetime_days);
        let (promotion_slot_id, promotion_expires_at) = match promotion {
            Some((slot, until)) => (Some(slot), Some(until)),
            None => (None, None),
        };

        let update = format!(
            "UPDATE listings \
             SET status_id = $2, listing_expires_at = $3, \
                 tier_id = $4, tier_priority = $5, tier_expires_at = $6, \
                 promotion_slot_id = $7, promotion_expires_at = $8, \
                 bumped_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $9 \
             RETURNING {LISTING_COLUMNS}"
        );
        let updated: Listing = sqlx::query_as(&update)
            .bind(listing_id)
            .bind(ListingState::Active.id())
            .bind(listing_expires_at)
            .bind(tier_id)
            .bind(tier_priority)
            .bind(tier_expires_at)
            .bind(promotion_slot_id)
            .bind(promotion_expires_at)
            .bind(from.id())
            .fetch_one(&mut *tx)
            .await?;

        if let Some((slot_id, until)) = promotion {
            sqlx::query(
                "INSERT INTO promotion_occupancies (slot_id, listing_id, expires_at) \
                 VALUES ($1, $2, $3)",
            )
            .bind(slot_id)
            .bind(listing_id)
            .bind(until)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ActivationOutcome::Activated(updated))
    }

    /// The shared quota decision. With `lock_seller` the seller row is
    /// locked `FOR UPDATE`, serializing concurrent activations per seller.
    async fn decide(
        conn: &mut PgConnection,
        seller_id: DbId,
        lock_seller: bool,
    ) -> Result<ActivationDecision, sqlx::Error> {
        let now = Utc::now();

        let seller_query = if lock_seller {
            "SELECT is_admin FROM sellers WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT is_admin FROM sellers WHERE id = $1"
        };
        let seller: Option<(bool,)> = sqlx::query_as(seller_query)
            .bind(seller_id)
            .fetch_optional(&mut *conn)
            .await?;
        let (is_admin,) = seller.ok_or(sqlx::Error::RowNotFound)?;

        let subscription: Option<(i32, Option<Timestamp>)> = sqlx::query_as(
            "SELECT max_listings, expires_at FROM subscriptions \
             WHERE seller_id = $1 AND status_id = $2",
        )
        .bind(seller_id)
        .bind(SubscriptionStatus::Active.id())
        .fetch_optional(&mut *conn)
        .await?;

        let active_count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM listings WHERE seller_id = $1 AND status_id = $2")
                .bind(seller_id)
                .bind(ListingState::Active.id())
                .fetch_one(&mut *conn)
                .await?;

        let snapshot = subscription.map(|(max_listings, expires_at)| {
            sokoni_core::quota::SubscriptionSnapshot {
                max_listings,
                expires_at,
            }
        });

        Ok(evaluate_activation(
            snapshot.as_ref(),
            active_count.0,
            is_admin,
            now,
        ))
    }
}
