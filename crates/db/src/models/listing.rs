//! Listing entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sokoni_core::entitlements::EntitlementLedger;
use sokoni_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: DbId,
    pub seller_id: DbId,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub status_id: StatusId,
    pub listing_expires_at: Option<Timestamp>,
    pub tier_id: Option<DbId>,
    pub tier_priority: i32,
    pub tier_expires_at: Option<Timestamp>,
    pub is_featured: bool,
    pub featured_until: Option<Timestamp>,
    pub promotion_slot_id: Option<DbId>,
    pub promotion_expires_at: Option<Timestamp>,
    pub bumped_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// View of the row's entitlement fields as a ledger value object, for
    /// the pure ranking and invariant functions.
    pub fn entitlements(&self) -> EntitlementLedger {
        EntitlementLedger {
            tier_id: self.tier_id,
            tier_priority: self.tier_priority,
            tier_expires_at: self.tier_expires_at,
            is_featured: self.is_featured,
            featured_until: self.featured_until,
            promotion_slot_id: self.promotion_slot_id,
            promotion_expires_at: self.promotion_expires_at,
        }
    }
}

/// DTO for creating a draft listing.
#[derive(Debug, Deserialize)]
pub struct CreateListing {
    pub seller_id: DbId,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

/// DTO for the activation request (`pending_review -> active` on moderator
/// approval, or `draft -> active` on seller re-activation).
///
/// Tier and promotion assignments are optional; each is validated against
/// its own capacity cap independently of the subscription quota.
#[derive(Debug, Default, Deserialize)]
pub struct ActivateListing {
    /// Listing lifetime in days; defaults to the engine's standard lifetime.
    pub lifetime_days: Option<i64>,
    pub tier_id: Option<DbId>,
    /// Tier validity in days; defaults to the standard tier duration.
    pub tier_days: Option<i64>,
    pub promotion_slot_id: Option<DbId>,
}

/// Query parameters for the ranked listing read path.
#[derive(Debug, Deserialize)]
pub struct RankedListingQuery {
    pub category: String,
    /// Promotion slot being rendered, if any; promotions only boost where
    /// they were purchased.
    pub placement: Option<DbId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
