//! Subscription entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sokoni_core::quota::SubscriptionSnapshot;
use sokoni_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub seller_id: DbId,
    pub plan_name: String,
    pub max_listings: i32,
    pub status_id: StatusId,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Snapshot view for the pure quota decision.
    pub fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            max_listings: self.max_listings,
            expires_at: self.expires_at,
        }
    }
}

/// DTO for creating a subscription (written by the purchase workflow once a
/// payment completes; exposed here for that workflow and for tests).
#[derive(Debug, Deserialize)]
pub struct CreateSubscription {
    pub seller_id: DbId,
    pub plan_name: String,
    pub max_listings: i32,
    pub expires_at: Option<Timestamp>,
}
