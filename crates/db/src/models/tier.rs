//! Tier configuration model. Read-only input to the engine.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sokoni_core::types::{DbId, Timestamp};

/// A row from the `tiers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tier {
    pub id: DbId,
    pub name: String,
    pub priority_weight: i32,
    /// Per-seller cap on concurrently active listings at this tier.
    pub max_ads: i32,
    pub price_cents: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a tier (operator configuration surface).
#[derive(Debug, Deserialize)]
pub struct CreateTier {
    pub name: String,
    pub priority_weight: i32,
    pub max_ads: i32,
    pub price_cents: Option<i64>,
}
