//! Payment transaction read model.
//!
//! The payment feed is written by the external purchase workflow (mobile
//! money push and its callbacks). This engine never writes payment state;
//! it reads completed transactions for observability only.

use serde::Serialize;
use sqlx::FromRow;

use sokoni_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `payment_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentTransaction {
    pub id: DbId,
    pub seller_id: DbId,
    pub status_id: StatusId,
    pub amount_cents: i64,
    /// What the payment funds: `subscription`, `tier`, `featured`,
    /// `promotion`.
    pub purchase_kind: String,
    pub subscription_id: Option<DbId>,
    pub listing_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
