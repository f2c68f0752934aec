//! Read-only repository over the external payment transaction feed.

use sqlx::PgPool;

use sokoni_core::types::DbId;

use crate::models::payment::PaymentTransaction;
use crate::models::status::PaymentStatus;

const COLUMNS: &str = "\
    id, seller_id, status_id, amount_cents, purchase_kind, subscription_id, \
    listing_id, created_at, updated_at";

/// The engine reads completed transactions for observability; it never
/// writes payment state.
pub struct PaymentRepo;

impl PaymentRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PaymentTransaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_transactions WHERE id = $1");
        sqlx::query_as::<_, PaymentTransaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A seller's completed transactions, newest first.
    pub async fn list_completed_for_seller(
        pool: &PgPool,
        seller_id: DbId,
    ) -> Result<Vec<PaymentTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_transactions \
             WHERE seller_id = $1 AND status_id = $2 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, PaymentTransaction>(&query)
            .bind(seller_id)
            .bind(PaymentStatus::Completed.id())
            .fetch_all(pool)
            .await
    }
}
