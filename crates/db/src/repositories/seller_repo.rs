//! Repository for the `sellers` table.

use sqlx::PgPool;

use sokoni_core::types::DbId;

use crate::models::seller::{CreateSeller, Seller};

const COLUMNS: &str = "id, display_name, is_admin, created_at, updated_at";

/// Read access to seller accounts (created by the external account
/// workflow; `create` exists for that workflow and for tests).
pub struct SellerRepo;

impl SellerRepo {
    pub async fn create(pool: &PgPool, input: &CreateSeller) -> Result<Seller, sqlx::Error> {
        let query = format!(
            "INSERT INTO sellers (display_name, is_admin) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Seller>(&query)
            .bind(&input.display_name)
            .bind(input.is_admin.unwrap_or(false))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Seller>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sellers WHERE id = $1");
        sqlx::query_as::<_, Seller>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
