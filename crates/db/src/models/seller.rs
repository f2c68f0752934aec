//! Seller entity model.
//!
//! Sellers are created and maintained by the external account workflow;
//! this engine reads them for ownership and the admin-bypass capability.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sokoni_core::types::{DbId, Timestamp};

/// A row from the `sellers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Seller {
    pub id: DbId,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a seller (external workflow and tests).
#[derive(Debug, Deserialize)]
pub struct CreateSeller {
    pub display_name: String,
    pub is_admin: Option<bool>,
}
