//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Query-parameter DTOs for list endpoints where applicable

pub mod listing;
pub mod notification;
pub mod payment;
pub mod promotion;
pub mod seller;
pub mod status;
pub mod subscription;
pub mod tier;
