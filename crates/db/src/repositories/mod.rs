//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Status transitions are
//! conditional updates that re-check the current state in the `WHERE`
//! clause; an update matching zero rows is a correct, silent no-op.

pub mod listing_repo;
pub mod notification_repo;
pub mod payment_repo;
pub mod promotion_repo;
pub mod seller_repo;
pub mod subscription_repo;
pub mod sweep_repo;
pub mod tier_repo;

pub use listing_repo::ListingRepo;
pub use notification_repo::NotificationRepo;
pub use payment_repo::PaymentRepo;
pub use promotion_repo::PromotionRepo;
pub use seller_repo::SellerRepo;
pub use subscription_repo::SubscriptionRepo;
pub use sweep_repo::SweepRepo;
pub use tier_repo::TierRepo;
