//! Notification type and related-entity constants.
//!
//! Every notification row carries one of these type strings. They are
//! constants here so the emitter, the sweep, and the read API never disagree
//! on spelling.

/// An active listing's own lifetime ran out and it reverted to draft.
pub const NOTIFY_LISTING_EXPIRED: &str = "listing_expired";

/// A seller's subscription expired. Used both for the seller-level notice
/// (related type [`RELATED_SUBSCRIPTION`]) and for each listing drafted by
/// the cascade (related type [`RELATED_LISTING`]); the cause is never
/// absorbed into the `listing_expired` reason.
pub const NOTIFY_SUBSCRIPTION_EXPIRED: &str = "subscription_expired";

/// Related-entity type for notifications pointing at a listing.
pub const RELATED_LISTING: &str = "listing";

/// Related-entity type for notifications pointing at a subscription.
pub const RELATED_SUBSCRIPTION: &str = "subscription";
