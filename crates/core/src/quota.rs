//! Quota guard decision logic.
//!
//! Pure functions over snapshots: the repository layer gathers the seller's
//! active subscription and the relevant counts, and these functions decide.
//! The caller performs the actual status write, transactionally, immediately
//! after receiving [`ActivationDecision::Allow`].

use serde::Serialize;

use crate::types::Timestamp;

/// Why an activation or entitlement assignment was denied.
///
/// Every reason has a stable snake_case wire code so the end user sees an
/// actionable rejection, never a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Seller holds no live subscription.
    NoSubscription,
    /// Seller is at their subscription's `max_listings` cap.
    QuotaExceeded,
    /// Seller is at the tier's per-seller `max_ads` cap. The listing may
    /// still activate without the tier.
    TierCapacityExceeded,
    /// The promotion slot's global occupancy cap is full.
    PromotionSlotFull,
}

impl DenyReason {
    /// Stable wire code for API responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSubscription => "no_subscription",
            Self::QuotaExceeded => "quota_exceeded",
            Self::TierCapacityExceeded => "tier_capacity_exceeded",
            Self::PromotionSlotFull => "promotion_slot_full",
        }
    }
}

/// Outcome of a quota or capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    Allow,
    Deny(DenyReason),
}

impl ActivationDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The deny reason, if any.
    pub fn reason(self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(reason),
        }
    }
}

/// Snapshot of a seller's subscription as read at the gate.
#[derive(Debug, Clone)]
pub struct SubscriptionSnapshot {
    pub max_listings: i32,
    pub expires_at: Option<Timestamp>,
}

impl SubscriptionSnapshot {
    /// A stored-active subscription whose expiry has passed but which the
    /// sweep has not yet rewritten counts as dead at the gate.
    pub fn is_live(&self, now: Timestamp) -> bool {
        match self.expires_at {
            None => true,
            Some(t) => t > now,
        }
    }
}

/// `CanActivateListing`: may this seller hold one more `active` listing?
///
/// `subscription` is the seller's stored-active subscription, if any;
/// `active_count` is their current number of `active` listings. Sellers with
/// the administrative bypass capability skip both checks (it is a capability
/// flag, not a subscription).
pub fn evaluate_activation(
    subscription: Option<&SubscriptionSnapshot>,
    active_count: i64,
    admin_bypass: bool,
    now: Timestamp,
) -> ActivationDecision {
    if admin_bypass {
        return ActivationDecision::Allow;
    }
    let Some(sub) = subscription.filter(|s| s.is_live(now)) else {
        return ActivationDecision::Deny(DenyReason::NoSubscription);
    };
    if active_count >= i64::from(sub.max_listings) {
        return ActivationDecision::Deny(DenyReason::QuotaExceeded);
    }
    ActivationDecision::Allow
}

/// Tier capacity check, evaluated independently of and in addition to the
/// subscription quota. `held_at_tier` is the seller's current count of
/// `active` listings carrying this tier.
pub fn evaluate_tier_assignment(tier_max_ads: i32, held_at_tier: i64) -> ActivationDecision {
    if held_at_tier >= i64::from(tier_max_ads) {
        ActivationDecision::Deny(DenyReason::TierCapacityExceeded)
    } else {
        ActivationDecision::Allow
    }
}

/// Promotion slot occupancy check. `live_occupants` is the slot's current
/// count of open occupancy rows across all sellers.
pub fn evaluate_promotion_assignment(
    slot_max_ads: i32,
    live_occupants: i64,
) -> ActivationDecision {
    if live_occupants >= i64::from(slot_max_ads) {
        ActivationDecision::Deny(DenyReason::PromotionSlotFull)
    } else {
        ActivationDecision::Allow
    }
}
