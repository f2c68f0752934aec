//! Entitlement ledger: the temporal grants attached to a single listing.
//!
//! Five independently-expiring grants touch one mutable listing row
//! (lifetime, subscription, tier, featured, promotion). Rather than trusting
//! the stored flags, every read path recomputes *effective* status from the
//! grant's expiry timestamp versus `now`, so a listing ranks as downgraded
//! the instant a grant lapses, even if the sweep has not yet rewritten the
//! row. All real mutation happens in the sweep.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Tier priority meaning "no tier". Free placement is the default, not an
/// error state.
pub const PRIORITY_NONE: i32 = 0;

/// The paid-visibility grants carried by a listing.
///
/// Each grant is a group of nullable fields that is either fully present or
/// fully cleared; a partial clear (e.g. `tier_priority = 0` with a stale
/// `tier_id`) violates the ledger invariant and is treated as absent by the
/// effective-status accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitlementLedger {
    pub tier_id: Option<DbId>,
    pub tier_priority: i32,
    pub tier_expires_at: Option<Timestamp>,

    pub is_featured: bool,
    pub featured_until: Option<Timestamp>,

    pub promotion_slot_id: Option<DbId>,
    pub promotion_expires_at: Option<Timestamp>,
}

/// `None` or a future timestamp counts as live; a past timestamp is dead.
fn window_open(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    match expires_at {
        None => true,
        Some(t) => t > now,
    }
}

impl EntitlementLedger {
    /// A ledger with no grants at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Effective tier priority at `now`: the stored weight if the tier grant
    /// is live, otherwise [`PRIORITY_NONE`]. A positive priority without a
    /// `tier_id` is malformed and counts as no tier.
    pub fn effective_tier_priority(&self, now: Timestamp) -> i32 {
        if self.tier_id.is_some()
            && self.tier_priority > PRIORITY_NONE
            && window_open(self.tier_expires_at, now)
        {
            self.tier_priority
        } else {
            PRIORITY_NONE
        }
    }

    /// Effective tier id at `now`, `None` once the grant has lapsed.
    pub fn effective_tier_id(&self, now: Timestamp) -> Option<DbId> {
        if self.effective_tier_priority(now) > PRIORITY_NONE {
            self.tier_id
        } else {
            None
        }
    }

    /// Whether the featured boost applies at `now`.
    pub fn effective_featured(&self, now: Timestamp) -> bool {
        self.is_featured && window_open(self.featured_until, now)
    }

    /// The promotion slot this listing effectively occupies at `now`.
    pub fn effective_promotion(&self, now: Timestamp) -> Option<DbId> {
        match self.promotion_slot_id {
            Some(slot) if window_open(self.promotion_expires_at, now) => Some(slot),
            _ => None,
        }
    }

    /// True if any grant is still live at `now`. Used to enforce the
    /// invariant that a non-active listing never carries a live entitlement.
    pub fn has_live_grant(&self, now: Timestamp) -> bool {
        self.effective_tier_priority(now) > PRIORITY_NONE
            || self.effective_featured(now)
            || self.effective_promotion(now).is_some()
    }

    /// Clear all three tier fields simultaneously.
    pub fn clear_tier(&mut self) {
        self.tier_id = None;
        self.tier_priority = PRIORITY_NONE;
        self.tier_expires_at = None;
    }

    /// Clear the featured flag and window together.
    pub fn clear_featured(&mut self) {
        self.is_featured = false;
        self.featured_until = None;
    }

    /// Clear both promotion fields together.
    pub fn clear_promotion(&mut self) {
        self.promotion_slot_id = None;
        self.promotion_expires_at = None;
    }

    /// Clear every grant. Applied when a listing leaves `active` for any
    /// non-terminal reason; `sold`/`rejected` freeze instead.
    pub fn clear_all(&mut self) {
        self.clear_tier();
        self.clear_featured();
        self.clear_promotion();
    }
}
