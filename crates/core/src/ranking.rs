//! Ranking composer: the ordering contribution of paid entitlements.
//!
//! [`RankKey`] is a pure, deterministic function of a listing's entitlement
//! ledger and the current time. It never trusts stored flags: effective
//! status is recomputed from the expiry timestamps on every call, so read
//! ordering is correct regardless of sweep latency. Free-text relevance is
//! out of scope here; this key only orders competitors within a result set.

use crate::entitlements::EntitlementLedger;
use crate::types::{DbId, Timestamp};

/// Orderable key for one listing in one rendered context.
///
/// A *greater* key means earlier placement: callers sort descending (or
/// compare with `b.cmp(a)`). The derived lexicographic `Ord` encodes the
/// precedence rules:
///
/// 1. live promotion occupancy for the exact placement being rendered
/// 2. effective tier weight
/// 3. effective featured boost within the same tier
/// 4. recency (creation or last bump)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    promoted: bool,
    tier_priority: i32,
    featured: bool,
    bumped_at: Timestamp,
}

impl RankKey {
    /// Compute the key for a listing at `now`.
    ///
    /// `placement` is the promotion slot being rendered, if any; a listing's
    /// promotion only applies where it was purchased. Passing `None` (plain
    /// category or search results) ignores promotions entirely.
    pub fn compute(
        ledger: &EntitlementLedger,
        bumped_at: Timestamp,
        placement: Option<DbId>,
        now: Timestamp,
    ) -> Self {
        let promoted = match placement {
            Some(slot) => ledger.effective_promotion(now) == Some(slot),
            None => false,
        };
        Self {
            promoted,
            tier_priority: ledger.effective_tier_priority(now),
            featured: ledger.effective_featured(now),
            bumped_at,
        }
    }

    pub fn is_promoted(&self) -> bool {
        self.promoted
    }

    pub fn tier_priority(&self) -> i32 {
        self.tier_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    const SLOT_HOMEPAGE: DbId = 1;
    const SLOT_CATEGORY_TOP: DbId = 2;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn t(offset_secs: i64) -> Timestamp {
        now() + Duration::seconds(offset_secs)
    }

    fn plain() -> EntitlementLedger {
        EntitlementLedger::none()
    }

    fn with_tier(priority: i32, expires_at: Option<Timestamp>) -> EntitlementLedger {
        EntitlementLedger {
            tier_id: Some(priority as DbId),
            tier_priority: priority,
            tier_expires_at: expires_at,
            ..EntitlementLedger::none()
        }
    }

    fn key(ledger: &EntitlementLedger, bumped_offset: i64, placement: Option<DbId>) -> RankKey {
        RankKey::compute(ledger, t(bumped_offset), placement, now())
    }

    // -----------------------------------------------------------------------
    // Precedence
    // -----------------------------------------------------------------------

    #[test]
    fn promotion_outranks_higher_tier() {
        let promoted = EntitlementLedger {
            promotion_slot_id: Some(SLOT_HOMEPAGE),
            promotion_expires_at: Some(t(600)),
            ..EntitlementLedger::none()
        };
        let heavy_tier = with_tier(100, Some(t(600)));

        let a = key(&promoted, -864_000, Some(SLOT_HOMEPAGE));
        let b = key(&heavy_tier, 0, Some(SLOT_HOMEPAGE));
        assert!(a > b);
    }

    #[test]
    fn promotion_for_other_placement_does_not_apply() {
        let promoted = EntitlementLedger {
            promotion_slot_id: Some(SLOT_CATEGORY_TOP),
            promotion_expires_at: Some(t(600)),
            ..EntitlementLedger::none()
        };
        let k = key(&promoted, 0, Some(SLOT_HOMEPAGE));
        assert!(!k.is_promoted());
    }

    #[test]
    fn promotion_ignored_without_placement_context() {
        let promoted = EntitlementLedger {
            promotion_slot_id: Some(SLOT_HOMEPAGE),
            promotion_expires_at: Some(t(600)),
            ..EntitlementLedger::none()
        };
        assert!(!key(&promoted, 0, None).is_promoted());
    }

    #[test]
    fn higher_tier_outranks_lower_tier() {
        let gold = with_tier(30, Some(t(600)));
        let silver = with_tier(20, Some(t(600)));
        assert!(key(&gold, -3600, None) > key(&silver, 0, None));
    }

    #[test]
    fn featured_breaks_tie_within_same_tier() {
        let featured = EntitlementLedger {
            is_featured: true,
            featured_until: Some(t(600)),
            ..with_tier(20, Some(t(600)))
        };
        let bare = with_tier(20, Some(t(600)));
        assert!(key(&featured, -3600, None) > key(&bare, 0, None));
    }

    #[test]
    fn recency_breaks_final_tie() {
        let newer = key(&plain(), 0, None);
        let older = key(&plain(), -3600, None);
        assert!(newer > older);
    }

    #[test]
    fn tier_outranks_featured_free_listing() {
        let featured_free = EntitlementLedger {
            is_featured: true,
            featured_until: Some(t(600)),
            ..EntitlementLedger::none()
        };
        let tiered = with_tier(10, Some(t(600)));
        assert!(key(&tiered, -3600, None) > key(&featured_free, 0, None));
    }

    // -----------------------------------------------------------------------
    // Read-time correctness independent of sweep latency
    // -----------------------------------------------------------------------

    #[test]
    fn stale_tier_ranks_as_priority_zero() {
        // tier_expires_at in the past, row not yet swept
        let stale = with_tier(30, Some(t(-60)));
        let free_newer = key(&plain(), 0, None);
        assert!(key(&stale, -3600, None) < free_newer);
        assert_eq!(key(&stale, 0, None).tier_priority(), 0);
    }

    #[test]
    fn stale_promotion_does_not_promote() {
        let stale = EntitlementLedger {
            promotion_slot_id: Some(SLOT_HOMEPAGE),
            promotion_expires_at: Some(t(-60)),
            ..EntitlementLedger::none()
        };
        assert!(!key(&stale, 0, Some(SLOT_HOMEPAGE)).is_promoted());
    }

    #[test]
    fn stale_featured_does_not_boost() {
        let stale = EntitlementLedger {
            is_featured: true,
            featured_until: Some(t(-60)),
            ..EntitlementLedger::none()
        };
        let fresh_plain = key(&plain(), 0, None);
        assert!(key(&stale, -10, None) < fresh_plain);
    }

    // -----------------------------------------------------------------------
    // Determinism and full sort
    // -----------------------------------------------------------------------

    #[test]
    fn compute_is_deterministic() {
        let ledger = with_tier(20, Some(t(600)));
        assert_eq!(key(&ledger, -5, None), key(&ledger, -5, None));
    }

    #[test]
    fn sort_descending_orders_promoted_tiered_featured_recent() {
        let promoted = EntitlementLedger {
            promotion_slot_id: Some(SLOT_HOMEPAGE),
            promotion_expires_at: Some(t(600)),
            ..EntitlementLedger::none()
        };
        let gold = with_tier(30, Some(t(600)));
        let featured = EntitlementLedger {
            is_featured: true,
            featured_until: Some(t(600)),
            ..EntitlementLedger::none()
        };

        let mut keys = vec![
            ("plain_old", key(&plain(), -7200, Some(SLOT_HOMEPAGE))),
            ("promoted", key(&promoted, -9999, Some(SLOT_HOMEPAGE))),
            ("featured", key(&featured, -3600, Some(SLOT_HOMEPAGE))),
            ("plain_new", key(&plain(), 0, Some(SLOT_HOMEPAGE))),
            ("gold", key(&gold, -5000, Some(SLOT_HOMEPAGE))),
        ];
        keys.sort_by(|a, b| b.1.cmp(&a.1));

        let order: Vec<&str> = keys.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            order,
            vec!["promoted", "gold", "featured", "plain_new", "plain_old"]
        );
    }
}
