//! Listing lifecycle state machine.
//!
//! Every status write to a listing funnels through
//! [`validate_transition`]; there are no ad hoc status updates scattered
//! across call sites. The expiry sweep and seller withdrawal are the only
//! producers of `Active -> Draft`; re-activation from `Draft` re-runs the
//! quota gate before the write.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Listing lifecycle status. Discriminants match the seed data order
/// (1-based) in the `listing_statuses` table.
///
/// Expiry is a transition back to [`Draft`](ListingState::Draft) with a
/// reason code, not a stored state: an expired listing is a draft the
/// seller can fix up and resubmit.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    Draft = 1,
    PendingReview = 2,
    Active = 3,
    Sold = 4,
    Rejected = 5,
}

impl ListingState {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Parse from a database status ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Draft),
            2 => Some(Self::PendingReview),
            3 => Some(Self::Active),
            4 => Some(Self::Sold),
            5 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Human-readable name (for error messages and logs).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Rejected => "rejected",
        }
    }
}

impl From<ListingState> for StatusId {
    fn from(value: ListingState) -> Self {
        value as StatusId
    }
}

/// Returns the set of valid target states reachable from `from`.
///
/// `Sold` and `Rejected` are terminal: entitlement fields are frozen there
/// and no further transitions (or sweep phases) touch the row.
pub fn valid_transitions(from: ListingState) -> &'static [ListingState] {
    use ListingState::*;
    match from {
        // Seller submits for moderation, or re-activates a previously
        // approved listing (quota gate re-runs at the activation instant).
        Draft => &[PendingReview, Active],
        // Moderator approves (quota-gated) or rejects; seller may withdraw
        // back to draft while waiting.
        PendingReview => &[Active, Rejected, Draft],
        // Sweep expiry or seller withdrawal drafts it; sold/rejected are
        // externally driven.
        Active => &[Draft, Sold, Rejected],
        Sold => &[],
        Rejected => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: ListingState, to: ListingState) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, returning an error message for invalid ones.
pub fn validate_transition(from: ListingState, to: ListingState) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!(
            "Invalid listing transition: {} ({}) -> {} ({})",
            from.as_str(),
            from.id(),
            to.as_str(),
            to.id()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ListingState::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn draft_to_pending_review() {
        assert!(can_transition(Draft, PendingReview));
    }

    #[test]
    fn draft_to_active_reactivation() {
        assert!(can_transition(Draft, Active));
    }

    #[test]
    fn pending_review_to_active() {
        assert!(can_transition(PendingReview, Active));
    }

    #[test]
    fn pending_review_to_rejected() {
        assert!(can_transition(PendingReview, Rejected));
    }

    #[test]
    fn pending_review_withdrawn_to_draft() {
        assert!(can_transition(PendingReview, Draft));
    }

    #[test]
    fn active_to_draft_on_expiry() {
        assert!(can_transition(Active, Draft));
    }

    #[test]
    fn active_to_sold() {
        assert!(can_transition(Active, Sold));
    }

    #[test]
    fn active_to_rejected() {
        assert!(can_transition(Active, Rejected));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn sold_has_no_transitions() {
        assert!(valid_transitions(Sold).is_empty());
    }

    #[test]
    fn rejected_has_no_transitions() {
        assert!(valid_transitions(Rejected).is_empty());
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn sold_to_active_invalid() {
        assert!(!can_transition(Sold, Active));
    }

    #[test]
    fn rejected_to_pending_review_invalid() {
        assert!(!can_transition(Rejected, PendingReview));
    }

    #[test]
    fn draft_to_sold_invalid() {
        assert!(!can_transition(Draft, Sold));
    }

    #[test]
    fn pending_review_to_sold_invalid() {
        assert!(!can_transition(PendingReview, Sold));
    }

    // -----------------------------------------------------------------------
    // validate_transition returns descriptive error
    // -----------------------------------------------------------------------

    #[test]
    fn validate_transition_ok() {
        assert!(validate_transition(PendingReview, Active).is_ok());
    }

    #[test]
    fn validate_transition_err() {
        let err = validate_transition(Sold, Active).unwrap_err();
        assert!(err.contains("sold"));
        assert!(err.contains("active"));
    }

    // -----------------------------------------------------------------------
    // ID round-trip
    // -----------------------------------------------------------------------

    #[test]
    fn from_id_round_trip() {
        for state in [Draft, PendingReview, Active, Sold, Rejected] {
            assert_eq!(ListingState::from_id(state.id()), Some(state));
        }
    }

    #[test]
    fn from_id_unknown_is_none() {
        assert_eq!(ListingState::from_id(0), None);
        assert_eq!(ListingState::from_id(99), None);
    }
}
