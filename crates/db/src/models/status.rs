//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table. The listing lifecycle
//! enum lives in `sokoni-core` (it carries the transition rules) and is
//! re-exported here so repository code has one import path for all statuses.

pub use sokoni_core::lifecycle::{ListingState, StatusId};

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Subscription lifecycle status.
    SubscriptionStatus {
        Active = 1,
        Expired = 2,
        Cancelled = 3,
    }
}

define_status_enum! {
    /// Payment transaction status (written by the external payment
    /// workflow; this engine only reads it).
    PaymentStatus {
        Pending = 1,
        Completed = 2,
        Failed = 3,
        Refunded = 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_status_ids_match_seed_order() {
        assert_eq!(SubscriptionStatus::Active.id(), 1);
        assert_eq!(SubscriptionStatus::Expired.id(), 2);
        assert_eq!(SubscriptionStatus::Cancelled.id(), 3);
    }

    #[test]
    fn payment_status_ids_match_seed_order() {
        assert_eq!(PaymentStatus::Pending.id(), 1);
        assert_eq!(PaymentStatus::Completed.id(), 2);
        assert_eq!(PaymentStatus::Failed.id(), 3);
        assert_eq!(PaymentStatus::Refunded.id(), 4);
    }

    #[test]
    fn listing_state_reexport_matches_seed_order() {
        assert_eq!(ListingState::Draft.id(), 1);
        assert_eq!(ListingState::Active.id(), 3);
        assert_eq!(ListingState::Rejected.id(), 5);
    }
}
