//! Fire-and-forget notification emitter.
//!
//! [`Notifier::notify`] persists a notification row and publishes the
//! matching event on the bus. It never returns an error: a failed insert is
//! logged and swallowed, so announcing a state transition can never fail or
//! roll back the transition itself.

use std::sync::Arc;

use sokoni_core::types::DbId;
use sokoni_db::repositories::NotificationRepo;
use sokoni_db::DbPool;

use crate::bus::{EventBus, MarketEvent};

/// Sends user-facing notifications for lifecycle transitions.
pub struct Notifier {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl Notifier {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Notify a user of a state transition.
    ///
    /// `notification_type` is one of the constants in
    /// `sokoni_core::notifications`; `related_id`/`related_type` point at
    /// the entity the notice concerns.
    pub async fn notify(
        &self,
        user_id: DbId,
        notification_type: &str,
        title: &str,
        message: &str,
        related_id: Option<DbId>,
        related_type: Option<&str>,
    ) {
        if let Err(e) = NotificationRepo::insert(
            &self.pool,
            user_id,
            notification_type,
            title,
            message,
            related_id,
            related_type,
        )
        .await
        {
            tracing::warn!(
                user_id,
                notification_type,
                error = %e,
                "Failed to persist notification"
            );
        }

        let mut event =
            MarketEvent::new(format!("notify.{notification_type}")).with_seller(user_id);
        if let (Some(id), Some(entity)) = (related_id, related_type) {
            event = event.with_entity(entity, id);
        }
        self.bus.publish(event);
    }
}
