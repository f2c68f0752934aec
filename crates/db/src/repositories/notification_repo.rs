//! Repository for the `notifications` table.

use sqlx::PgPool;

use sokoni_core::types::DbId;

use crate::models::notification::{Notification, NotificationListQuery};

const COLUMNS: &str = "\
    id, user_id, notification_type, title, message, related_id, related_type, \
    is_read, read_at, created_at";

const MAX_LIMIT: i64 = 100;
const DEFAULT_LIMIT: i64 = 50;

/// Provides insert and read operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert one notification row.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        notification_type: &str,
        title: &str,
        message: &str,
        related_id: Option<DbId>,
        related_type: Option<&str>,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                 (user_id, notification_type, title, message, related_id, related_type) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(notification_type)
            .bind(title)
            .bind(message)
            .bind(related_id)
            .bind(related_type)
            .fetch_one(pool)
            .await
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        params: &NotificationListQuery,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);
        let unread_filter = if params.unread_only.unwrap_or(false) {
            "AND NOT is_read"
        } else {
            ""
        };

        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {unread_filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark one notification read. Returns `false` if already read.
    pub async fn mark_read(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE id = $1 AND NOT is_read",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unread count for a user's badge.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
