//! Database repository for per-account notifications.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::notifications::{NotificationCreateDBRequest, NotificationDBResponse},
    },
    types::{AccountId, NotificationId, abbrev_uuid},
};

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, notification_type, title, message, data, is_read, read_at, \
     priority, expires_at, created_at";

pub struct Notifications<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Notifications<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(recipient_id = %abbrev_uuid(&request.recipient_id)), err)]
    pub async fn create(&mut self, request: &NotificationCreateDBRequest) -> Result<NotificationDBResponse> {
        let sql = format!(
            "INSERT INTO notifications (recipient_id, notification_type, title, message, data, priority, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, NotificationDBResponse>(&sql)
            .bind(request.recipient_id)
            .bind(&request.notification_type)
            .bind(&request.title)
            .bind(&request.message)
            .bind(&request.data)
            .bind(request.priority.as_str())
            .bind(request.expires_at)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(notification)
    }

    /// Unexpired notifications for one account, unread first, then newest first.
    #[instrument(skip(self), fields(recipient_id = %abbrev_uuid(&recipient_id)), err)]
    pub async fn list_for_recipient(
        &mut self,
        recipient_id: AccountId,
        unread_only: bool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<NotificationDBResponse>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_id = $1 AND (NOT $2 OR NOT is_read) \
                 AND (expires_at IS NULL OR expires_at > NOW()) \
             ORDER BY is_read, created_at DESC LIMIT $3 OFFSET $4"
        );
        let notifications = sqlx::query_as::<_, NotificationDBResponse>(&sql)
            .bind(recipient_id)
            .bind(unread_only)
            .bind(limit)
            .bind(skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(notifications)
    }

    /// Mark a notification read. Scoped to the recipient so one account cannot touch
    /// another's notifications; returns `None` when nothing matched.
    #[instrument(skip(self), fields(notification_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_read(&mut self, id: NotificationId, recipient_id: AccountId) -> Result<Option<NotificationDBResponse>> {
        let sql = format!(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND recipient_id = $2 RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, NotificationDBResponse>(&sql)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(notification)
    }
}
