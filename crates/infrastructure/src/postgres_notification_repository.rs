//! PostgreSQL-backed notification inbox.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cmms_application::{
    NotificationDelivery, NotificationListQuery, NotificationRecipient, NotificationRepository,
};
use cmms_core::{AppError, AppResult};
use cmms_domain::{
    Notification, NotificationId, NotificationType, Role, UserId, UserRef, WorkOrderId,
};

/// PostgreSQL implementation of the notification repository port.
///
/// Also acts as the in-app delivery channel: delivering stores the row.
#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    notification_type: String,
    work_order_id: Uuid,
    work_order_title: String,
    message: String,
    recipient_role: String,
    recipient_id: Uuid,
    recipient_name: String,
    is_read: bool,
    created_at: DateTime<Utc>,
    triggered_by_id: Uuid,
    triggered_by_name: String,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            notification_id: NotificationId::from_uuid(row.id),
            notification_type: NotificationType::from_str(row.notification_type.as_str())?,
            work_order_id: WorkOrderId::from_uuid(row.work_order_id),
            work_order_title: row.work_order_title,
            message: row.message,
            recipient_role: Role::from_str(row.recipient_role.as_str())?,
            recipient: UserRef::new(UserId::from_uuid(row.recipient_id), row.recipient_name),
            is_read: row.is_read,
            created_at: row.created_at,
            triggered_by: UserRef::new(
                UserId::from_uuid(row.triggered_by_id),
                row.triggered_by_name,
            ),
        })
    }
}

fn page_value(value: usize) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|error| AppError::Validation(format!("invalid paging value: {error}")))
}

fn affected(rows: u64, notification_id: NotificationId) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::NotFound(format!(
            "notification '{notification_id}' does not exist"
        )));
    }

    Ok(())
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn save_notification(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, notification_type, work_order_id, work_order_title, message,
                recipient_role, recipient_id, recipient_name, is_read, created_at,
                triggered_by_id, triggered_by_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(notification.notification_id.as_uuid())
        .bind(notification.notification_type.as_str())
        .bind(notification.work_order_id.as_uuid())
        .bind(notification.work_order_title.as_str())
        .bind(notification.message.as_str())
        .bind(notification.recipient_role.as_str())
        .bind(notification.recipient.user_id.as_uuid())
        .bind(notification.recipient.display_name.as_str())
        .bind(notification.is_read)
        .bind(notification.created_at)
        .bind(notification.triggered_by.user_id.as_uuid())
        .bind(notification.triggered_by.display_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save notification: {error}")))?;

        Ok(())
    }

    async fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, notification_type, work_order_id, work_order_title, message,
                   recipient_role, recipient_id, recipient_name, is_read, created_at,
                   triggered_by_id, triggered_by_name
            FROM notifications
            WHERE recipient_id = $1
              AND recipient_role = $2
              AND ($3 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC, id
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.recipient.user_id.as_uuid())
        .bind(query.recipient.role.as_str())
        .bind(query.unread_only)
        .bind(page_value(query.limit)?)
        .bind(page_value(query.offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list notifications: {error}")))?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn unread_count(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE recipient_id = $1 AND recipient_role = $2 AND is_read = FALSE
            "#,
        )
        .bind(recipient.user_id.as_uuid())
        .bind(recipient.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count unread notifications: {error}"))
        })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn mark_read(
        &self,
        recipient: NotificationRecipient,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2 AND recipient_role = $3
            "#,
        )
        .bind(notification_id.as_uuid())
        .bind(recipient.user_id.as_uuid())
        .bind(recipient.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to mark notification read: {error}"))
        })?;

        affected(result.rows_affected(), notification_id)
    }

    async fn mark_all_read(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE recipient_id = $1 AND recipient_role = $2 AND is_read = FALSE
            "#,
        )
        .bind(recipient.user_id.as_uuid())
        .bind(recipient.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to mark notifications read: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_notification(
        &self,
        recipient: NotificationRecipient,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE id = $1 AND recipient_id = $2 AND recipient_role = $3
            "#,
        )
        .bind(notification_id.as_uuid())
        .bind(recipient.user_id.as_uuid())
        .bind(recipient.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete notification: {error}")))?;

        affected(result.rows_affected(), notification_id)
    }

    async fn delete_read(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE recipient_id = $1 AND recipient_role = $2 AND is_read = TRUE
            "#,
        )
        .bind(recipient.user_id.as_uuid())
        .bind(recipient.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete read notifications: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn has_notification(
        &self,
        work_order_id: WorkOrderId,
        recipient_id: UserId,
        notification_type: NotificationType,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM notifications
                WHERE work_order_id = $1 AND recipient_id = $2 AND notification_type = $3
            )
            "#,
        )
        .bind(work_order_id.as_uuid())
        .bind(recipient_id.as_uuid())
        .bind(notification_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check notification history: {error}"))
        })
    }
}

#[async_trait]
impl NotificationDelivery for PostgresNotificationRepository {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        self.save_notification(notification).await
    }
}
