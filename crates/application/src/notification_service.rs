use std::sync::Arc;

use cmms_core::{AppError, AppResult};
use cmms_domain::{Actor, Notification, NotificationId};

use crate::notification_ports::{
    DEFAULT_NOTIFICATION_PAGE_SIZE, MAX_NOTIFICATION_PAGE_SIZE, NotificationListQuery,
    NotificationRecipient, NotificationRepository,
};

/// Actor-scoped inbox operations.
#[derive(Clone)]
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Creates a notification service.
    #[must_use]
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// Lists the actor's inbox.
    pub async fn list(
        &self,
        actor: &Actor,
        unread_only: bool,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> AppResult<Vec<Notification>> {
        let limit = limit.unwrap_or(DEFAULT_NOTIFICATION_PAGE_SIZE);
        if limit == 0 {
            return Err(AppError::Validation(
                "limit must be greater than zero".to_owned(),
            ));
        }

        self.repository
            .list_notifications(NotificationListQuery {
                recipient: recipient(actor),
                unread_only,
                limit: limit.min(MAX_NOTIFICATION_PAGE_SIZE),
                offset: offset.unwrap_or(0),
            })
            .await
    }

    /// Counts the actor's unread notifications.
    pub async fn unread_count(&self, actor: &Actor) -> AppResult<u64> {
        self.repository.unread_count(recipient(actor)).await
    }

    /// Marks one of the actor's notifications read.
    pub async fn mark_read(&self, actor: &Actor, notification_id: NotificationId) -> AppResult<()> {
        self.repository
            .mark_read(recipient(actor), notification_id)
            .await
    }

    /// Marks all of the actor's notifications read.
    pub async fn mark_all_read(&self, actor: &Actor) -> AppResult<u64> {
        self.repository.mark_all_read(recipient(actor)).await
    }

    /// Deletes all of the actor's read notifications.
    pub async fn delete_read(&self, actor: &Actor) -> AppResult<u64> {
        self.repository.delete_read(recipient(actor)).await
    }

    /// Deletes one of the actor's notifications.
    pub async fn delete(&self, actor: &Actor, notification_id: NotificationId) -> AppResult<()> {
        self.repository
            .delete_notification(recipient(actor), notification_id)
            .await
    }
}

fn recipient(actor: &Actor) -> NotificationRecipient {
    NotificationRecipient {
        user_id: actor.user_id(),
        role: actor.role(),
    }
}
