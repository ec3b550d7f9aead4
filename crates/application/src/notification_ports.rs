use async_trait::async_trait;
use cmms_core::AppResult;
use cmms_domain::{Notification, NotificationId, NotificationType, Role, UserId, WorkOrderId};

/// Default page size for inbox listings.
pub const DEFAULT_NOTIFICATION_PAGE_SIZE: usize = 50;

/// Largest page size accepted for inbox listings.
pub const MAX_NOTIFICATION_PAGE_SIZE: usize = 200;

/// One recipient's inbox, scoped to the role they were addressed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationRecipient {
    /// Recipient id.
    pub user_id: UserId,
    /// Role the notifications were addressed to.
    pub role: Role,
}

/// Filters for listing an inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationListQuery {
    /// Whose inbox.
    pub recipient: NotificationRecipient,
    /// Only unread notifications.
    pub unread_only: bool,
    /// Maximum rows returned.
    pub limit: usize,
    /// Rows skipped before the page starts.
    pub offset: usize,
}

/// Outbound notification channel.
///
/// Called once per notification. A failure affects only that notification.
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    /// Delivers one notification.
    async fn deliver(&self, notification: &Notification) -> AppResult<()>;
}

/// Inbox store tracking read state.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores a notification.
    async fn save_notification(&self, notification: &Notification) -> AppResult<()>;

    /// Lists an inbox, newest first.
    async fn list_notifications(&self, query: NotificationListQuery)
    -> AppResult<Vec<Notification>>;

    /// Counts unread notifications in an inbox.
    async fn unread_count(&self, recipient: NotificationRecipient) -> AppResult<u64>;

    /// Marks one notification read. Missing or foreign ids are `NotFound`.
    async fn mark_read(
        &self,
        recipient: NotificationRecipient,
        notification_id: NotificationId,
    ) -> AppResult<()>;

    /// Marks every notification in an inbox read, returning how many changed.
    async fn mark_all_read(&self, recipient: NotificationRecipient) -> AppResult<u64>;

    /// Deletes one notification. Missing or foreign ids are `NotFound`.
    async fn delete_notification(
        &self,
        recipient: NotificationRecipient,
        notification_id: NotificationId,
    ) -> AppResult<()>;

    /// Deletes every read notification in an inbox, returning how many were removed.
    async fn delete_read(&self, recipient: NotificationRecipient) -> AppResult<u64>;

    /// Returns whether `recipient_id` already holds a notification of this type
    /// for the work order.
    async fn has_notification(
        &self,
        work_order_id: WorkOrderId,
        recipient_id: UserId,
        notification_type: NotificationType,
    ) -> AppResult<bool>;
}
