use std::collections::HashMap;

use async_trait::async_trait;
use cmms_application::{
    NotificationDelivery, NotificationListQuery, NotificationRecipient, NotificationRepository,
};
use cmms_core::{AppError, AppResult};
use cmms_domain::{Notification, NotificationId, NotificationType, UserId, WorkOrderId};
use tokio::sync::RwLock;

/// In-memory inbox. Delivering a notification stores it.
#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty inbox store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifications: RwLock::new(HashMap::new()),
        }
    }
}

fn addressed_to(notification: &Notification, recipient: NotificationRecipient) -> bool {
    notification.recipient.user_id == recipient.user_id
        && notification.recipient_role == recipient.role
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn save_notification(&self, notification: &Notification) -> AppResult<()> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&notification.notification_id) {
            return Err(AppError::Conflict(format!(
                "notification '{}' already exists",
                notification.notification_id
            )));
        }

        notifications.insert(notification.notification_id, notification.clone());
        Ok(())
    }

    async fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> AppResult<Vec<Notification>> {
        let mut values: Vec<Notification> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|notification| {
                addressed_to(notification, query.recipient)
                    && (!query.unread_only || !notification.is_read)
            })
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.notification_id.cmp(&right.notification_id))
        });

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn unread_count(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        Ok(count(
            self.notifications
                .read()
                .await
                .values()
                .filter(|notification| addressed_to(notification, recipient) && !notification.is_read)
                .count(),
        ))
    }

    async fn mark_read(
        &self,
        recipient: NotificationRecipient,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(&notification_id) {
            Some(notification) if addressed_to(notification, recipient) => {
                notification.is_read = true;
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "notification '{notification_id}' does not exist"
            ))),
        }
    }

    async fn mark_all_read(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        let mut changed = 0;
        for notification in self.notifications.write().await.values_mut() {
            if addressed_to(notification, recipient) && !notification.is_read {
                notification.is_read = true;
                changed += 1;
            }
        }

        Ok(count(changed))
    }

    async fn delete_notification(
        &self,
        recipient: NotificationRecipient,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        let mut notifications = self.notifications.write().await;
        let owned = notifications
            .get(&notification_id)
            .is_some_and(|notification| addressed_to(notification, recipient));
        if !owned {
            return Err(AppError::NotFound(format!(
                "notification '{notification_id}' does not exist"
            )));
        }

        notifications.remove(&notification_id);
        Ok(())
    }

    async fn delete_read(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications
            .retain(|_, notification| !(addressed_to(notification, recipient) && notification.is_read));

        Ok(count(before - notifications.len()))
    }

    async fn has_notification(
        &self,
        work_order_id: WorkOrderId,
        recipient_id: UserId,
        notification_type: NotificationType,
    ) -> AppResult<bool> {
        Ok(self
            .notifications
            .read()
            .await
            .values()
            .any(|notification| {
                notification.work_order_id == work_order_id
                    && notification.recipient.user_id == recipient_id
                    && notification.notification_type == notification_type
            }))
    }
}

#[async_trait]
impl NotificationDelivery for InMemoryNotificationRepository {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        self.save_notification(notification).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use cmms_application::{
        NotificationDelivery, NotificationListQuery, NotificationRecipient,
        NotificationRepository,
    };
    use cmms_core::AppError;
    use cmms_domain::{
        Notification, NotificationId, NotificationType, Role, UserId, UserRef, WorkOrderId,
    };

    use super::InMemoryNotificationRepository;

    fn notification(recipient: &UserRef, role: Role) -> Notification {
        Notification {
            notification_id: NotificationId::new(),
            notification_type: NotificationType::WoAssigned,
            work_order_id: WorkOrderId::new(),
            work_order_title: "Fix pump".to_owned(),
            message: "You have been assigned to work order: \"Fix pump\"".to_owned(),
            recipient_role: role,
            recipient: recipient.clone(),
            is_read: false,
            created_at: Utc::now(),
            triggered_by: UserRef::new(UserId::new(), "Ada"),
        }
    }

    fn inbox(user: &UserRef, role: Role) -> NotificationRecipient {
        NotificationRecipient {
            user_id: user.user_id,
            role,
        }
    }

    #[tokio::test]
    async fn inbox_is_scoped_to_recipient_and_role() {
        let store = InMemoryNotificationRepository::new();
        let alice = UserRef::new(UserId::new(), "Alice");
        let bob = UserRef::new(UserId::new(), "Bob");

        assert!(store.deliver(&notification(&alice, Role::Technician)).await.is_ok());
        assert!(store.deliver(&notification(&alice, Role::Admin)).await.is_ok());
        assert!(store.deliver(&notification(&bob, Role::Technician)).await.is_ok());

        let listed = store
            .list_notifications(NotificationListQuery {
                recipient: inbox(&alice, Role::Technician),
                unread_only: false,
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap_or_default();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recipient, alice);
    }

    #[tokio::test]
    async fn read_state_lifecycle() {
        let store = InMemoryNotificationRepository::new();
        let alice = UserRef::new(UserId::new(), "Alice");
        let recipient = inbox(&alice, Role::Technician);
        let first = notification(&alice, Role::Technician);
        let second = notification(&alice, Role::Technician);
        assert!(store.deliver(&first).await.is_ok());
        assert!(store.deliver(&second).await.is_ok());

        assert_eq!(store.unread_count(recipient).await.unwrap_or_default(), 2);
        assert!(store.mark_read(recipient, first.notification_id).await.is_ok());
        assert_eq!(store.unread_count(recipient).await.unwrap_or_default(), 1);

        assert_eq!(store.delete_read(recipient).await.unwrap_or_default(), 1);
        assert_eq!(store.mark_all_read(recipient).await.unwrap_or_default(), 1);
        assert!(store.delete_notification(recipient, second.notification_id).await.is_ok());
        assert_eq!(store.unread_count(recipient).await.unwrap_or(99), 0);
    }

    #[tokio::test]
    async fn foreign_notification_is_not_found() {
        let store = InMemoryNotificationRepository::new();
        let alice = UserRef::new(UserId::new(), "Alice");
        let bob = UserRef::new(UserId::new(), "Bob");
        let value = notification(&alice, Role::Technician);
        assert!(store.deliver(&value).await.is_ok());

        let result = store
            .mark_read(inbox(&bob, Role::Technician), value.notification_id)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn dedup_lookup_matches_type_and_recipient() {
        let store = InMemoryNotificationRepository::new();
        let alice = UserRef::new(UserId::new(), "Alice");
        let value = notification(&alice, Role::Technician);
        assert!(store.deliver(&value).await.is_ok());

        assert!(
            store
                .has_notification(value.work_order_id, alice.user_id, NotificationType::WoAssigned)
                .await
                .unwrap_or(false)
        );
        assert!(
            !store
                .has_notification(value.work_order_id, alice.user_id, NotificationType::WoDue1Day)
                .await
                .unwrap_or(true)
        );
    }
}
