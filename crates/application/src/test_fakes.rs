//! In-crate fakes for service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use cmms_core::{AppError, AppResult};
use cmms_domain::{
    Notification, NotificationId, NotificationType, Role, UserId, WorkOrder, WorkOrderId,
    WorkOrderRevision,
};
use tokio::sync::Mutex;

use crate::directory_ports::{DirectoryUser, UserDirectory};
use crate::notification_ports::{
    NotificationDelivery, NotificationListQuery, NotificationRecipient, NotificationRepository,
};
use crate::work_order_ports::{WorkOrderListQuery, WorkOrderRepository};

#[derive(Default)]
pub(crate) struct FakeWorkOrderRepository {
    pub(crate) work_orders: Mutex<HashMap<WorkOrderId, WorkOrder>>,
    pub(crate) writes: Mutex<usize>,
}

impl FakeWorkOrderRepository {
    pub(crate) async fn seed(&self, work_order: WorkOrder) {
        self.work_orders
            .lock()
            .await
            .insert(work_order.id(), work_order);
    }

    pub(crate) async fn stored(&self, work_order_id: WorkOrderId) -> Option<WorkOrder> {
        self.work_orders.lock().await.get(&work_order_id).cloned()
    }
}

fn revision_matches(stored: &WorkOrder, expected: WorkOrderRevision) -> AppResult<()> {
    if stored.revision() == expected {
        return Ok(());
    }

    Err(AppError::Conflict(format!(
        "work order '{}' changed concurrently",
        stored.id()
    )))
}

#[async_trait]
impl WorkOrderRepository for FakeWorkOrderRepository {
    async fn insert_work_order(&self, work_order: &WorkOrder) -> AppResult<()> {
        *self.writes.lock().await += 1;
        self.work_orders
            .lock()
            .await
            .insert(work_order.id(), work_order.clone());
        Ok(())
    }

    async fn find_work_order(&self, work_order_id: WorkOrderId) -> AppResult<Option<WorkOrder>> {
        Ok(self.stored(work_order_id).await)
    }

    async fn list_work_orders(&self, query: WorkOrderListQuery) -> AppResult<Vec<WorkOrder>> {
        Ok(self
            .work_orders
            .lock()
            .await
            .values()
            .filter(|work_order| query.matches(work_order))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn list_due_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<WorkOrder>> {
        Ok(self
            .work_orders
            .lock()
            .await
            .values()
            .filter(|work_order| {
                work_order
                    .due_date()
                    .is_some_and(|due_date| due_date >= from && due_date <= to)
            })
            .cloned()
            .collect())
    }

    async fn update_work_order(
        &self,
        work_order: &WorkOrder,
        expected: WorkOrderRevision,
    ) -> AppResult<()> {
        let mut work_orders = self.work_orders.lock().await;
        let stored = work_orders
            .get(&work_order.id())
            .ok_or_else(|| AppError::NotFound("work order".to_owned()))?;
        revision_matches(stored, expected)?;
        work_orders.insert(work_order.id(), work_order.clone());
        *self.writes.lock().await += 1;
        Ok(())
    }

    async fn delete_work_order(
        &self,
        work_order_id: WorkOrderId,
        expected: WorkOrderRevision,
    ) -> AppResult<()> {
        let mut work_orders = self.work_orders.lock().await;
        let stored = work_orders
            .get(&work_order_id)
            .ok_or_else(|| AppError::NotFound("work order".to_owned()))?;
        revision_matches(stored, expected)?;
        work_orders.remove(&work_order_id);
        *self.writes.lock().await += 1;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    users: Mutex<HashMap<UserId, DirectoryUser>>,
}

impl FakeDirectory {
    pub(crate) async fn add(
        &self,
        display_name: &str,
        role: Role,
        supervisor_id: Option<UserId>,
    ) -> DirectoryUser {
        let user = DirectoryUser {
            user_id: UserId::new(),
            display_name: display_name.to_owned(),
            role,
            title: None,
            supervisor_id,
        };
        self.users.lock().await.insert(user.user_id, user.clone());
        user
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        Ok(self.users.lock().await.values().cloned().collect())
    }

    async fn list_users_with_role(&self, role: Role) -> AppResult<Vec<DirectoryUser>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect())
    }

    async fn find_supervisor(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        let users = self.users.lock().await;
        Ok(users
            .get(&user_id)
            .and_then(|user| user.supervisor_id)
            .and_then(|supervisor_id| users.get(&supervisor_id).cloned()))
    }

    async fn save_user(&self, user: DirectoryUser) -> AppResult<()> {
        self.users.lock().await.insert(user.user_id, user);
        Ok(())
    }
}

/// Records delivered notifications; deliveries to `failing_recipient` fail.
#[derive(Default)]
pub(crate) struct RecordingDelivery {
    pub(crate) delivered: Mutex<Vec<Notification>>,
    pub(crate) failing_recipient: Mutex<Option<UserId>>,
}

#[async_trait]
impl NotificationDelivery for RecordingDelivery {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        if *self.failing_recipient.lock().await == Some(notification.recipient.user_id) {
            return Err(AppError::Internal("channel unavailable".to_owned()));
        }

        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for RecordingDelivery {
    async fn save_notification(&self, notification: &Notification) -> AppResult<()> {
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> AppResult<Vec<Notification>> {
        Ok(self
            .delivered
            .lock()
            .await
            .iter()
            .filter(|notification| notification.recipient.user_id == query.recipient.user_id)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, recipient: NotificationRecipient) -> AppResult<u64> {
        let count = self
            .delivered
            .lock()
            .await
            .iter()
            .filter(|notification| {
                notification.recipient.user_id == recipient.user_id && !notification.is_read
            })
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn mark_read(
        &self,
        _recipient: NotificationRecipient,
        _notification_id: NotificationId,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn mark_all_read(&self, _recipient: NotificationRecipient) -> AppResult<u64> {
        Ok(0)
    }

    async fn delete_notification(
        &self,
        _recipient: NotificationRecipient,
        _notification_id: NotificationId,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn delete_read(&self, _recipient: NotificationRecipient) -> AppResult<u64> {
        Ok(0)
    }

    async fn has_notification(
        &self,
        work_order_id: WorkOrderId,
        recipient_id: UserId,
        notification_type: NotificationType,
    ) -> AppResult<bool> {
        Ok(self.delivered.lock().await.iter().any(|notification| {
            notification.work_order_id == work_order_id
                && notification.recipient.user_id == recipient_id
                && notification.notification_type == notification_type
        }))
    }
}
