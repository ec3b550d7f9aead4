use std::sync::Arc;

use async_trait::async_trait;
use cmms_application::NotificationDelivery;
use cmms_core::{AppError, AppResult};
use cmms_domain::Notification;
use tracing::warn;

/// Delivers each notification to every channel, attempting all of them even
/// when an earlier one fails.
#[derive(Clone)]
pub struct FanOutNotificationDelivery {
    channels: Vec<(&'static str, Arc<dyn NotificationDelivery>)>,
}

impl FanOutNotificationDelivery {
    /// Creates a fan-out with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Adds a named channel.
    #[must_use]
    pub fn with_channel(
        mut self,
        name: &'static str,
        channel: Arc<dyn NotificationDelivery>,
    ) -> Self {
        self.channels.push((name, channel));
        self
    }
}

impl Default for FanOutNotificationDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDelivery for FanOutNotificationDelivery {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        let mut failed = Vec::new();
        for (name, channel) in &self.channels {
            if let Err(error) = channel.deliver(notification).await {
                warn!(
                    channel = *name,
                    notification_id = %notification.notification_id,
                    error = %error,
                    "notification channel failed"
                );
                failed.push(*name);
            }
        }

        if failed.is_empty() {
            return Ok(());
        }

        Err(AppError::Internal(format!(
            "notification '{}' failed on channel(s): {}",
            notification.notification_id,
            failed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use cmms_application::NotificationDelivery;
    use cmms_core::{AppError, AppResult};
    use cmms_domain::{
        Notification, NotificationId, NotificationType, Role, UserId, UserRef, WorkOrderId,
    };
    use tokio::sync::Mutex;

    use super::FanOutNotificationDelivery;

    struct FailingChannel;

    #[async_trait]
    impl NotificationDelivery for FailingChannel {
        async fn deliver(&self, _notification: &Notification) -> AppResult<()> {
            Err(AppError::Internal("down".to_owned()))
        }
    }

    #[derive(Default)]
    struct CountingChannel {
        delivered: Mutex<usize>,
    }

    #[async_trait]
    impl NotificationDelivery for CountingChannel {
        async fn deliver(&self, _notification: &Notification) -> AppResult<()> {
            *self.delivered.lock().await += 1;
            Ok(())
        }
    }

    fn notification() -> Notification {
        Notification {
            notification_id: NotificationId::new(),
            notification_type: NotificationType::WoClosed,
            work_order_id: WorkOrderId::new(),
            work_order_title: "Fix pump".to_owned(),
            message: "Work order \"Fix pump\" has been closed".to_owned(),
            recipient_role: Role::Requester,
            recipient: UserRef::new(UserId::new(), "Rita"),
            is_read: false,
            created_at: Utc::now(),
            triggered_by: UserRef::new(UserId::new(), "Ada"),
        }
    }

    #[tokio::test]
    async fn later_channels_run_after_a_failure() {
        let counter = Arc::new(CountingChannel::default());
        let fan_out = FanOutNotificationDelivery::new()
            .with_channel("webhook", Arc::new(FailingChannel))
            .with_channel("inbox", counter.clone());

        let result = fan_out.deliver(&notification()).await;

        assert!(matches!(result, Err(AppError::Internal(ref message)) if message.contains("webhook")));
        assert_eq!(*counter.delivered.lock().await, 1);
    }

    #[tokio::test]
    async fn empty_fan_out_succeeds() {
        let fan_out = FanOutNotificationDelivery::default();
        assert!(fan_out.deliver(&notification()).await.is_ok());
    }
}
