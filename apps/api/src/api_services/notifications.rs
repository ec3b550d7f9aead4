use std::sync::Arc;
use std::time::Duration;

use cmms_application::NotificationDelivery;
use cmms_infrastructure::{FanOutNotificationDelivery, WebhookNotificationDelivery};
use tracing::info;

use crate::api_config::WebhookConfig;

/// In-app inbox first, then the optional webhook.
pub fn build_delivery(
    inbox: Arc<dyn NotificationDelivery>,
    webhook: Option<&WebhookConfig>,
) -> Arc<dyn NotificationDelivery> {
    let mut delivery = FanOutNotificationDelivery::new().with_channel("inbox", inbox);

    if let Some(webhook) = webhook {
        info!(endpoint = %webhook.url, "notification webhook enabled");
        delivery = delivery.with_channel(
            "webhook",
            Arc::new(WebhookNotificationDelivery::new(
                reqwest::Client::new(),
                webhook.url.clone(),
                webhook.max_attempts,
                webhook.backoff_ms,
                Duration::from_millis(webhook.timeout_ms),
            )),
        );
    }

    Arc::new(delivery)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use cmms_application::{NotificationRecipient, NotificationRepository};
    use cmms_domain::{
        Notification, NotificationId, NotificationType, Role, UserId, UserRef, WorkOrderId,
    };
    use cmms_infrastructure::InMemoryNotificationRepository;

    use super::build_delivery;
    use crate::api_config::WebhookConfig;

    #[tokio::test]
    async fn silent_webhook_does_not_hold_the_inbox_channel() {
        let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(error) => panic!("failed to bind listener: {error}"),
        };
        let address = match listener.local_addr() {
            Ok(address) => address,
            Err(error) => panic!("listener has no address: {error}"),
        };
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let inbox = Arc::new(InMemoryNotificationRepository::new());
        let delivery = build_delivery(
            inbox.clone(),
            Some(&WebhookConfig {
                url: format!("http://{address}/hooks"),
                max_attempts: 1,
                backoff_ms: 50,
                timeout_ms: 200,
            }),
        );

        let recipient = UserRef::new(UserId::new(), "Hank");
        let notification = Notification {
            notification_id: NotificationId::new(),
            notification_type: NotificationType::WoCompleted,
            work_order_id: WorkOrderId::new(),
            work_order_title: "Fix pump".to_owned(),
            message: "Work order \"Fix pump\" is ready for review".to_owned(),
            recipient_role: Role::HeadTechnician,
            recipient: recipient.clone(),
            is_read: false,
            created_at: Utc::now(),
            triggered_by: UserRef::new(UserId::new(), "Alice"),
        };

        let result =
            tokio::time::timeout(Duration::from_secs(5), delivery.deliver(&notification)).await;
        server.abort();

        assert!(matches!(result, Ok(Err(_))));
        let unread = inbox
            .unread_count(NotificationRecipient {
                user_id: recipient.user_id,
                role: Role::HeadTechnician,
            })
            .await;
        assert!(matches!(unread, Ok(1)));
    }
}
