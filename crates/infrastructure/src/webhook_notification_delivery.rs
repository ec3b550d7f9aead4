use std::time::Duration;

use async_trait::async_trait;
use cmms_application::NotificationDelivery;
use cmms_core::{AppError, AppResult};
use cmms_domain::Notification;
use serde::Serialize;
use tracing::warn;

/// Event name sent in the `X-Cmms-Event` header and envelope.
const NOTIFICATION_EVENT: &str = "work_order.notification";

#[derive(Debug, Serialize)]
struct NotificationEnvelope<'a> {
    event: &'static str,
    notification_id: String,
    notification_type: &'static str,
    work_order_id: String,
    work_order_title: &'a str,
    message: &'a str,
    recipient_role: &'static str,
    recipient_id: String,
    recipient_name: &'a str,
    triggered_by_id: String,
    triggered_by_name: &'a str,
    created_at: String,
}

impl<'a> From<&'a Notification> for NotificationEnvelope<'a> {
    fn from(notification: &'a Notification) -> Self {
        Self {
            event: NOTIFICATION_EVENT,
            notification_id: notification.notification_id.to_string(),
            notification_type: notification.notification_type.as_str(),
            work_order_id: notification.work_order_id.to_string(),
            work_order_title: notification.work_order_title.as_str(),
            message: notification.message.as_str(),
            recipient_role: notification.recipient_role.as_str(),
            recipient_id: notification.recipient.user_id.to_string(),
            recipient_name: notification.recipient.display_name.as_str(),
            triggered_by_id: notification.triggered_by.user_id.to_string(),
            triggered_by_name: notification.triggered_by.display_name.as_str(),
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Posts notifications to an HTTP endpoint with bounded retries.
///
/// The notification id is sent as `Idempotency-Key`, so receivers can drop
/// retried duplicates.
pub struct WebhookNotificationDelivery {
    http_client: reqwest::Client,
    endpoint: String,
    max_attempts: u8,
    retry_backoff_ms: u64,
    request_timeout: Duration,
}

impl WebhookNotificationDelivery {
    /// Creates a webhook delivery channel.
    ///
    /// `request_timeout` bounds each attempt, so a receiver that never
    /// answers fails the attempt instead of holding the caller.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        endpoint: impl Into<String>,
        max_attempts: u8,
        retry_backoff_ms: u64,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            max_attempts: max_attempts.max(1),
            retry_backoff_ms: retry_backoff_ms.max(50),
            request_timeout: request_timeout.max(Duration::from_millis(1)),
        }
    }
}

#[async_trait]
impl NotificationDelivery for WebhookNotificationDelivery {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        let envelope = NotificationEnvelope::from(notification);
        let idempotency_key = notification.notification_id.to_string();

        let mut attempt = 0_u8;
        let mut last_error: Option<String> = None;

        while attempt < self.max_attempts {
            attempt = attempt.saturating_add(1);
            let response = self
                .http_client
                .post(self.endpoint.as_str())
                .timeout(self.request_timeout)
                .header("Idempotency-Key", idempotency_key.as_str())
                .header("X-Cmms-Event", NOTIFICATION_EVENT)
                .json(&envelope)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS =>
                {
                    last_error = Some(format!(
                        "transient HTTP status {} for notification '{}'",
                        response.status(),
                        idempotency_key
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
                    return Err(AppError::Internal(format!(
                        "notification webhook rejected '{idempotency_key}' with status {status}: {body}"
                    )));
                }
                Err(error) => {
                    last_error = Some(format!("notification webhook transport error: {error}"));
                }
            }

            if attempt < self.max_attempts {
                warn!(
                    notification_id = %idempotency_key,
                    attempt,
                    max_attempts = self.max_attempts,
                    "retrying notification webhook"
                );
                let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(AppError::Internal(last_error.unwrap_or_else(|| {
            "notification webhook exhausted retries".to_owned()
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use cmms_application::NotificationDelivery;
    use cmms_core::AppError;
    use cmms_domain::{
        Notification, NotificationId, NotificationType, Role, UserId, UserRef, WorkOrderId,
    };
    use serde_json::Value;

    use super::{NotificationEnvelope, WebhookNotificationDelivery};

    fn notification() -> Notification {
        Notification {
            notification_id: NotificationId::new(),
            notification_type: NotificationType::WoRejected,
            work_order_id: WorkOrderId::new(),
            work_order_title: "Fix pump".to_owned(),
            message: "Work order \"Fix pump\" needs revision. Reason: missing photos".to_owned(),
            recipient_role: Role::Technician,
            recipient: UserRef::new(UserId::new(), "Alice"),
            is_read: false,
            created_at: Utc::now(),
            triggered_by: UserRef::new(UserId::new(), "Hank"),
        }
    }

    #[test]
    fn envelope_uses_storage_values() {
        let value = notification();
        let envelope = serde_json::to_value(NotificationEnvelope::from(&value));
        let Ok(envelope) = envelope else {
            panic!("envelope should serialize");
        };

        assert_eq!(
            envelope.get("notification_type").and_then(Value::as_str),
            Some("wo_rejected")
        );
        assert_eq!(
            envelope.get("recipient_role").and_then(Value::as_str),
            Some("technician")
        );
        assert_eq!(
            envelope.get("recipient_name").and_then(Value::as_str),
            Some("Alice")
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_after_retries() {
        let delivery = WebhookNotificationDelivery::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/notifications",
            2,
            50,
            Duration::from_secs(5),
        );

        let result = delivery.deliver(&notification()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn silent_endpoint_times_out() {
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

        let delivery = WebhookNotificationDelivery::new(
            reqwest::Client::new(),
            format!("http://{address}/notifications"),
            2,
            50,
            Duration::from_millis(200),
        );

        let result =
            tokio::time::timeout(Duration::from_secs(5), delivery.deliver(&notification())).await;
        server.abort();

        assert!(matches!(result, Ok(Err(AppError::Internal(_)))));
    }
}
