use cmms_domain::Notification;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::UserRefResponse;

/// Inbox listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQueryRequest {
    pub unread_only: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// API representation of one inbox notification.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/notification-response.ts"
)]
pub struct NotificationResponse {
    pub notification_id: String,
    pub notification_type: String,
    pub work_order_id: String,
    pub work_order_title: String,
    pub message: String,
    pub recipient_role: String,
    pub recipient: UserRefResponse,
    pub is_read: bool,
    pub created_at: String,
    pub triggered_by: UserRefResponse,
}

/// Unread badge counter.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/unread-count-response.ts"
)]
pub struct UnreadCountResponse {
    #[ts(type = "number")]
    pub unread_count: u64,
}

/// Number of notifications touched by a bulk inbox operation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-notification-update-response.ts"
)]
pub struct BulkNotificationUpdateResponse {
    #[ts(type = "number")]
    pub affected: u64,
}

impl From<&Notification> for NotificationResponse {
    fn from(value: &Notification) -> Self {
        Self {
            notification_id: value.notification_id.to_string(),
            notification_type: value.notification_type.as_str().to_owned(),
            work_order_id: value.work_order_id.to_string(),
            work_order_title: value.work_order_title.clone(),
            message: value.message.clone(),
            recipient_role: value.recipient_role.as_str().to_owned(),
            recipient: UserRefResponse::from(&value.recipient),
            is_read: value.is_read,
            created_at: value.created_at.to_rfc3339(),
            triggered_by: UserRefResponse::from(&value.triggered_by),
        }
    }
}
