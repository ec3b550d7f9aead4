use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use cmms_domain::{Actor, NotificationId};

use crate::dto::{
    BulkNotificationUpdateResponse, NotificationListQueryRequest, NotificationResponse,
    UnreadCountResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_notifications_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<NotificationListQueryRequest>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list(
            &actor,
            query.unread_only.unwrap_or(false),
            query.limit,
            query.offset,
        )
        .await?
        .iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(Json(notifications))
}

pub async fn unread_count_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = state.notification_service.unread_count(&actor).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

pub async fn mark_read_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<String>,
) -> ApiResult<StatusCode> {
    let notification_id = NotificationId::from_str(notification_id.as_str())?;
    state
        .notification_service
        .mark_read(&actor, notification_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<BulkNotificationUpdateResponse>> {
    let affected = state.notification_service.mark_all_read(&actor).await?;
    Ok(Json(BulkNotificationUpdateResponse { affected }))
}

pub async fn delete_read_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<BulkNotificationUpdateResponse>> {
    let affected = state.notification_service.delete_read(&actor).await?;
    Ok(Json(BulkNotificationUpdateResponse { affected }))
}

pub async fn delete_notification_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<String>,
) -> ApiResult<StatusCode> {
    let notification_id = NotificationId::from_str(notification_id.as_str())?;
    state
        .notification_service
        .delete(&actor, notification_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
