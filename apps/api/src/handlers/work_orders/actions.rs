use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use cmms_domain::{Actor, UserId, WorkOrderStatus};

use super::parse_work_order_id;
use crate::dto::{
    ApproveWorkOrderRequest, AssignWorkOrderRequest, CompleteWorkOrderRequest,
    ExpectedVersionQuery, MoveWorkOrderRequest, RejectWorkOrderRequest, WorkflowOutcomeResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

type OutcomeResult = ApiResult<Json<WorkflowOutcomeResponse>>;

pub async fn assign_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Json(payload): Json<AssignWorkOrderRequest>,
) -> OutcomeResult {
    let outcome = state
        .work_order_service
        .assign(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            UserId::from_str(payload.technician_id.as_str())?,
            payload.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn complete_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Json(payload): Json<CompleteWorkOrderRequest>,
) -> OutcomeResult {
    let outcome = state
        .work_order_service
        .submit_completion(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            payload.notes,
            payload.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn approve_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Json(payload): Json<ApproveWorkOrderRequest>,
) -> OutcomeResult {
    let outcome = state
        .work_order_service
        .approve(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            payload.review_notes,
            payload.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn reject_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Json(payload): Json<RejectWorkOrderRequest>,
) -> OutcomeResult {
    let reason = payload.reason.unwrap_or_default();
    let outcome = state
        .work_order_service
        .reject(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            reason.as_str(),
            payload.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn close_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Query(query): Query<ExpectedVersionQuery>,
) -> OutcomeResult {
    let outcome = state
        .work_order_service
        .close(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            query.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn reopen_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Query(query): Query<ExpectedVersionQuery>,
) -> OutcomeResult {
    let outcome = state
        .work_order_service
        .reopen(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            query.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn cancel_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Query(query): Query<ExpectedVersionQuery>,
) -> OutcomeResult {
    let outcome = state
        .work_order_service
        .cancel(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            query.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn move_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Json(payload): Json<MoveWorkOrderRequest>,
) -> OutcomeResult {
    let technician_id = payload
        .technician_id
        .map(|value| UserId::from_str(value.as_str()))
        .transpose()?;
    let outcome = state
        .work_order_service
        .move_to_status(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            WorkOrderStatus::from_str(payload.status.as_str())?,
            technician_id,
            payload.reason,
            payload.expected_version,
        )
        .await?;

    Ok(Json(outcome.into()))
}
