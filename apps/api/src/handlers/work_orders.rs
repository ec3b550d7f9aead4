mod actions;

use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use cmms_domain::{Actor, WorkOrderId};

use crate::dto::{
    CreateWorkOrderRequest, ExpectedVersionQuery, UpdateWorkOrderRequest,
    WorkOrderCapabilitiesResponse, WorkOrderListQueryRequest, WorkOrderResponse,
    WorkflowOutcomeResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub use actions::{
    approve_work_order_handler, assign_work_order_handler, cancel_work_order_handler,
    close_work_order_handler, complete_work_order_handler, move_work_order_handler,
    reject_work_order_handler, reopen_work_order_handler,
};

fn parse_work_order_id(value: &str) -> ApiResult<WorkOrderId> {
    Ok(WorkOrderId::from_str(value)?)
}

pub async fn list_work_orders_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<WorkOrderListQueryRequest>,
) -> ApiResult<Json<Vec<WorkOrderResponse>>> {
    let work_orders = state
        .work_order_service
        .list(&actor, query.try_into()?)
        .await?
        .iter()
        .map(WorkOrderResponse::from)
        .collect();

    Ok(Json(work_orders))
}

pub async fn create_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateWorkOrderRequest>,
) -> ApiResult<(StatusCode, Json<WorkflowOutcomeResponse>)> {
    let outcome = state
        .work_order_service
        .create(&actor, payload.try_into()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WorkflowOutcomeResponse::from(outcome)),
    ))
}

pub async fn get_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
) -> ApiResult<Json<WorkOrderResponse>> {
    let work_order = state
        .work_order_service
        .get(&actor, parse_work_order_id(work_order_id.as_str())?)
        .await?;

    Ok(Json(WorkOrderResponse::from(&work_order)))
}

pub async fn update_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Json(payload): Json<UpdateWorkOrderRequest>,
) -> ApiResult<Json<WorkOrderResponse>> {
    let expected_version = payload.expected_version;
    let work_order = state
        .work_order_service
        .update_details(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            payload.try_into()?,
            expected_version,
        )
        .await?;

    Ok(Json(WorkOrderResponse::from(&work_order)))
}

pub async fn delete_work_order_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
    Query(query): Query<ExpectedVersionQuery>,
) -> ApiResult<StatusCode> {
    state
        .work_order_service
        .delete(
            &actor,
            parse_work_order_id(work_order_id.as_str())?,
            query.expected_version,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn work_order_capabilities_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(work_order_id): Path<String>,
) -> ApiResult<Json<WorkOrderCapabilitiesResponse>> {
    let capabilities = state
        .work_order_service
        .capabilities(&actor, parse_work_order_id(work_order_id.as_str())?)
        .await?;

    Ok(Json(WorkOrderCapabilitiesResponse::from(capabilities)))
}
