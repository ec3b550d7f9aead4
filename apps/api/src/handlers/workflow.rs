use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path};
use cmms_domain::{Actor, WorkOrderStatus, allowed_next_statuses, transition_rules};

use crate::dto::{AllowedTransitionsResponse, TransitionRuleResponse};
use crate::error::ApiResult;

pub async fn list_transitions_handler() -> Json<Vec<TransitionRuleResponse>> {
    Json(
        transition_rules()
            .iter()
            .map(TransitionRuleResponse::from)
            .collect(),
    )
}

pub async fn allowed_transitions_handler(
    Extension(actor): Extension<Actor>,
    Path(status): Path<String>,
) -> ApiResult<Json<AllowedTransitionsResponse>> {
    let from = WorkOrderStatus::from_str(status.as_str())?;
    let next_statuses = allowed_next_statuses(from, actor.role());

    Ok(Json(AllowedTransitionsResponse::new(
        from,
        actor.role(),
        next_statuses,
    )))
}
