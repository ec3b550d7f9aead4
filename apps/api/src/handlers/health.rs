use axum::Json;
use axum::extract::Extension;
use cmms_domain::Actor;

use crate::dto::{ActorResponse, HealthResponse};

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn me_handler(Extension(actor): Extension<Actor>) -> Json<ActorResponse> {
    Json(ActorResponse::from(&actor))
}
