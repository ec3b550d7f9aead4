use cmms_domain::{Actor, UserRef};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the acting user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/actor-response.ts"
)]
pub struct ActorResponse {
    pub user_id: String,
    pub display_name: String,
    pub role: String,
}

/// Stable user reference plus display label.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-ref-response.ts"
)]
pub struct UserRefResponse {
    pub user_id: String,
    pub display_name: String,
}

impl From<&Actor> for ActorResponse {
    fn from(actor: &Actor) -> Self {
        Self {
            user_id: actor.user_id().to_string(),
            display_name: actor.display_name().to_owned(),
            role: actor.role().as_str().to_owned(),
        }
    }
}

impl From<&UserRef> for UserRefResponse {
    fn from(user: &UserRef) -> Self {
        Self {
            user_id: user.user_id.to_string(),
            display_name: user.display_name.clone(),
        }
    }
}
