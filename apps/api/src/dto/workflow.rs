use cmms_domain::{Role, TransitionRule, WorkOrderStatus};
use serde::Serialize;
use ts_rs::TS;

/// One row of the workflow transition table.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/transition-rule-response.ts"
)]
pub struct TransitionRuleResponse {
    pub from: String,
    pub to: String,
    pub allowed_roles: Vec<String>,
}

/// Statuses a role may move a work order to from one status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/allowed-transitions-response.ts"
)]
pub struct AllowedTransitionsResponse {
    pub from: String,
    pub role: String,
    pub next_statuses: Vec<String>,
}

impl From<&TransitionRule> for TransitionRuleResponse {
    fn from(rule: &TransitionRule) -> Self {
        Self {
            from: rule.from.as_str().to_owned(),
            to: rule.to.as_str().to_owned(),
            allowed_roles: rule
                .allowed_roles
                .iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
        }
    }
}

impl AllowedTransitionsResponse {
    pub fn new(
        from: WorkOrderStatus,
        role: Role,
        next_statuses: impl IntoIterator<Item = WorkOrderStatus>,
    ) -> Self {
        Self {
            from: from.as_str().to_owned(),
            role: role.as_str().to_owned(),
            next_statuses: next_statuses
                .into_iter()
                .map(|status| status.as_str().to_owned())
                .collect(),
        }
    }
}
