mod common;
mod notifications;
mod work_orders;
mod workflow;

pub use common::{ActorResponse, HealthResponse, UserRefResponse};
pub use notifications::{
    BulkNotificationUpdateResponse, NotificationListQueryRequest, NotificationResponse,
    UnreadCountResponse,
};
pub use work_orders::{
    ApproveWorkOrderRequest, AssignWorkOrderRequest, CompleteWorkOrderRequest,
    CreateWorkOrderRequest, ExpectedVersionQuery, MoveWorkOrderRequest, RejectWorkOrderRequest,
    UpdateWorkOrderRequest, WorkOrderCapabilitiesResponse, WorkOrderListQueryRequest,
    WorkOrderPermissionsResponse, WorkOrderResponse, WorkflowOutcomeResponse,
};
pub use workflow::{AllowedTransitionsResponse, TransitionRuleResponse};

#[cfg(test)]
mod tests {
    use super::{
        ActorResponse, AllowedTransitionsResponse, ApproveWorkOrderRequest,
        AssignWorkOrderRequest, BulkNotificationUpdateResponse, CompleteWorkOrderRequest,
        CreateWorkOrderRequest, HealthResponse, MoveWorkOrderRequest, NotificationResponse,
        RejectWorkOrderRequest, TransitionRuleResponse, UnreadCountResponse,
        UpdateWorkOrderRequest, UserRefResponse, WorkOrderCapabilitiesResponse,
        WorkOrderPermissionsResponse, WorkOrderResponse, WorkflowOutcomeResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        ActorResponse::export(&config)?;
        UserRefResponse::export(&config)?;
        TransitionRuleResponse::export(&config)?;
        AllowedTransitionsResponse::export(&config)?;
        CreateWorkOrderRequest::export(&config)?;
        UpdateWorkOrderRequest::export(&config)?;
        AssignWorkOrderRequest::export(&config)?;
        CompleteWorkOrderRequest::export(&config)?;
        ApproveWorkOrderRequest::export(&config)?;
        RejectWorkOrderRequest::export(&config)?;
        MoveWorkOrderRequest::export(&config)?;
        WorkOrderResponse::export(&config)?;
        WorkOrderPermissionsResponse::export(&config)?;
        WorkOrderCapabilitiesResponse::export(&config)?;
        WorkflowOutcomeResponse::export(&config)?;
        NotificationResponse::export(&config)?;
        UnreadCountResponse::export(&config)?;
        BulkNotificationUpdateResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }
}
