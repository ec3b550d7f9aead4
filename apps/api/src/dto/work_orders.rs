mod conversions;
mod types;

pub use types::{
    ApproveWorkOrderRequest, AssignWorkOrderRequest, CompleteWorkOrderRequest,
    CreateWorkOrderRequest, ExpectedVersionQuery, MoveWorkOrderRequest, RejectWorkOrderRequest,
    UpdateWorkOrderRequest, WorkOrderCapabilitiesResponse, WorkOrderListQueryRequest,
    WorkOrderPermissionsResponse, WorkOrderResponse, WorkflowOutcomeResponse,
};
