use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dto::common::UserRefResponse;
use crate::dto::notifications::NotificationResponse;

/// Work order listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct WorkOrderListQueryRequest {
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub requested_by: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Optimistic concurrency guard for body-less mutations.
#[derive(Debug, Default, Deserialize)]
pub struct ExpectedVersionQuery {
    pub expected_version: Option<u32>,
}

/// Incoming payload for raising a work order.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-work-order-request.ts"
)]
pub struct CreateWorkOrderRequest {
    pub title: String,
    pub description: Option<String>,
    pub asset_name: Option<String>,
    pub location: Option<String>,
    pub priority: Option<String>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
}

/// Incoming payload for editing descriptive fields.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-work-order-request.ts"
)]
pub struct UpdateWorkOrderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub asset_name: Option<String>,
    pub location: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub expected_version: Option<u32>,
}

/// Incoming payload for assigning a technician.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-work-order-request.ts"
)]
pub struct AssignWorkOrderRequest {
    pub technician_id: String,
    pub expected_version: Option<u32>,
}

/// Incoming payload for submitting completed work.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/complete-work-order-request.ts"
)]
pub struct CompleteWorkOrderRequest {
    pub notes: Option<String>,
    pub expected_version: Option<u32>,
}

/// Incoming payload for approving completed work.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/approve-work-order-request.ts"
)]
pub struct ApproveWorkOrderRequest {
    pub review_notes: Option<String>,
    pub expected_version: Option<u32>,
}

/// Incoming payload for sending work back for revision.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/reject-work-order-request.ts"
)]
pub struct RejectWorkOrderRequest {
    pub reason: Option<String>,
    pub expected_version: Option<u32>,
}

/// Incoming payload for a board drag-and-drop move.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/move-work-order-request.ts"
)]
pub struct MoveWorkOrderRequest {
    pub status: String,
    pub technician_id: Option<String>,
    pub reason: Option<String>,
    pub expected_version: Option<u32>,
}

/// API representation of a work order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/work-order-response.ts"
)]
pub struct WorkOrderResponse {
    pub work_order_id: String,
    pub title: String,
    pub description: Option<String>,
    pub asset_name: Option<String>,
    pub location: Option<String>,
    pub priority: String,
    pub status: String,
    pub requested_by: UserRefResponse,
    pub assigned_to: Option<UserRefResponse>,
    pub managed_by: Option<UserRefResponse>,
    pub due_date: Option<String>,
    pub technician_notes: Option<String>,
    pub review_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub version: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Actions the caller may take on one work order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/work-order-permissions-response.ts"
)]
pub struct WorkOrderPermissionsResponse {
    pub can_edit: bool,
    pub can_change_status: bool,
    pub can_assign: bool,
    pub can_delete: bool,
    pub can_view: bool,
}

/// Permission set plus next statuses for the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/work-order-capabilities-response.ts"
)]
pub struct WorkOrderCapabilitiesResponse {
    pub status: String,
    pub version: u32,
    pub permissions: WorkOrderPermissionsResponse,
    pub next_statuses: Vec<String>,
}

/// Result of a workflow action.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/workflow-outcome-response.ts"
)]
pub struct WorkflowOutcomeResponse {
    pub work_order: WorkOrderResponse,
    pub notifications: Vec<NotificationResponse>,
    pub failed_deliveries: usize,
}
