use cmms_core::AppError;
use thiserror::Error;

use crate::{Role, WorkOrderStatus};

/// Workflow rule failures raised before any persistence call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// No transition rule matches the requested move for the role.
    #[error("cannot move from {from} to {to} as {role}")]
    Violation {
        /// Current status.
        from: WorkOrderStatus,
        /// Requested status.
        to: WorkOrderStatus,
        /// Role of the actor requesting the move.
        role: Role,
    },

    /// A reject action was requested without a usable reason.
    #[error("a rejection reason is required to send work back")]
    MissingRejectionReason,
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        match value {
            WorkflowError::Violation { .. } => Self::WorkflowViolation(value.to_string()),
            WorkflowError::MissingRejectionReason => Self::PreconditionFailed(value.to_string()),
        }
    }
}
