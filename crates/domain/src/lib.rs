//! Work order workflow engine: lifecycle states, transition rules,
//! permissions and notification rules.

#![forbid(unsafe_code)]

mod command;
mod error;
mod notification;
mod permission;
mod user;
mod work_order;
mod workflow;

pub use command::{WorkOrderAction, WorkOrderCommand};
pub use error::WorkflowError;
pub use notification::{
    Notification, NotificationId, NotificationType, WorkOrderEvent, completion_reviewers,
    due_reminder,
};
pub use permission::{WorkOrderPermissions, resolve_permissions};
pub use user::{Actor, Role, UserId, UserRef};
pub use work_order::{
    RejectionReason, WorkOrder, WorkOrderDetailsUpdate, WorkOrderId, WorkOrderInput,
    WorkOrderPriority, WorkOrderRevision, WorkOrderState,
};
pub use workflow::{
    TransitionRule, WorkOrderStatus, allowed_next_statuses, is_transition_allowed,
    transition_rules, validate_transition,
};
