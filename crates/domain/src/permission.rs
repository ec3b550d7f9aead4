use serde::{Deserialize, Serialize};

use crate::{Role, UserId, WorkOrderStatus};

/// Derived capabilities of one actor against one work order's current state.
///
/// Never persisted; recomputed on demand by [`resolve_permissions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkOrderPermissions {
    /// May edit descriptive fields.
    pub can_edit: bool,
    /// May request a status change.
    pub can_change_status: bool,
    /// May assign a technician.
    pub can_assign: bool,
    /// May delete the work order.
    pub can_delete: bool,
    /// May read the work order.
    pub can_view: bool,
}

/// Resolves what `actor` with `role` may currently do to a work order.
///
/// Pure over its four inputs. A Technician only gains rights on work orders
/// assigned to them; an unassigned work order grants a Technician nothing.
#[must_use]
pub fn resolve_permissions(
    status: WorkOrderStatus,
    role: Role,
    assigned_to: Option<UserId>,
    actor: UserId,
) -> WorkOrderPermissions {
    match role {
        Role::Admin => WorkOrderPermissions {
            can_edit: status != WorkOrderStatus::Closed,
            can_change_status: true,
            can_assign: true,
            can_delete: status == WorkOrderStatus::Open,
            can_view: true,
        },
        Role::HeadTechnician => {
            let reviewing = status == WorkOrderStatus::Pending;
            WorkOrderPermissions {
                can_edit: reviewing,
                can_change_status: reviewing,
                can_assign: false,
                can_delete: false,
                can_view: true,
            }
        }
        Role::Requester => WorkOrderPermissions {
            can_edit: status == WorkOrderStatus::Open,
            can_change_status: false,
            can_assign: false,
            can_delete: status == WorkOrderStatus::Open,
            can_view: true,
        },
        Role::Technician => {
            let working = assigned_to == Some(actor) && status == WorkOrderStatus::InProgress;
            WorkOrderPermissions {
                can_edit: working,
                can_change_status: working,
                can_assign: false,
                can_delete: false,
                can_view: true,
            }
        }
    }
}
