//! Work order lifecycle states and the role-gated transition table.
//!
//! The table is the single source of truth for both "may this move happen"
//! and "where may this role move a work order from here". Every other
//! component consults it instead of re-encoding rules.

use std::collections::BTreeSet;
use std::str::FromStr;

use cmms_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{Role, WorkflowError};

/// Lifecycle stage of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Requested, not yet assigned.
    Open,
    /// Assigned and being worked.
    InProgress,
    /// Marked done by the technician, awaiting review.
    Pending,
    /// Approved by a reviewer.
    Completed,
    /// Finally closed. Terminal.
    Closed,
    /// Canceled before assignment. Terminal.
    Canceled,
}

impl WorkOrderStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Closed => "closed",
            Self::Canceled => "canceled",
        }
    }

    /// Returns all known statuses in lifecycle order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[WorkOrderStatus] = &[
            WorkOrderStatus::Open,
            WorkOrderStatus::InProgress,
            WorkOrderStatus::Pending,
            WorkOrderStatus::Completed,
            WorkOrderStatus::Closed,
            WorkOrderStatus::Canceled,
        ];

        ALL
    }

    /// Returns whether no outbound transitions exist from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Canceled)
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "closed" => Ok(Self::Closed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(AppError::Validation(format!(
                "unknown work order status '{value}'"
            ))),
        }
    }
}

/// One legal `(from, to)` move and the roles allowed to perform it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Source status.
    pub from: WorkOrderStatus,
    /// Target status.
    pub to: WorkOrderStatus,
    /// Roles allowed to perform the move; any listed role qualifies.
    pub allowed_roles: &'static [Role],
}

impl TransitionRule {
    /// Returns whether the role may perform this move.
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

const TRANSITION_RULES: &[TransitionRule] = &[
    // Initial insert of a new request.
    TransitionRule {
        from: WorkOrderStatus::Open,
        to: WorkOrderStatus::Open,
        allowed_roles: &[Role::Requester, Role::Admin],
    },
    TransitionRule {
        from: WorkOrderStatus::Open,
        to: WorkOrderStatus::InProgress,
        allowed_roles: &[Role::Admin],
    },
    TransitionRule {
        from: WorkOrderStatus::InProgress,
        to: WorkOrderStatus::Pending,
        allowed_roles: &[Role::Technician, Role::Admin],
    },
    // Reviewer sends work back.
    TransitionRule {
        from: WorkOrderStatus::Pending,
        to: WorkOrderStatus::InProgress,
        allowed_roles: &[Role::HeadTechnician, Role::Admin],
    },
    TransitionRule {
        from: WorkOrderStatus::Pending,
        to: WorkOrderStatus::Completed,
        allowed_roles: &[Role::HeadTechnician, Role::Admin],
    },
    TransitionRule {
        from: WorkOrderStatus::Completed,
        to: WorkOrderStatus::Closed,
        allowed_roles: &[Role::Admin],
    },
    // Reopen for correction.
    TransitionRule {
        from: WorkOrderStatus::Completed,
        to: WorkOrderStatus::InProgress,
        allowed_roles: &[Role::Admin],
    },
    TransitionRule {
        from: WorkOrderStatus::Open,
        to: WorkOrderStatus::Canceled,
        allowed_roles: &[Role::Admin],
    },
];

/// Returns the complete static rule set.
#[must_use]
pub fn transition_rules() -> &'static [TransitionRule] {
    TRANSITION_RULES
}

/// Returns true iff some rule matches all of `from`, `to` and `role`.
#[must_use]
pub fn is_transition_allowed(from: WorkOrderStatus, to: WorkOrderStatus, role: Role) -> bool {
    TRANSITION_RULES
        .iter()
        .any(|rule| rule.from == from && rule.to == to && rule.allows(role))
}

/// Returns every status reachable from `from` under `role`.
#[must_use]
pub fn allowed_next_statuses(from: WorkOrderStatus, role: Role) -> BTreeSet<WorkOrderStatus> {
    TRANSITION_RULES
        .iter()
        .filter(|rule| rule.from == from && rule.allows(role))
        .map(|rule| rule.to)
        .collect()
}

/// Gate every status change must pass before it is persisted.
pub fn validate_transition(
    from: WorkOrderStatus,
    to: WorkOrderStatus,
    role: Role,
) -> Result<(), WorkflowError> {
    if is_transition_allowed(from, to, role) {
        return Ok(());
    }

    Err(WorkflowError::Violation { from, to, role })
}
