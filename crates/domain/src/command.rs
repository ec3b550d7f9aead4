use cmms_core::{AppError, AppResult};

use crate::{RejectionReason, Role, UserRef, WorkOrderStatus, validate_transition};

/// Named workflow action carried by a [`WorkOrderCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkOrderAction {
    /// Open to InProgress with a technician.
    Assign,
    /// InProgress to Pending.
    SubmitCompletion,
    /// Pending to Completed.
    Approve,
    /// Pending back to InProgress.
    Reject,
    /// Completed to Closed.
    Close,
    /// Completed back to InProgress.
    Reopen,
    /// Open to Canceled.
    Cancel,
}

impl WorkOrderAction {
    /// Returns a stable name for logs and responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::SubmitCompletion => "submit_completion",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Close => "close",
            Self::Reopen => "reopen",
            Self::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for WorkOrderAction {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A status-changing request against one work order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOrderCommand {
    /// Assign a technician and start the work.
    Assign {
        /// Technician receiving the work.
        technician: UserRef,
    },
    /// Technician reports the work as done.
    SubmitCompletion {
        /// Optional completion notes.
        notes: Option<String>,
    },
    /// Reviewer accepts the work.
    Approve {
        /// Optional review notes.
        review_notes: Option<String>,
    },
    /// Reviewer sends the work back.
    Reject {
        /// Mandatory reason.
        reason: RejectionReason,
    },
    /// Admin closes approved work.
    Close,
    /// Admin reopens approved work for correction.
    Reopen,
    /// Admin cancels unassigned work.
    Cancel,
}

impl WorkOrderCommand {
    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> WorkOrderAction {
        match self {
            Self::Assign { .. } => WorkOrderAction::Assign,
            Self::SubmitCompletion { .. } => WorkOrderAction::SubmitCompletion,
            Self::Approve { .. } => WorkOrderAction::Approve,
            Self::Reject { .. } => WorkOrderAction::Reject,
            Self::Close => WorkOrderAction::Close,
            Self::Reopen => WorkOrderAction::Reopen,
            Self::Cancel => WorkOrderAction::Cancel,
        }
    }

    /// Returns the status the work order lands in.
    #[must_use]
    pub fn target_status(&self) -> WorkOrderStatus {
        match self {
            Self::Assign { .. } | Self::Reject { .. } | Self::Reopen => WorkOrderStatus::InProgress,
            Self::SubmitCompletion { .. } => WorkOrderStatus::Pending,
            Self::Approve { .. } => WorkOrderStatus::Completed,
            Self::Close => WorkOrderStatus::Closed,
            Self::Cancel => WorkOrderStatus::Canceled,
        }
    }

    /// Maps a raw `from -> to` status request onto the action it implies.
    ///
    /// The move is checked against the transition table first. A move back
    /// from review needs a non-blank `reason`; an assignment needs a
    /// `technician`.
    pub fn for_transition(
        from: WorkOrderStatus,
        to: WorkOrderStatus,
        role: Role,
        technician: Option<UserRef>,
        reason: Option<String>,
    ) -> AppResult<Self> {
        validate_transition(from, to, role)?;

        match (from, to) {
            (WorkOrderStatus::Open, WorkOrderStatus::InProgress) => {
                let technician = technician.ok_or_else(|| {
                    AppError::Validation("a technician is required to assign work".to_owned())
                })?;
                Ok(Self::Assign { technician })
            }
            (WorkOrderStatus::InProgress, WorkOrderStatus::Pending) => {
                Ok(Self::SubmitCompletion { notes: None })
            }
            (WorkOrderStatus::Pending, WorkOrderStatus::InProgress) => Ok(Self::Reject {
                reason: RejectionReason::new(reason.unwrap_or_default())?,
            }),
            (WorkOrderStatus::Pending, WorkOrderStatus::Completed) => {
                Ok(Self::Approve { review_notes: None })
            }
            (WorkOrderStatus::Completed, WorkOrderStatus::Closed) => Ok(Self::Close),
            (WorkOrderStatus::Completed, WorkOrderStatus::InProgress) => Ok(Self::Reopen),
            (WorkOrderStatus::Open, WorkOrderStatus::Canceled) => Ok(Self::Cancel),
            _ => Err(AppError::Validation(format!(
                "moving from {from} to {to} is not a status change"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use cmms_core::AppError;

    use super::{WorkOrderAction, WorkOrderCommand};
    use crate::{Role, UserId, UserRef, WorkOrderStatus};

    #[test]
    fn move_back_from_review_is_a_rejection() {
        let command = WorkOrderCommand::for_transition(
            WorkOrderStatus::Pending,
            WorkOrderStatus::InProgress,
            Role::HeadTechnician,
            None,
            Some("missing photos".to_owned()),
        );

        assert!(matches!(
            command,
            Ok(ref value) if value.action() == WorkOrderAction::Reject
        ));
    }

    #[test]
    fn rejection_without_reason_fails_precondition() {
        for reason in [None, Some("   ".to_owned())] {
            let command = WorkOrderCommand::for_transition(
                WorkOrderStatus::Pending,
                WorkOrderStatus::InProgress,
                Role::Admin,
                None,
                reason,
            );
            assert!(matches!(command, Err(AppError::PreconditionFailed(_))));
        }
    }

    #[test]
    fn illegal_move_is_reported_before_reason() {
        let command = WorkOrderCommand::for_transition(
            WorkOrderStatus::Pending,
            WorkOrderStatus::InProgress,
            Role::Technician,
            None,
            None,
        );

        assert!(matches!(command, Err(AppError::WorkflowViolation(_))));
    }

    #[test]
    fn assignment_needs_a_technician() {
        let missing = WorkOrderCommand::for_transition(
            WorkOrderStatus::Open,
            WorkOrderStatus::InProgress,
            Role::Admin,
            None,
            None,
        );
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let technician = UserRef::new(UserId::new(), "Alice");
        let present = WorkOrderCommand::for_transition(
            WorkOrderStatus::Open,
            WorkOrderStatus::InProgress,
            Role::Admin,
            Some(technician.clone()),
            None,
        );
        assert!(matches!(
            present,
            Ok(WorkOrderCommand::Assign { technician: ref assigned }) if *assigned == technician
        ));
    }

    #[test]
    fn creation_self_move_is_not_a_command() {
        let command = WorkOrderCommand::for_transition(
            WorkOrderStatus::Open,
            WorkOrderStatus::Open,
            Role::Admin,
            None,
            None,
        );
        assert!(matches!(command, Err(AppError::Validation(_))));
    }

    #[test]
    fn target_status_matches_action() {
        assert_eq!(WorkOrderCommand::Close.target_status(), WorkOrderStatus::Closed);
        assert_eq!(WorkOrderCommand::Reopen.target_status(), WorkOrderStatus::InProgress);
        assert_eq!(WorkOrderCommand::Cancel.target_status(), WorkOrderStatus::Canceled);
    }
}
