use cmms_core::AppResult;
use cmms_domain::{
    Actor, RejectionReason, UserId, WorkOrderCommand, WorkOrderId, WorkOrderStatus,
};

use super::{WorkOrderService, ensure_permitted};
use crate::work_order_ports::WorkflowOutcome;

impl WorkOrderService {
    /// Assigns a technician, moving `Open` work to `InProgress`.
    pub async fn assign(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        technician_id: UserId,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        let technician = self.resolve_technician(technician_id).await?;
        self.execute(
            actor,
            work_order_id,
            WorkOrderCommand::Assign { technician },
            expected_version,
        )
        .await
    }

    /// Submits finished work for review.
    pub async fn submit_completion(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        notes: Option<String>,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        self.execute(
            actor,
            work_order_id,
            WorkOrderCommand::SubmitCompletion { notes },
            expected_version,
        )
        .await
    }

    /// Approves reviewed work.
    pub async fn approve(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        review_notes: Option<String>,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        self.execute(
            actor,
            work_order_id,
            WorkOrderCommand::Approve { review_notes },
            expected_version,
        )
        .await
    }

    /// Sends reviewed work back to the technician.
    ///
    /// A blank reason fails before the work order is even loaded.
    pub async fn reject(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        reason: &str,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        let reason = RejectionReason::new(reason)?;
        self.execute(
            actor,
            work_order_id,
            WorkOrderCommand::Reject { reason },
            expected_version,
        )
        .await
    }

    /// Closes approved work.
    pub async fn close(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        self.execute(actor, work_order_id, WorkOrderCommand::Close, expected_version)
            .await
    }

    /// Reopens approved work for correction.
    pub async fn reopen(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        self.execute(actor, work_order_id, WorkOrderCommand::Reopen, expected_version)
            .await
    }

    /// Cancels unassigned work.
    pub async fn cancel(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        self.execute(actor, work_order_id, WorkOrderCommand::Cancel, expected_version)
            .await
    }

    /// Moves a work order to `to`, inferring the action from the current status.
    ///
    /// Used by board drag-and-drop. Moving into `InProgress` from `Open` needs a
    /// technician; moving back from review needs a reason.
    pub async fn move_to_status(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        to: WorkOrderStatus,
        technician_id: Option<UserId>,
        reason: Option<String>,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        let current = self.load(work_order_id).await?;
        let assigning = current.status() == WorkOrderStatus::Open && to == WorkOrderStatus::InProgress;
        ensure_permitted(actor, &current, assigning, "move")?;

        let technician = match technician_id {
            Some(technician_id) if current.status() == WorkOrderStatus::Open => {
                Some(self.resolve_technician(technician_id).await?)
            }
            _ => None,
        };

        let command =
            WorkOrderCommand::for_transition(current.status(), to, actor.role(), technician, reason)?;
        self.execute(actor, work_order_id, command, expected_version)
            .await
    }
}
