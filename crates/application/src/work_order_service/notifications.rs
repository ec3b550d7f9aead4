use chrono::{DateTime, Utc};
use cmms_core::AppResult;
use cmms_domain::{
    Actor, Notification, Role, UserRef, WorkOrder, WorkOrderCommand, WorkOrderEvent,
    completion_reviewers,
};

use super::WorkOrderService;

impl WorkOrderService {
    async fn users_with_role(&self, role: Role) -> AppResult<Vec<UserRef>> {
        Ok(self
            .directory
            .list_users_with_role(role)
            .await?
            .iter()
            .map(|user| user.user_ref())
            .collect())
    }

    pub(super) async fn creation_notifications(
        &self,
        work_order: &WorkOrder,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let admins = self.users_with_role(Role::Admin).await?;
        let triggered_by = actor.user_ref();
        Ok(WorkOrderEvent::new(work_order, &triggered_by, now).created(&admins))
    }

    /// Resolves recipients for a completed command and builds its notifications.
    pub(super) async fn notifications_for(
        &self,
        work_order: &WorkOrder,
        command: &WorkOrderCommand,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let triggered_by = actor.user_ref();
        let event = WorkOrderEvent::new(work_order, &triggered_by, now);

        let notifications = match command {
            WorkOrderCommand::Assign { .. } => event.assigned(),
            WorkOrderCommand::SubmitCompletion { .. } => {
                let supervisor = match work_order.assigned_to() {
                    Some(technician) => self
                        .directory
                        .find_supervisor(technician.user_id)
                        .await?
                        .filter(|supervisor| supervisor.role == Role::HeadTechnician)
                        .map(|supervisor| supervisor.user_ref()),
                    None => None,
                };
                let head_technicians = match supervisor {
                    Some(_) => Vec::new(),
                    None => self.users_with_role(Role::HeadTechnician).await?,
                };
                event.completed(&completion_reviewers(supervisor, head_technicians))
            }
            WorkOrderCommand::Approve { .. } => {
                let admins = match work_order.managed_by() {
                    Some(_) => Vec::new(),
                    None => self.users_with_role(Role::Admin).await?,
                };
                let mut notifications = event.approved();
                notifications.extend(event.ready_to_close(&admins));
                notifications
            }
            WorkOrderCommand::Reject { reason } => event.rejected(reason),
            WorkOrderCommand::Close => event.closed(),
            WorkOrderCommand::Cancel => event.canceled(),
            WorkOrderCommand::Reopen => Vec::new(),
        };

        Ok(notifications)
    }
}
