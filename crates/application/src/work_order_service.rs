use std::sync::Arc;

use chrono::Utc;
use cmms_core::{AppError, AppResult};
use cmms_domain::{
    Actor, Notification, Role, UserId, UserRef, WorkOrder, WorkOrderCommand, WorkOrderId,
};
use tracing::{info, warn};

use crate::directory_ports::UserDirectory;
use crate::notification_ports::NotificationDelivery;
use crate::work_order_ports::{WorkOrderRepository, WorkflowOutcome};

mod actions;
mod notifications;
mod records;

/// Work order use cases: validate, persist, then notify.
#[derive(Clone)]
pub struct WorkOrderService {
    repository: Arc<dyn WorkOrderRepository>,
    directory: Arc<dyn UserDirectory>,
    delivery: Arc<dyn NotificationDelivery>,
}

impl WorkOrderService {
    /// Creates a work order service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn WorkOrderRepository>,
        directory: Arc<dyn UserDirectory>,
        delivery: Arc<dyn NotificationDelivery>,
    ) -> Self {
        Self {
            repository,
            directory,
            delivery,
        }
    }

    async fn load(&self, work_order_id: WorkOrderId) -> AppResult<WorkOrder> {
        self.repository
            .find_work_order(work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("work order '{work_order_id}' does not exist")))
    }

    async fn resolve_technician(&self, technician_id: UserId) -> AppResult<UserRef> {
        let technician = self
            .directory
            .find_user(technician_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{technician_id}' does not exist")))?;

        if technician.role != Role::Technician {
            return Err(AppError::Validation(format!(
                "user '{}' is a {} and cannot be assigned work",
                technician.display_name, technician.role
            )));
        }

        Ok(technician.user_ref())
    }

    /// Runs one workflow command against the stored work order.
    ///
    /// Order matters: permission gate, transition validation and the
    /// compare-and-swap write all happen before any notification is built.
    async fn execute(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        command: WorkOrderCommand,
        expected_version: Option<u32>,
    ) -> AppResult<WorkflowOutcome> {
        let current = self.load(work_order_id).await?;
        check_expected_version(&current, expected_version)?;

        ensure_permitted(
            actor,
            &current,
            matches!(command, WorkOrderCommand::Assign { .. }),
            command.action().as_str(),
        )?;

        let now = Utc::now();
        let next = current.apply(&command, actor, now)?;
        self.repository
            .update_work_order(&next, current.revision())
            .await?;

        info!(
            work_order_id = %work_order_id,
            action = %command.action(),
            from = %current.status(),
            to = %next.status(),
            actor = %actor.user_id(),
            "work order transition applied"
        );

        let notifications = match self.notifications_for(&next, &command, actor, now).await {
            Ok(notifications) => notifications,
            Err(error) => {
                warn!(
                    work_order_id = %work_order_id,
                    action = %command.action(),
                    error = %error,
                    "failed to resolve notification recipients"
                );
                Vec::new()
            }
        };

        Ok(self.deliver_all(next, notifications).await)
    }

    /// Delivers every notification independently; a failure never blocks the rest.
    async fn deliver_all(
        &self,
        work_order: WorkOrder,
        notifications: Vec<Notification>,
    ) -> WorkflowOutcome {
        let mut failed_deliveries = 0;
        for notification in &notifications {
            if let Err(error) = self.delivery.deliver(notification).await {
                failed_deliveries += 1;
                warn!(
                    notification_id = %notification.notification_id,
                    notification_type = %notification.notification_type,
                    recipient = %notification.recipient.user_id,
                    error = %error,
                    "notification delivery failed"
                );
            }
        }

        WorkflowOutcome {
            work_order,
            notifications,
            failed_deliveries,
        }
    }
}

/// Technician scoping and role windows are enforced here, before the
/// transition table is consulted.
fn ensure_permitted(
    actor: &Actor,
    work_order: &WorkOrder,
    assigning: bool,
    action: &str,
) -> AppResult<()> {
    let permissions = work_order.permissions_for(actor);
    let permitted = if assigning {
        permissions.can_assign
    } else {
        permissions.can_change_status
    };

    if permitted {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "{} '{}' may not {} work order '{}' while it is {}",
        actor.role(),
        actor.display_name(),
        action,
        work_order.id(),
        work_order.status()
    )))
}

fn check_expected_version(work_order: &WorkOrder, expected_version: Option<u32>) -> AppResult<()> {
    match expected_version {
        Some(expected) if expected != work_order.version() => Err(AppError::Conflict(format!(
            "work order '{}' is at version {} but version {} was expected",
            work_order.id(),
            work_order.version(),
            expected
        ))),
        _ => Ok(()),
    }
}
