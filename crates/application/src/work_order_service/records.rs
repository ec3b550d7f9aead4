use chrono::Utc;
use cmms_core::{AppError, AppResult};
use cmms_domain::{
    Actor, WorkOrder, WorkOrderDetailsUpdate, WorkOrderId, WorkOrderInput, allowed_next_statuses,
};
use tracing::{info, warn};

use super::{WorkOrderService, check_expected_version};
use crate::work_order_ports::{
    MAX_WORK_ORDER_PAGE_SIZE, WorkOrderCapabilities, WorkOrderListQuery, WorkflowOutcome,
};

impl WorkOrderService {
    /// Raises a new work order and notifies every admin.
    pub async fn create(&self, actor: &Actor, input: WorkOrderInput) -> AppResult<WorkflowOutcome> {
        let now = Utc::now();
        let work_order = WorkOrder::create(input, actor, now)?;
        self.repository.insert_work_order(&work_order).await?;

        info!(
            work_order_id = %work_order.id(),
            actor = %actor.user_id(),
            "work order created"
        );

        let notifications = match self.creation_notifications(&work_order, actor, now).await {
            Ok(notifications) => notifications,
            Err(error) => {
                warn!(
                    work_order_id = %work_order.id(),
                    error = %error,
                    "failed to resolve notification recipients"
                );
                Vec::new()
            }
        };

        Ok(self.deliver_all(work_order, notifications).await)
    }

    /// Returns one work order. Every role may view every work order.
    pub async fn get(&self, _actor: &Actor, work_order_id: WorkOrderId) -> AppResult<WorkOrder> {
        self.load(work_order_id).await
    }

    /// Lists work orders matching `query`.
    pub async fn list(
        &self,
        _actor: &Actor,
        mut query: WorkOrderListQuery,
    ) -> AppResult<Vec<WorkOrder>> {
        if query.limit == 0 {
            return Err(AppError::Validation(
                "limit must be greater than zero".to_owned(),
            ));
        }
        query.limit = query.limit.min(MAX_WORK_ORDER_PAGE_SIZE);

        self.repository.list_work_orders(query).await
    }

    /// Edits descriptive fields. Status and assignment are untouched.
    pub async fn update_details(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        update: WorkOrderDetailsUpdate,
        expected_version: Option<u32>,
    ) -> AppResult<WorkOrder> {
        let current = self.load(work_order_id).await?;
        check_expected_version(&current, expected_version)?;

        if !current.permissions_for(actor).can_edit {
            return Err(AppError::Forbidden(format!(
                "{} '{}' may not edit work order '{}' while it is {}",
                actor.role(),
                actor.display_name(),
                work_order_id,
                current.status()
            )));
        }

        let next = current.with_details(update, Utc::now())?;
        self.repository
            .update_work_order(&next, current.revision())
            .await?;

        Ok(next)
    }

    /// Deletes a work order that has no history yet.
    pub async fn delete(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
        expected_version: Option<u32>,
    ) -> AppResult<()> {
        let current = self.load(work_order_id).await?;
        check_expected_version(&current, expected_version)?;

        if !current.permissions_for(actor).can_delete {
            return Err(AppError::Forbidden(format!(
                "{} '{}' may not delete work order '{}' while it is {}",
                actor.role(),
                actor.display_name(),
                work_order_id,
                current.status()
            )));
        }

        self.repository
            .delete_work_order(work_order_id, current.revision())
            .await?;

        info!(
            work_order_id = %work_order_id,
            actor = %actor.user_id(),
            "work order deleted"
        );

        Ok(())
    }

    /// Returns the actor's permission set and reachable statuses.
    ///
    /// Next statuses exclude the current one and are empty when the actor may
    /// not change status at all.
    pub async fn capabilities(
        &self,
        actor: &Actor,
        work_order_id: WorkOrderId,
    ) -> AppResult<WorkOrderCapabilities> {
        let work_order = self.load(work_order_id).await?;
        let permissions = work_order.permissions_for(actor);

        let next_statuses = if permissions.can_change_status {
            allowed_next_statuses(work_order.status(), actor.role())
                .into_iter()
                .filter(|status| *status != work_order.status())
                .collect()
        } else {
            Vec::new()
        };

        Ok(WorkOrderCapabilities {
            status: work_order.status(),
            version: work_order.version(),
            permissions,
            next_statuses,
        })
    }
}
