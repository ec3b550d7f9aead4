use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use cmms_application::{WorkOrderListQuery, WorkOrderRepository};
use cmms_core::{AppError, AppResult};
use cmms_domain::{WorkOrder, WorkOrderId, WorkOrderRevision};
use tokio::sync::RwLock;

/// In-memory work order repository with compare-and-swap writes.
#[derive(Debug, Default)]
pub struct InMemoryWorkOrderRepository {
    work_orders: RwLock<HashMap<WorkOrderId, WorkOrder>>,
}

impl InMemoryWorkOrderRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            work_orders: RwLock::new(HashMap::new()),
        }
    }
}

fn ensure_revision(stored: &WorkOrder, expected: WorkOrderRevision) -> AppResult<()> {
    if stored.revision() == expected {
        return Ok(());
    }

    Err(AppError::Conflict(format!(
        "work order '{}' was changed concurrently: expected {} at version {}, found {} at version {}",
        stored.id(),
        expected.status,
        expected.version,
        stored.status(),
        stored.version()
    )))
}

fn newest_first(values: &mut [WorkOrder]) {
    values.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
}

#[async_trait]
impl WorkOrderRepository for InMemoryWorkOrderRepository {
    async fn insert_work_order(&self, work_order: &WorkOrder) -> AppResult<()> {
        let mut work_orders = self.work_orders.write().await;
        if work_orders.contains_key(&work_order.id()) {
            return Err(AppError::Conflict(format!(
                "work order '{}' already exists",
                work_order.id()
            )));
        }

        work_orders.insert(work_order.id(), work_order.clone());
        Ok(())
    }

    async fn find_work_order(&self, work_order_id: WorkOrderId) -> AppResult<Option<WorkOrder>> {
        Ok(self.work_orders.read().await.get(&work_order_id).cloned())
    }

    async fn list_work_orders(&self, query: WorkOrderListQuery) -> AppResult<Vec<WorkOrder>> {
        let mut values: Vec<WorkOrder> = self
            .work_orders
            .read()
            .await
            .values()
            .filter(|work_order| query.matches(work_order))
            .cloned()
            .collect();
        newest_first(&mut values);

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn list_due_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<WorkOrder>> {
        let mut values: Vec<WorkOrder> = self
            .work_orders
            .read()
            .await
            .values()
            .filter(|work_order| {
                work_order
                    .due_date()
                    .is_some_and(|due_date| due_date >= from && due_date <= to)
            })
            .cloned()
            .collect();
        values.sort_by_key(|work_order| (work_order.due_date(), work_order.id()));

        Ok(values)
    }

    async fn update_work_order(
        &self,
        work_order: &WorkOrder,
        expected: WorkOrderRevision,
    ) -> AppResult<()> {
        let mut work_orders = self.work_orders.write().await;
        let stored = work_orders.get(&work_order.id()).ok_or_else(|| {
            AppError::NotFound(format!("work order '{}' does not exist", work_order.id()))
        })?;
        ensure_revision(stored, expected)?;

        work_orders.insert(work_order.id(), work_order.clone());
        Ok(())
    }

    async fn delete_work_order(
        &self,
        work_order_id: WorkOrderId,
        expected: WorkOrderRevision,
    ) -> AppResult<()> {
        let mut work_orders = self.work_orders.write().await;
        let stored = work_orders.get(&work_order_id).ok_or_else(|| {
            AppError::NotFound(format!("work order '{work_order_id}' does not exist"))
        })?;
        ensure_revision(stored, expected)?;

        work_orders.remove(&work_order_id);
        Ok(())
    }
}
