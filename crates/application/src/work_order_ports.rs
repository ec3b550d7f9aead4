use async_trait::async_trait;
use chrono::NaiveDate;
use cmms_core::AppResult;
use cmms_domain::{
    Notification, UserId, WorkOrder, WorkOrderId, WorkOrderPermissions, WorkOrderRevision,
    WorkOrderStatus,
};

/// Default page size for work order listings.
pub const DEFAULT_WORK_ORDER_PAGE_SIZE: usize = 50;

/// Largest page size accepted for work order listings.
pub const MAX_WORK_ORDER_PAGE_SIZE: usize = 200;

/// Filters for listing work orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderListQuery {
    /// Only work orders in this status.
    pub status: Option<WorkOrderStatus>,
    /// Only work orders assigned to this user.
    pub assigned_to: Option<UserId>,
    /// Only work orders raised by this user.
    pub requested_by: Option<UserId>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Rows skipped before the page starts.
    pub offset: usize,
}

impl Default for WorkOrderListQuery {
    fn default() -> Self {
        Self {
            status: None,
            assigned_to: None,
            requested_by: None,
            limit: DEFAULT_WORK_ORDER_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl WorkOrderListQuery {
    /// Returns whether a work order passes every filter. Paging is not applied.
    #[must_use]
    pub fn matches(&self, work_order: &WorkOrder) -> bool {
        self.status.is_none_or(|status| work_order.status() == status)
            && self.assigned_to.is_none_or(|user_id| {
                work_order
                    .assigned_to()
                    .is_some_and(|assignee| assignee.user_id == user_id)
            })
            && self
                .requested_by
                .is_none_or(|user_id| work_order.requested_by().user_id == user_id)
    }
}

/// Repository port for work orders.
///
/// Writes carry the revision read before the change; an adapter must refuse
/// the write with `AppError::Conflict` when the stored status or version no
/// longer matches.
#[async_trait]
pub trait WorkOrderRepository: Send + Sync {
    /// Stores a newly created work order.
    async fn insert_work_order(&self, work_order: &WorkOrder) -> AppResult<()>;

    /// Returns one work order by id.
    async fn find_work_order(&self, work_order_id: WorkOrderId) -> AppResult<Option<WorkOrder>>;

    /// Lists work orders ordered by creation time, newest first.
    async fn list_work_orders(&self, query: WorkOrderListQuery) -> AppResult<Vec<WorkOrder>>;

    /// Lists work orders with a due date inside `[from, to]`.
    async fn list_due_between(&self, from: NaiveDate, to: NaiveDate)
    -> AppResult<Vec<WorkOrder>>;

    /// Replaces a work order if it still matches `expected`.
    async fn update_work_order(
        &self,
        work_order: &WorkOrder,
        expected: WorkOrderRevision,
    ) -> AppResult<()>;

    /// Deletes a work order if it still matches `expected`.
    async fn delete_work_order(
        &self,
        work_order_id: WorkOrderId,
        expected: WorkOrderRevision,
    ) -> AppResult<()>;
}

/// Result of a workflow action: the new state plus the notifications it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    /// Work order after the action.
    pub work_order: WorkOrder,
    /// Notifications produced by the action.
    pub notifications: Vec<Notification>,
    /// Number of notifications whose delivery failed.
    pub failed_deliveries: usize,
}

/// What an actor may do to one work order right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderCapabilities {
    /// Current status.
    pub status: WorkOrderStatus,
    /// Current version, for optimistic writes.
    pub version: u32,
    /// Resolved permission set.
    pub permissions: WorkOrderPermissions,
    /// Statuses the actor may move the work order to.
    pub next_statuses: Vec<WorkOrderStatus>,
}
