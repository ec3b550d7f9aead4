use std::sync::Arc;

use cmms_application::{NotificationService, UserDirectory, WorkOrderService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub work_order_service: WorkOrderService,
    pub notification_service: NotificationService,
    pub directory: Arc<dyn UserDirectory>,
}
