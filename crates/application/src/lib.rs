//! Application services and ports.

#![forbid(unsafe_code)]

mod directory_ports;
mod notification_ports;
mod notification_service;
mod reminder_service;
mod work_order_ports;
mod work_order_service;

#[cfg(test)]
mod test_fakes;

pub use directory_ports::{DirectoryUser, UserDirectory};
pub use notification_ports::{
    DEFAULT_NOTIFICATION_PAGE_SIZE, MAX_NOTIFICATION_PAGE_SIZE, NotificationDelivery,
    NotificationListQuery, NotificationRecipient, NotificationRepository,
};
pub use notification_service::NotificationService;
pub use reminder_service::{ReminderRunSummary, ReminderService};
pub use work_order_ports::{
    DEFAULT_WORK_ORDER_PAGE_SIZE, MAX_WORK_ORDER_PAGE_SIZE, WorkOrderCapabilities,
    WorkOrderListQuery, WorkOrderRepository, WorkflowOutcome,
};
pub use work_order_service::WorkOrderService;
