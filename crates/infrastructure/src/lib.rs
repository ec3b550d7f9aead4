//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod fan_out_notification_delivery;
mod in_memory_notification_repository;
mod in_memory_user_directory;
mod in_memory_work_order_repository;
mod postgres_notification_repository;
mod postgres_user_directory;
mod postgres_work_order_repository;
mod webhook_notification_delivery;

pub use fan_out_notification_delivery::FanOutNotificationDelivery;
pub use in_memory_notification_repository::InMemoryNotificationRepository;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use in_memory_work_order_repository::InMemoryWorkOrderRepository;
pub use postgres_notification_repository::PostgresNotificationRepository;
pub use postgres_user_directory::PostgresUserDirectory;
pub use postgres_work_order_repository::PostgresWorkOrderRepository;
pub use webhook_notification_delivery::WebhookNotificationDelivery;
