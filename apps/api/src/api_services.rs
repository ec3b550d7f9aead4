mod database;
mod notifications;

use std::sync::Arc;

use cmms_application::{
    NotificationDelivery, NotificationRepository, NotificationService, UserDirectory,
    WorkOrderRepository, WorkOrderService,
};
use cmms_core::AppResult;
use cmms_infrastructure::{
    InMemoryNotificationRepository, InMemoryUserDirectory, InMemoryWorkOrderRepository,
    PostgresNotificationRepository, PostgresUserDirectory, PostgresWorkOrderRepository,
};
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackend};
use crate::state::AppState;

pub use database::connect_and_migrate;

/// Port implementations selected for one storage backend.
struct Adapters {
    work_orders: Arc<dyn WorkOrderRepository>,
    directory: Arc<dyn UserDirectory>,
    inbox: Arc<dyn NotificationRepository>,
    inbox_delivery: Arc<dyn NotificationDelivery>,
}

pub async fn build_app_state(config: &ApiConfig) -> AppResult<AppState> {
    let adapters = match &config.storage {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            let inbox = Arc::new(InMemoryNotificationRepository::new());
            Adapters {
                work_orders: Arc::new(InMemoryWorkOrderRepository::new()),
                directory: Arc::new(InMemoryUserDirectory::new()),
                inbox: inbox.clone(),
                inbox_delivery: inbox,
            }
        }
        StorageBackend::Postgres { database_url } => {
            info!("using postgres storage");
            let pool = connect_and_migrate(database_url).await?;
            let inbox = Arc::new(PostgresNotificationRepository::new(pool.clone()));
            Adapters {
                work_orders: Arc::new(PostgresWorkOrderRepository::new(pool.clone())),
                directory: Arc::new(PostgresUserDirectory::new(pool)),
                inbox: inbox.clone(),
                inbox_delivery: inbox,
            }
        }
    };

    let delivery = notifications::build_delivery(adapters.inbox_delivery, config.webhook.as_ref());

    Ok(AppState {
        work_order_service: WorkOrderService::new(
            adapters.work_orders,
            adapters.directory.clone(),
            delivery,
        ),
        notification_service: NotificationService::new(adapters.inbox),
        directory: adapters.directory,
    })
}
