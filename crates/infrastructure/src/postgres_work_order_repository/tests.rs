use chrono::{NaiveDate, Utc};
use cmms_application::{WorkOrderListQuery, WorkOrderRepository};
use cmms_core::AppError;
use cmms_domain::{
    Actor, Role, UserId, UserRef, WorkOrder, WorkOrderCommand, WorkOrderInput, WorkOrderStatus,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresWorkOrderRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres work order tests: {error}");
    }

    Some(pool)
}

fn new_work_order(requester: &Actor, due_date: Option<NaiveDate>) -> WorkOrder {
    let created = WorkOrder::create(
        WorkOrderInput {
            title: "Replace conveyor belt".to_owned(),
            location: Some("Line 2".to_owned()),
            due_date,
            ..WorkOrderInput::default()
        },
        requester,
        Utc::now(),
    );
    let Ok(work_order) = created else {
        panic!("work order should be valid");
    };
    work_order
}

#[tokio::test]
async fn insert_and_find_round_trip_assignment() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresWorkOrderRepository::new(pool);
    let requester = Actor::new(UserId::new(), "Rita", Role::Requester);
    let admin = Actor::new(UserId::new(), "Ada", Role::Admin);
    let technician = UserRef::new(UserId::new(), "Alice");

    let work_order = new_work_order(&requester, None);
    assert!(repository.insert_work_order(&work_order).await.is_ok());

    let Ok(assigned) = work_order.apply(
        &WorkOrderCommand::Assign {
            technician: technician.clone(),
        },
        &admin,
        Utc::now(),
    ) else {
        panic!("admin should be able to assign");
    };
    assert!(
        repository
            .update_work_order(&assigned, work_order.revision())
            .await
            .is_ok()
    );

    let found = repository.find_work_order(work_order.id()).await;
    let Ok(Some(found)) = found else {
        panic!("work order should be stored");
    };
    assert_eq!(found.status(), WorkOrderStatus::InProgress);
    assert_eq!(found.version(), 2);
    assert_eq!(found.assigned_to(), Some(&technician));
    assert_eq!(found.managed_by(), Some(&admin.user_ref()));
    assert_eq!(found.location(), Some("Line 2"));
}

#[tokio::test]
async fn stale_revision_is_a_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresWorkOrderRepository::new(pool);
    let requester = Actor::new(UserId::new(), "Rita", Role::Requester);
    let admin = Actor::new(UserId::new(), "Ada", Role::Admin);

    let work_order = new_work_order(&requester, None);
    assert!(repository.insert_work_order(&work_order).await.is_ok());

    let Ok(canceled) = work_order.apply(&WorkOrderCommand::Cancel, &admin, Utc::now()) else {
        panic!("admin should be able to cancel");
    };
    assert!(
        repository
            .update_work_order(&canceled, work_order.revision())
            .await
            .is_ok()
    );

    let second = repository
        .update_work_order(&canceled, work_order.revision())
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let delete = repository
        .delete_work_order(work_order.id(), work_order.revision())
        .await;
    assert!(matches!(delete, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn missing_row_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresWorkOrderRepository::new(pool);
    let requester = Actor::new(UserId::new(), "Rita", Role::Requester);
    let work_order = new_work_order(&requester, None);

    let result = repository
        .delete_work_order(work_order.id(), work_order.revision())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn listing_filters_by_requester_and_due_window() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresWorkOrderRepository::new(pool);
    let requester = Actor::new(UserId::new(), "Rita", Role::Requester);
    let today = Utc::now().date_naive();

    let soon = new_work_order(&requester, today.checked_add_days(chrono::Days::new(3)));
    let later = new_work_order(&requester, today.checked_add_days(chrono::Days::new(30)));
    assert!(repository.insert_work_order(&soon).await.is_ok());
    assert!(repository.insert_work_order(&later).await.is_ok());

    let mine = repository
        .list_work_orders(WorkOrderListQuery {
            requested_by: Some(requester.user_id()),
            ..WorkOrderListQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(mine.len(), 2);

    let window_end = today
        .checked_add_days(chrono::Days::new(7))
        .unwrap_or(today);
    let due = repository
        .list_due_between(today, window_end)
        .await
        .unwrap_or_default();
    assert!(due.iter().any(|value| value.id() == soon.id()));
    assert!(due.iter().all(|value| value.id() != later.id()));
}
