use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use cmms_application::{NotificationService, WorkOrderService};
use cmms_domain::Actor;
use cmms_infrastructure::{
    InMemoryNotificationRepository, InMemoryUserDirectory, InMemoryWorkOrderRepository,
};

use crate::dev_seed;
use crate::dto::{
    AssignWorkOrderRequest, CompleteWorkOrderRequest, CreateWorkOrderRequest,
    ExpectedVersionQuery, MoveWorkOrderRequest, NotificationListQueryRequest,
    RejectWorkOrderRequest,
};
use crate::error::ApiError;
use crate::middleware::{ACTOR_HEADER, resolve_actor};
use crate::state::AppState;

use super::{notifications, work_orders, workflow};

async fn seeded_state() -> AppState {
    let work_order_repository = Arc::new(InMemoryWorkOrderRepository::new());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let inbox = Arc::new(InMemoryNotificationRepository::new());
    assert!(dev_seed::run(directory.as_ref()).await.is_ok());

    AppState {
        work_order_service: WorkOrderService::new(
            work_order_repository,
            directory.clone(),
            inbox.clone(),
        ),
        notification_service: NotificationService::new(inbox),
        directory,
    }
}

async fn actor(state: &AppState, display_name: &str) -> Actor {
    let users = state.directory.list_users().await.unwrap_or_default();
    let Some(user) = users
        .into_iter()
        .find(|user| user.display_name == display_name)
    else {
        panic!("seeded user '{display_name}' should exist");
    };
    user.actor()
}

fn status_of(error: ApiError) -> StatusCode {
    error.into_response().status()
}

async fn create(state: &AppState, requester: &Actor) -> String {
    let result = work_orders::create_work_order_handler(
        State(state.clone()),
        Extension(requester.clone()),
        Json(CreateWorkOrderRequest {
            title: "Conveyor belt slipping".to_owned(),
            description: Some("Belt slips under load".to_owned()),
            asset_name: Some("Conveyor 4".to_owned()),
            location: Some("Hall B".to_owned()),
            priority: Some("high".to_owned()),
            due_date: None,
        }),
    )
    .await;
    let Ok((status, Json(outcome))) = result else {
        panic!("requester should be able to create a work order");
    };
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome.work_order.status, "open");
    outcome.work_order.work_order_id
}

async fn assign_to(state: &AppState, work_order_id: &str, technician: &Actor) {
    let admin = actor(state, "Ada Admin").await;
    let result = work_orders::assign_work_order_handler(
        State(state.clone()),
        Extension(admin),
        Path(work_order_id.to_owned()),
        Json(AssignWorkOrderRequest {
            technician_id: technician.user_id().to_string(),
            expected_version: Some(1),
        }),
    )
    .await;
    let Ok(Json(outcome)) = result else {
        panic!("admin should be able to assign");
    };
    assert_eq!(outcome.work_order.status, "in_progress");
}

#[tokio::test]
async fn actor_resolution_uses_directory_role() {
    let state = seeded_state().await;
    let alice = actor(&state, "Alice Tech").await;

    let mut headers = HeaderMap::new();
    let Ok(value) = HeaderValue::from_str(alice.user_id().to_string().as_str()) else {
        panic!("user id should be a valid header value");
    };
    headers.insert(ACTOR_HEADER, value);

    let resolved = resolve_actor(&state, &headers).await;
    let Ok(resolved) = resolved else {
        panic!("known user should resolve");
    };
    assert_eq!(resolved, alice);
}

#[tokio::test]
async fn missing_or_unknown_actor_is_unauthorized() {
    let state = seeded_state().await;

    let missing = resolve_actor(&state, &HeaderMap::new()).await;
    let Err(missing) = missing else {
        panic!("missing header should fail");
    };
    assert_eq!(status_of(missing), StatusCode::UNAUTHORIZED);

    let mut headers = HeaderMap::new();
    headers.insert(
        ACTOR_HEADER,
        HeaderValue::from_static("00000000-0000-0000-0000-000000000001"),
    );
    let unknown = resolve_actor(&state, &headers).await;
    let Err(unknown) = unknown else {
        panic!("unknown user should fail");
    };
    assert_eq!(status_of(unknown), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn completion_review_cycle_over_http_handlers() {
    let state = seeded_state().await;
    let rita = actor(&state, "Rita Requester").await;
    let alice = actor(&state, "Alice Tech").await;
    let hank = actor(&state, "Hank Head").await;

    let work_order_id = create(&state, &rita).await;
    assign_to(&state, &work_order_id, &alice).await;

    let completed = work_orders::complete_work_order_handler(
        State(state.clone()),
        Extension(alice.clone()),
        Path(work_order_id.clone()),
        Json(CompleteWorkOrderRequest {
            notes: Some("Belt re-tensioned".to_owned()),
            expected_version: None,
        }),
    )
    .await;
    let Ok(Json(completed)) = completed else {
        panic!("assigned technician should submit completion");
    };
    assert_eq!(completed.work_order.status, "pending");
    assert_eq!(completed.notifications.len(), 1);
    assert_eq!(completed.notifications[0].recipient.display_name, "Hank Head");

    let without_reason = work_orders::reject_work_order_handler(
        State(state.clone()),
        Extension(hank.clone()),
        Path(work_order_id.clone()),
        Json(RejectWorkOrderRequest::default()),
    )
    .await;
    let Err(without_reason) = without_reason else {
        panic!("rejection without reason should fail");
    };
    assert_eq!(status_of(without_reason), StatusCode::PRECONDITION_REQUIRED);

    let rejected = work_orders::reject_work_order_handler(
        State(state.clone()),
        Extension(hank),
        Path(work_order_id.clone()),
        Json(RejectWorkOrderRequest {
            reason: Some("Belt still squeals".to_owned()),
            expected_version: None,
        }),
    )
    .await;
    let Ok(Json(rejected)) = rejected else {
        panic!("reviewer should reject with a reason");
    };
    assert_eq!(rejected.work_order.status, "in_progress");
    assert_eq!(
        rejected.work_order.rejection_reason.as_deref(),
        Some("Belt still squeals")
    );
}

#[tokio::test]
async fn technician_cannot_close_and_gets_workflow_violation() {
    let state = seeded_state().await;
    let rita = actor(&state, "Rita Requester").await;
    let alice = actor(&state, "Alice Tech").await;

    let work_order_id = create(&state, &rita).await;
    assign_to(&state, &work_order_id, &alice).await;

    let closed = work_orders::close_work_order_handler(
        State(state.clone()),
        Extension(alice),
        Path(work_order_id),
        Query(ExpectedVersionQuery::default()),
    )
    .await;
    let Err(closed) = closed else {
        panic!("technician should not close");
    };
    assert_eq!(status_of(closed), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn other_technician_is_forbidden_and_stale_version_conflicts() {
    let state = seeded_state().await;
    let rita = actor(&state, "Rita Requester").await;
    let alice = actor(&state, "Alice Tech").await;
    let bob = actor(&state, "Bob Tech").await;

    let work_order_id = create(&state, &rita).await;
    assign_to(&state, &work_order_id, &alice).await;

    let by_bob = work_orders::complete_work_order_handler(
        State(state.clone()),
        Extension(bob),
        Path(work_order_id.clone()),
        Json(CompleteWorkOrderRequest::default()),
    )
    .await;
    let Err(by_bob) = by_bob else {
        panic!("unassigned technician should be denied");
    };
    assert_eq!(status_of(by_bob), StatusCode::FORBIDDEN);

    let stale = work_orders::complete_work_order_handler(
        State(state.clone()),
        Extension(alice),
        Path(work_order_id),
        Json(CompleteWorkOrderRequest {
            notes: None,
            expected_version: Some(1),
        }),
    )
    .await;
    let Err(stale) = stale else {
        panic!("stale version should conflict");
    };
    assert_eq!(status_of(stale), StatusCode::CONFLICT);
}

#[tokio::test]
async fn board_move_back_requires_reason() {
    let state = seeded_state().await;
    let rita = actor(&state, "Rita Requester").await;
    let alice = actor(&state, "Alice Tech").await;
    let ada = actor(&state, "Ada Admin").await;

    let work_order_id = create(&state, &rita).await;
    assign_to(&state, &work_order_id, &alice).await;

    let submitted = work_orders::move_work_order_handler(
        State(state.clone()),
        Extension(alice),
        Path(work_order_id.clone()),
        Json(MoveWorkOrderRequest {
            status: "pending".to_owned(),
            technician_id: None,
            reason: None,
            expected_version: None,
        }),
    )
    .await;
    assert!(submitted.is_ok());

    let dragged_back = work_orders::move_work_order_handler(
        State(state.clone()),
        Extension(ada),
        Path(work_order_id),
        Json(MoveWorkOrderRequest {
            status: "in_progress".to_owned(),
            technician_id: None,
            reason: Some("   ".to_owned()),
            expected_version: None,
        }),
    )
    .await;
    let Err(dragged_back) = dragged_back else {
        panic!("drag back without reason should fail");
    };
    assert_eq!(status_of(dragged_back), StatusCode::PRECONDITION_REQUIRED);
}

#[tokio::test]
async fn creation_lands_in_admin_inbox() {
    let state = seeded_state().await;
    let rita = actor(&state, "Rita Requester").await;
    let ada = actor(&state, "Ada Admin").await;
    create(&state, &rita).await;

    let inbox = notifications::list_notifications_handler(
        State(state.clone()),
        Extension(ada.clone()),
        Query(NotificationListQueryRequest {
            unread_only: Some(true),
            ..NotificationListQueryRequest::default()
        }),
    )
    .await;
    let Ok(Json(inbox)) = inbox else {
        panic!("inbox should list");
    };
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].notification_type, "wo_created");

    let marked =
        notifications::mark_all_read_handler(State(state.clone()), Extension(ada.clone())).await;
    assert!(matches!(marked, Ok(Json(ref value)) if value.affected == 1));

    let unread = notifications::unread_count_handler(State(state), Extension(ada)).await;
    assert!(matches!(unread, Ok(Json(ref value)) if value.unread_count == 0));
}

#[tokio::test]
async fn allowed_transitions_depend_on_role() {
    let state = seeded_state().await;
    let ada = actor(&state, "Ada Admin").await;
    let rita = actor(&state, "Rita Requester").await;

    let for_admin =
        workflow::allowed_transitions_handler(Extension(ada), Path("pending".to_owned())).await;
    let Ok(Json(for_admin)) = for_admin else {
        panic!("known status should resolve");
    };
    assert!(for_admin.next_statuses.contains(&"completed".to_owned()));

    let for_requester =
        workflow::allowed_transitions_handler(Extension(rita), Path("pending".to_owned())).await;
    let Ok(Json(for_requester)) = for_requester else {
        panic!("known status should resolve");
    };
    assert!(for_requester.next_statuses.is_empty());

    let admin = actor(&state, "Ada Admin").await;
    let unknown =
        workflow::allowed_transitions_handler(Extension(admin), Path("done".to_owned())).await;
    let Err(unknown) = unknown else {
        panic!("unknown status should fail");
    };
    assert_eq!(status_of(unknown), StatusCode::BAD_REQUEST);
}
