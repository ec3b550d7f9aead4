mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use cmms_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/me", get(handlers::health::me_handler))
        .route(
            "/api/workflow/transitions",
            get(handlers::workflow::list_transitions_handler),
        )
        .route(
            "/api/workflow/transitions/{status}",
            get(handlers::workflow::allowed_transitions_handler),
        )
        .route(
            "/api/work-orders",
            get(handlers::work_orders::list_work_orders_handler)
                .post(handlers::work_orders::create_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}",
            get(handlers::work_orders::get_work_order_handler)
                .put(handlers::work_orders::update_work_order_handler)
                .delete(handlers::work_orders::delete_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/capabilities",
            get(handlers::work_orders::work_order_capabilities_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/assign",
            post(handlers::work_orders::assign_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/complete",
            post(handlers::work_orders::complete_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/approve",
            post(handlers::work_orders::approve_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/reject",
            post(handlers::work_orders::reject_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/close",
            post(handlers::work_orders::close_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/reopen",
            post(handlers::work_orders::reopen_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/cancel",
            post(handlers::work_orders::cancel_work_order_handler),
        )
        .route(
            "/api/work-orders/{work_order_id}/status",
            put(handlers::work_orders::move_work_order_handler),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications_handler),
        )
        .route(
            "/api/notifications/unread-count",
            get(handlers::notifications::unread_count_handler),
        )
        .route(
            "/api/notifications/read-all",
            patch(handlers::notifications::mark_all_read_handler),
        )
        .route(
            "/api/notifications/read",
            delete(handlers::notifications::delete_read_handler),
        )
        .route(
            "/api/notifications/{notification_id}/read",
            patch(handlers::notifications::mark_read_handler),
        )
        .route(
            "/api/notifications/{notification_id}",
            delete(handlers::notifications::delete_notification_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_actor,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
