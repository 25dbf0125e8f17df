pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
    web,
};
use state::AppState;

/// The full application: JSON API plus the server-rendered portal.
pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        .route("/health", get(handlers::root::health_check))

        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        .nest("/api", api_routes(app_state.clone()))
        .nest("/admin", admin_routes(app_state.clone()))

        .with_state(app_state.clone())

        .merge(web::create_web_routes(app_state))

        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root::api_info))
        .nest("/announcements", announcement_routes(state.clone()))
        .nest("/teacher", teacher_routes(state.clone()))
        .nest("/student", student_routes(state))
}

fn announcement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::announcements::list).post(handlers::announcements::create))
        .route(
            "/:id",
            get(handlers::announcements::get)
                .put(handlers::announcements::update)
                .delete(handlers::announcements::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn teacher_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/schedule", get(handlers::teacher::schedule))
        .route(
            "/attendance",
            get(handlers::teacher::attendance_sheet).post(handlers::teacher::save_attendance),
        )
        .route("/announcements", get(handlers::teacher::announcements))
        .route("/grades", post(handlers::teacher::record_grade))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_teacher,
        ))
}

fn student_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/schedule", get(handlers::student::schedule))
        .route("/attendance", get(handlers::student::attendance))
        .route("/grades", get(handlers::student::grades))
        .route("/announcements", get(handlers::student::announcements))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_student,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route("/users", get(handlers::admin::list_users).post(handlers::admin::create_user))
        .route(
            "/users/:id",
            put(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        .route("/users/:id/toggle-active", post(handlers::admin::toggle_user_active))
        .route("/classes", get(handlers::admin::list_classes).post(handlers::admin::create_class))
        .route(
            "/classes/:id",
            put(handlers::admin::update_class).delete(handlers::admin::delete_class),
        )
        .route("/subjects", get(handlers::admin::list_subjects).post(handlers::admin::create_subject))
        .route(
            "/subjects/:id",
            put(handlers::admin::update_subject).delete(handlers::admin::delete_subject),
        )
        .route("/schedules", post(handlers::admin::create_schedule))
        .route(
            "/schedules/:id",
            put(handlers::admin::update_schedule).delete(handlers::admin::delete_schedule),
        )
        .route("/schedules/class/:class_id", get(handlers::admin::class_schedule))
        .route("/announcements", get(handlers::admin::list_announcements))
        .route("/activities", get(handlers::admin::activities))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
