mod announcements;
mod dashboard;

use axum::{
    Router,
    routing::get,
    middleware,
};
use crate::api::state::AppState;

pub fn create_portal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/announcements", get(announcements::announcements_page))

        // Anonymous visitors are sent to /login
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::api::middleware::auth::require_auth_redirect,
        ))
}
