//! Router builder for the session workflow routes

use crate::server::handlers::{
    AppState, add_distribution_entry, back_to_order, get_distribution, get_session, get_summary,
    login, logout, print_summary, remove_box, remove_distribution_entry, reset_session,
    set_box_count, submit_distribution, submit_order, update_box, update_distribution_entry,
    update_order_details,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build authentication and session routes
///
/// - POST /auth/login, POST /auth/logout
/// - GET /session, POST /session/reset
/// - /session/order/... - order intake
/// - /session/distribution/... - allocation
/// - GET /session/summary, GET /session/print
pub fn build_session_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/session", get(get_session))
        .route("/session/reset", post(reset_session))
        .route("/session/order", put(update_order_details))
        .route("/session/order/box-count", put(set_box_count))
        .route(
            "/session/order/boxes/{index}",
            put(update_box).delete(remove_box),
        )
        .route("/session/order/submit", post(submit_order))
        .route("/session/distribution", get(get_distribution))
        .route("/session/distribution/entries", post(add_distribution_entry))
        .route(
            "/session/distribution/entries/{index}",
            put(update_distribution_entry).delete(remove_distribution_entry),
        )
        .route("/session/distribution/back", post(back_to_order))
        .route("/session/distribution/submit", post(submit_distribution))
        .route("/session/summary", get(get_summary))
        .route("/session/print", get(print_summary))
        .with_state(state)
}
