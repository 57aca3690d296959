pub mod attempts;
pub mod dashboard;
pub mod health;
pub mod tests;

use axum::{
    routing::{get, post},
    Router,
};

use crate::middleware::auth::require_session;
use crate::AppState;

/// Full HTTP surface. Everything except `/health` needs a bearer session.
pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/api/me", get(dashboard::me))
        .route("/api/dashboard/tutor", get(dashboard::tutor_dashboard))
        .route("/api/dashboard/student", get(dashboard::student_dashboard))
        .route("/api/tests", post(tests::create_test))
        .route("/api/tests/:id", get(tests::get_test))
        .route("/api/tests/:id/students", get(tests::list_students))
        .route(
            "/api/tests/:id/assignments",
            get(tests::list_assignments).post(tests::assign_test),
        )
        .route("/api/tests/:id/attempts", post(attempts::start_attempt))
        .route("/api/attempts/:id", get(attempts::get_attempt))
        .route("/api/attempts/:id/submit", post(attempts::submit_attempt))
        .route("/api/attempts/:id/results", get(attempts::get_results))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(authenticated)
        .with_state(state)
}
