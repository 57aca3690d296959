use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::{error::Result, middleware::auth::Session, AppState};

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller's user row and landing dashboard"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let me = state.dashboard_service.me(&session).await?;
    Ok(Json(me))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/tutor",
    responses(
        (status = 200, description = "Authored tests and all students"),
        (status = 403, description = "Caller is not a tutor")
    )
)]
#[axum::debug_handler]
pub async fn tutor_dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let dashboard = state.dashboard_service.tutor(&session).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/student",
    responses(
        (status = 200, description = "Assigned tests and attempts, newest first"),
        (status = 403, description = "Caller is not a student")
    )
)]
#[axum::debug_handler]
pub async fn student_dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let dashboard = state.dashboard_service.student(&session).await?;
    Ok(Json(dashboard))
}
