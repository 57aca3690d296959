use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    dto::attempt_dto::SubmitAttemptRequest, error::Result, extract::AppJson,
    middleware::auth::Session, AppState,
};

#[utoipa::path(
    post,
    path = "/api/tests/{id}/attempts",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 201, description = "Attempt opened"),
        (status = 403, description = "Test not assigned to the caller"),
        (status = 404, description = "Test not found or has no questions")
    )
)]
#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(test_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let started = state
        .attempt_service
        .start_attempt(&session, test_id)
        .await?;
    Ok((StatusCode::CREATED, Json(started)))
}

#[utoipa::path(
    get,
    path = "/api/attempts/{id}",
    params(
        ("id" = Uuid, Path, description = "Attempt ID")
    ),
    responses(
        (status = 200, description = "Attempt state"),
        (status = 403, description = "Caller neither took the attempt nor authored the test"),
        (status = 404, description = "Attempt not found")
    )
)]
#[axum::debug_handler]
pub async fn get_attempt(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let attempt = state.attempt_service.get_attempt(&session, id).await?;
    Ok(Json(attempt))
}

#[utoipa::path(
    post,
    path = "/api/attempts/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Attempt ID")
    ),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 200, description = "Attempt graded and completed"),
        (status = 400, description = "Malformed body or answer for a foreign question"),
        (status = 409, description = "Attempt already submitted"),
        (status = 422, description = "Unanswered questions need confirmation")
    )
)]
#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<SubmitAttemptRequest>,
) -> Result<impl IntoResponse> {
    let submitted = state
        .attempt_service
        .submit_attempt(&session, id, req)
        .await?;
    Ok(Json(submitted))
}

#[utoipa::path(
    get,
    path = "/api/attempts/{id}/results",
    params(
        ("id" = Uuid, Path, description = "Attempt ID")
    ),
    responses(
        (status = 200, description = "Scored breakdown"),
        (status = 404, description = "Attempt not found")
    )
)]
#[axum::debug_handler]
pub async fn get_results(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let results = state.results_service.results(&session, id).await?;
    Ok(Json(results))
}
