use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    dto::{assignment_dto::AssignTestPayload, test_dto::CreateTestPayload},
    error::Result,
    extract::AppJson,
    middleware::auth::Session,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/tests",
    request_body = CreateTestPayload,
    responses(
        (status = 201, description = "Test and questions created"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Caller is not a tutor")
    )
)]
#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppJson(payload): AppJson<CreateTestPayload>,
) -> Result<impl IntoResponse> {
    let created = state.test_service.create_test(&session, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Test with its questions"),
        (status = 403, description = "Caller neither authored nor holds the test"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let test = state.test_service.get_test(&session, id).await?;
    Ok(Json(test))
}

#[utoipa::path(
    get,
    path = "/api/tests/{id}/students",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Students flagged with whether they hold the test"),
        (status = 403, description = "Caller did not author the test"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn list_students(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let students = state.assignment_service.list_students(&session, id).await?;
    Ok(Json(students))
}

#[utoipa::path(
    post,
    path = "/api/tests/{id}/assignments",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    request_body = AssignTestPayload,
    responses(
        (status = 200, description = "All assignments the test now holds"),
        (status = 400, description = "No students selected or unknown student"),
        (status = 403, description = "Caller did not author the test"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn assign_test(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AssignTestPayload>,
) -> Result<impl IntoResponse> {
    let assigned = state
        .assignment_service
        .assign(&session, id, payload)
        .await?;
    Ok(Json(assigned))
}

#[utoipa::path(
    get,
    path = "/api/tests/{id}/assignments",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Assignments the test holds"),
        (status = 403, description = "Caller did not author the test"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn list_assignments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let assignments = state
        .assignment_service
        .list_assignments(&session, id)
        .await?;
    Ok(Json(assignments))
}
