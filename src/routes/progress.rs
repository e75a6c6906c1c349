use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::progress::ProgressData,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::progress_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{course_id}", get(get_progress))
        .route("/{course_id}/lectures/{lecture_id}", post(complete_lecture))
}

#[utoipa::path(
    get,
    path = "/api/progress/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Lecture completion for the course", body = ApiResponse<ProgressData>),
        (status = 400, description = "Not enrolled"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Progress"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProgressData>>> {
    let resp = progress_service::get_progress(&state, &user, course_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/progress/{course_id}/lectures/{lecture_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("lecture_id" = String, Path, description = "Lecture ID")
    ),
    responses(
        (status = 200, description = "Lecture marked complete", body = ApiResponse<ProgressData>),
        (status = 400, description = "Not enrolled or unknown lecture"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Progress"
)]
pub async fn complete_lecture(
    State(state): State<AppState>,
    user: AuthUser,
    Path((course_id, lecture_id)): Path<(Uuid, String)>,
) -> AppResult<Json<ApiResponse<ProgressData>>> {
    let resp = progress_service::mark_lecture_complete(&state, &user, course_id, lecture_id).await?;
    Ok(Json(resp))
}
