use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        courses::{CreateCourseRequest, UpdateCourseRequest},
        educator::{DashboardData, EducatorCourseList, EnrolledStudentList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Course,
    response::ApiResponse,
    services::educator_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_my_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_my_course).put(update_course).delete(delete_course),
        )
        .route("/dashboard", get(dashboard))
        .route("/enrolled-students", get(enrolled_students))
}

#[utoipa::path(
    post,
    path = "/api/educator/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<Course>),
        (status = 400, description = "Invalid course data"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    let resp = educator_service::create_course(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/educator/courses",
    responses(
        (status = 200, description = "Own courses with enrollment counts and earnings", body = ApiResponse<EducatorCourseList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn list_my_courses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<EducatorCourseList>>> {
    let resp = educator_service::list_my_courses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/educator/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course with full content", body = ApiResponse<Course>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn get_my_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = educator_service::get_my_course(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/educator/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<Course>),
        (status = 400, description = "Invalid course data"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = educator_service::update_course(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/educator/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course deleted", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Course has enrolled students"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = educator_service::delete_course(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/educator/dashboard",
    responses(
        (status = 200, description = "Earnings, course count and enrolled students", body = ApiResponse<DashboardData>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardData>>> {
    let resp = educator_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/educator/enrolled-students",
    responses(
        (status = 200, description = "Completed purchases of the educator's courses", body = ApiResponse<EnrolledStudentList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Educator"
)]
pub async fn enrolled_students(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<EnrolledStudentList>>> {
    let resp = educator_service::enrolled_students(&state, &user).await?;
    Ok(Json(resp))
}
