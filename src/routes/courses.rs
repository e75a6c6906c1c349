use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::courses::{CourseList, DomainList, RateCourseRequest, RatingResult},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Course,
    response::ApiResponse,
    routes::params::CourseQuery,
    services::{course_service, rating_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/domains", get(list_domains))
        .route("/{id}", get(get_course))
        .route("/{id}/rating", put(rate_course))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search title and description"),
        ("domain" = Option<String>, Query, description = "Filter by domain, case-insensitive"),
        ("min_price" = Option<i64>, Query, description = "Minimum list price, minor units"),
        ("max_price" = Option<i64>, Query, description = "Maximum list price, minor units"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, title"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Published courses", body = ApiResponse<CourseList>)
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> AppResult<Json<ApiResponse<CourseList>>> {
    let resp = course_service::list_courses(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/courses/domains",
    responses(
        (status = 200, description = "Distinct course domains", body = ApiResponse<DomainList>)
    ),
    tag = "Courses"
)]
pub async fn list_domains(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DomainList>>> {
    let resp = course_service::list_domains(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course with public content", body = ApiResponse<Course>),
        (status = 404, description = "Course not found"),
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let resp = course_service::get_course(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}/rating",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = RateCourseRequest,
    responses(
        (status = 200, description = "Rating stored", body = ApiResponse<RatingResult>),
        (status = 400, description = "Invalid rating or not enrolled"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn rate_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateCourseRequest>,
) -> AppResult<Json<ApiResponse<RatingResult>>> {
    let resp = rating_service::rate_course(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
