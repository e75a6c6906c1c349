use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        auth::LoginResponse,
        users::{EnrolledCourseList, UserProfile},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/become-educator", post(become_educator))
        .route("/me/enrollments", get(my_enrollments))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile with wishlist, cart and enrollments", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = user_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/users/me/become-educator",
    responses(
        (status = 200, description = "Educator role granted, fresh token", body = ApiResponse<LoginResponse>),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn become_educator(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = user_service::become_educator(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/me/enrollments",
    responses(
        (status = 200, description = "Enrolled courses with progress", body = ApiResponse<EnrolledCourseList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn my_enrollments(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<EnrolledCourseList>>> {
    let resp = user_service::enrolled_courses(&state, &user).await?;
    Ok(Json(resp))
}
