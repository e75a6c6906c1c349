use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
};

use crate::{
    dto::purchases::{CheckoutResponse, PurchaseCourseRequest, PurchaseList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{params::PurchaseListQuery, request_origin},
    services::purchase_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_purchases).post(purchase_course))
}

#[utoipa::path(
    post,
    path = "/api/purchases",
    request_body = PurchaseCourseRequest,
    responses(
        (status = 200, description = "Checkout session created", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Already enrolled or own course"),
        (status = 404, description = "Course not found"),
        (status = 502, description = "Payment gateway error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn purchase_course(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<PurchaseCourseRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let resp = purchase_service::purchase_course(
        &state,
        &user,
        payload.course_id,
        request_origin(&headers),
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/purchases",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "pending, completed, failed"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Caller's purchases", body = ApiResponse<PurchaseList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PurchaseListQuery>,
) -> AppResult<Json<ApiResponse<PurchaseList>>> {
    let resp = purchase_service::list_my_purchases(&state, &user, query).await?;
    Ok(Json(resp))
}
