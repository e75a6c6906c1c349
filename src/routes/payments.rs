use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::purchases::{PaymentWebhookRequest, WebhookOutcome},
    error::{AppError, AppResult},
    response::ApiResponse,
    services::purchase_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(payment_webhook))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body = PaymentWebhookRequest,
    responses(
        (status = 200, description = "Session settled", body = ApiResponse<WebhookOutcome>),
        (status = 404, description = "Unknown session"),
        (status = 502, description = "Payment gateway error"),
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> AppResult<Json<ApiResponse<WebhookOutcome>>> {
    let session_id = payload.session_id.trim();
    if session_id.is_empty() {
        return Err(AppError::BadRequest("session_id is required".into()));
    }
    let resp = purchase_service::handle_webhook(&state, session_id).await?;
    Ok(Json(resp))
}
