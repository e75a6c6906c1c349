use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Purchase;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseCourseRequest {
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub session_url: String,
    pub session_id: String,
    pub purchase_ids: Vec<Uuid>,
    /// Total charged, minor units.
    pub amount: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhookRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookOutcome {
    pub session_id: String,
    pub status: String,
    pub purchases_updated: usize,
    pub enrollments_created: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PurchaseList {
    #[schema(value_type = Vec<Purchase>)]
    pub items: Vec<Purchase>,
}
