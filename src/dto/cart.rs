use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CourseSummary;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItemDto>,
    /// Sum of final prices of the available items, minor units.
    pub subtotal: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub course: CourseSummary,
    /// False when checkout would skip the course (unpublished, own or
    /// already enrolled).
    pub available: bool,
}
