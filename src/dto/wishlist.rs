use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CourseSummary;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddWishlistRequest {
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistCourseList {
    #[schema(value_type = Vec<CourseSummary>)]
    pub items: Vec<CourseSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistToggle {
    pub course_id: Uuid,
    pub in_wishlist: bool,
}
