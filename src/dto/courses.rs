use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{curriculum::Chapter, models::CourseSummary, pricing::RatingSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub thumbnail_url: String,
    pub domain: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub discount: i32,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub content: Vec<Chapter>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub domain: Option<String>,
    pub price: Option<i64>,
    pub discount: Option<i32>,
    pub is_published: Option<bool>,
    pub content: Option<Vec<Chapter>>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CourseList {
    #[schema(value_type = Vec<CourseSummary>)]
    pub items: Vec<CourseSummary>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct DomainList {
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RateCourseRequest {
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResult {
    pub course_id: uuid::Uuid,
    pub your_rating: i32,
    pub summary: RatingSummary,
}
