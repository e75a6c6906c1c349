use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CourseSummary, User};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub wishlist: Vec<Uuid>,
    pub cart: Vec<Uuid>,
    pub enrolled_courses: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrolledCourse {
    pub course: CourseSummary,
    pub completed_lectures: usize,
    pub total_lectures: usize,
    pub completed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EnrolledCourseList {
    #[schema(value_type = Vec<EnrolledCourse>)]
    pub items: Vec<EnrolledCourse>,
}
