use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CourseSummary;

#[derive(Debug, Serialize, ToSchema)]
pub struct EducatorCourse {
    pub course: CourseSummary,
    pub is_published: bool,
    pub enrolled_students: u64,
    /// Completed purchase revenue for the course, minor units.
    pub earnings: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EducatorCourseList {
    #[schema(value_type = Vec<EducatorCourse>)]
    pub items: Vec<EducatorCourse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentInfo {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrolledStudentEntry {
    pub course_title: String,
    pub student: StudentInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardData {
    pub total_earnings: i64,
    pub total_courses: u64,
    pub enrolled_students_data: Vec<EnrolledStudentEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrolledStudentPurchase {
    pub student: StudentInfo,
    pub course_title: String,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EnrolledStudentList {
    #[schema(value_type = Vec<EnrolledStudentPurchase>)]
    pub items: Vec<EnrolledStudentPurchase>,
}
