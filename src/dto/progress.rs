use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::curriculum::{self, Chapter};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressData {
    pub course_id: Uuid,
    pub lecture_completed: Vec<String>,
    pub completed: bool,
    pub completed_lectures: usize,
    pub total_lectures: usize,
    /// Whole percent, rounded down.
    pub percent: u8,
}

impl ProgressData {
    /// Tally against the course's current lectures; ids of lectures that were
    /// since removed do not count.
    pub fn new(course_id: Uuid, lecture_completed: Vec<String>, content: &[Chapter]) -> Self {
        let lecture_completed = curriculum::retain_current_lectures(content, lecture_completed);
        let total_lectures = curriculum::total_lectures(content);
        let completed_lectures = lecture_completed.len();
        let percent = if total_lectures == 0 {
            0
        } else {
            (completed_lectures.min(total_lectures) * 100 / total_lectures) as u8
        };
        Self {
            course_id,
            completed: total_lectures > 0 && completed_lectures >= total_lectures,
            lecture_completed,
            completed_lectures,
            total_lectures,
            percent,
        }
    }
}
