//! Course content: chapters of ordered lectures, stored as a JSON document on
//! the course row.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lecture {
    #[serde(default, alias = "lectureId")]
    pub lecture_id: String,
    #[serde(alias = "lectureTitle")]
    pub lecture_title: String,
    /// Minutes.
    #[serde(alias = "lectureDuration")]
    pub lecture_duration: u32,
    /// Empty in public views of lectures that are not free previews.
    #[serde(default, alias = "lectureUrl", skip_serializing_if = "String::is_empty")]
    pub lecture_url: String,
    #[serde(default, alias = "isPreviewFree")]
    pub is_preview_free: bool,
    #[serde(default, alias = "lectureOrder")]
    pub lecture_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Chapter {
    #[serde(default, alias = "chapterId")]
    pub chapter_id: String,
    #[serde(default, alias = "chapterOrder")]
    pub chapter_order: u32,
    #[serde(alias = "chapterTitle")]
    pub chapter_title: String,
    #[serde(default, alias = "chapterContent")]
    pub chapter_content: Vec<Lecture>,
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Validate authored content and fill in missing ids and orders.
///
/// Orders continue from the previous sibling, starting at 1. Ids must be
/// unique across the whole course so progress records can refer to a lecture
/// by id alone.
pub fn normalize_content(chapters: Vec<Chapter>) -> Result<Vec<Chapter>, AppError> {
    let mut chapter_ids = HashSet::new();
    let mut lecture_ids = HashSet::new();
    let mut prev_chapter_order = 0;
    let mut out = Vec::with_capacity(chapters.len());

    for mut chapter in chapters {
        let title = chapter.chapter_title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("chapter title is required".into()));
        }
        chapter.chapter_title = title.to_string();
        if chapter.chapter_id.trim().is_empty() {
            chapter.chapter_id = short_id();
        }
        if !chapter_ids.insert(chapter.chapter_id.clone()) {
            return Err(AppError::BadRequest(format!(
                "duplicate chapter id {}",
                chapter.chapter_id
            )));
        }
        if chapter.chapter_order == 0 {
            chapter.chapter_order = prev_chapter_order + 1;
        }
        prev_chapter_order = chapter.chapter_order;

        let mut prev_lecture_order = 0;
        for lecture in &mut chapter.chapter_content {
            let lecture_title = lecture.lecture_title.trim();
            if lecture_title.is_empty() || lecture.lecture_url.trim().is_empty() {
                return Err(AppError::BadRequest(
                    "lecture title and url are required".into(),
                ));
            }
            if lecture.lecture_duration == 0 {
                return Err(AppError::BadRequest(
                    "lecture duration must be greater than 0".into(),
                ));
            }
            lecture.lecture_title = lecture_title.to_string();
            if lecture.lecture_id.trim().is_empty() {
                lecture.lecture_id = short_id();
            }
            if !lecture_ids.insert(lecture.lecture_id.clone()) {
                return Err(AppError::BadRequest(format!(
                    "duplicate lecture id {}",
                    lecture.lecture_id
                )));
            }
            if lecture.lecture_order == 0 {
                lecture.lecture_order = prev_lecture_order + 1;
            }
            prev_lecture_order = lecture.lecture_order;
        }
        out.push(chapter);
    }

    Ok(out)
}

pub fn total_lectures(chapters: &[Chapter]) -> usize {
    chapters.iter().map(|c| c.chapter_content.len()).sum()
}

pub fn chapter_duration_minutes(chapter: &Chapter) -> u32 {
    chapter
        .chapter_content
        .iter()
        .map(|l| l.lecture_duration)
        .sum()
}

pub fn total_duration_minutes(chapters: &[Chapter]) -> u32 {
    chapters.iter().map(chapter_duration_minutes).sum()
}

pub fn contains_lecture(chapters: &[Chapter], lecture_id: &str) -> bool {
    chapters
        .iter()
        .flat_map(|c| c.chapter_content.iter())
        .any(|l| l.lecture_id == lecture_id)
}

/// Drop completed lecture ids that no longer exist in `chapters`, e.g. after
/// an edit removed or re-keyed a lecture.
pub fn retain_current_lectures(chapters: &[Chapter], mut completed: Vec<String>) -> Vec<String> {
    completed.retain(|id| contains_lecture(chapters, id));
    completed
}

/// Hours and minutes, e.g. `1h 5m`, `45m`, `2h`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Strip the video URL from every lecture that is not a free preview.
pub fn public_view(mut chapters: Vec<Chapter>) -> Vec<Chapter> {
    for lecture in chapters
        .iter_mut()
        .flat_map(|c| c.chapter_content.iter_mut())
    {
        if !lecture.is_preview_free {
            lecture.lecture_url.clear();
        }
    }
    chapters
}

/// Decode the stored JSON document. Rows written by this service always
/// decode; anything else is reported as an internal error.
pub fn from_json(value: &serde_json::Value) -> Result<Vec<Chapter>, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt course content: {e}")))
}

pub fn to_json(chapters: &[Chapter]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(chapters).map_err(|e| AppError::Internal(e.into()))
}
