use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    curriculum,
    dto::progress::ProgressData,
    entity::{
        course_progress::{
            ActiveModel as ProgressActive, Column as ProgressCol, Entity as CourseProgress,
            Model as ProgressModel,
        },
        courses::Entity as Courses,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::course_service::is_enrolled,
    state::AppState,
};

/// Decode the stored completion list. A value that is not a list of ids is
/// reported rather than silently replaced on the next write.
pub(crate) fn completed_ids(value: &serde_json::Value) -> AppResult<Vec<String>> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt lecture progress: {e}")))
}

async fn load_enrolled_content(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> AppResult<Vec<curriculum::Chapter>> {
    let course = Courses::find_by_id(course_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !is_enrolled(&state.orm, user.user_id, course_id).await? {
        return Err(AppError::BadRequest(
            "You are not enrolled in this course".into(),
        ));
    }
    curriculum::from_json(&course.content)
}

async fn find_progress(
    state: &AppState,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<Option<ProgressModel>> {
    Ok(CourseProgress::find()
        .filter(ProgressCol::UserId.eq(user_id))
        .filter(ProgressCol::CourseId.eq(course_id))
        .one(&state.orm)
        .await?)
}

pub async fn mark_lecture_complete(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
    lecture_id: String,
) -> AppResult<ApiResponse<ProgressData>> {
    let content = load_enrolled_content(state, user, course_id).await?;
    if !curriculum::contains_lecture(&content, &lecture_id) {
        return Err(AppError::BadRequest(format!(
            "lecture {lecture_id} is not part of this course"
        )));
    }
    let total = curriculum::total_lectures(&content);
    let now = Utc::now();

    let existing = find_progress(state, user.user_id, course_id).await?;
    let completed = match existing {
        Some(progress) => {
            let mut completed = curriculum::retain_current_lectures(
                &content,
                completed_ids(&progress.lecture_completed)?,
            );
            if completed.contains(&lecture_id) {
                return Ok(ApiResponse::success(
                    "Lecture already completed",
                    ProgressData::new(course_id, completed, &content),
                    Some(Meta::empty()),
                ));
            }
            completed.push(lecture_id.clone());
            let mut active: ProgressActive = progress.into();
            active.lecture_completed = Set(serde_json::json!(completed));
            active.completed = Set(completed.len() >= total);
            active.updated_at = Set(now.into());
            active.update(&state.orm).await?;
            completed
        }
        None => {
            let completed = vec![lecture_id.clone()];
            ProgressActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                course_id: Set(course_id),
                completed: Set(completed.len() >= total),
                lecture_completed: Set(serde_json::json!(completed)),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&state.orm)
            .await?;
            completed
        }
    };

    audit::record(
        state,
        user.user_id,
        "lecture_completed",
        "course_progress",
        serde_json::json!({ "course_id": course_id, "lecture_id": lecture_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Progress updated",
        ProgressData::new(course_id, completed, &content),
        Some(Meta::empty()),
    ))
}

pub async fn get_progress(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> AppResult<ApiResponse<ProgressData>> {
    let content = load_enrolled_content(state, user, course_id).await?;
    let completed = match find_progress(state, user.user_id, course_id).await? {
        Some(progress) => completed_ids(&progress.lecture_completed)?,
        None => Vec::new(),
    };

    Ok(ApiResponse::success(
        "Progress",
        ProgressData::new(course_id, completed, &content),
        Some(Meta::empty()),
    ))
}
