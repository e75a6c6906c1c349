use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::courses::{RateCourseRequest, RatingResult},
    entity::{
        course_ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as CourseRatings},
        courses::Entity as Courses,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing::{RatingSummary, validate_rating},
    response::{ApiResponse, Meta},
    services::course_service::{is_enrolled, rating_summaries},
    state::AppState,
};

pub async fn rate_course(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
    payload: RateCourseRequest,
) -> AppResult<ApiResponse<RatingResult>> {
    validate_rating(payload.rating).map_err(AppError::BadRequest)?;

    Courses::find_by_id(course_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !is_enrolled(&state.orm, user.user_id, course_id).await? {
        return Err(AppError::BadRequest(
            "User has not purchased this course".into(),
        ));
    }

    let now = Utc::now();
    CourseRatings::insert(RatingActive {
        id: Set(Uuid::new_v4()),
        course_id: Set(course_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .on_conflict(
        OnConflict::columns([RatingCol::CourseId, RatingCol::UserId])
            .update_columns([RatingCol::Rating, RatingCol::UpdatedAt])
            .to_owned(),
    )
    .exec_without_returning(&state.orm)
    .await?;

    let summary = rating_summaries(&state.orm, &[course_id])
        .await?
        .remove(&course_id)
        .unwrap_or_else(|| RatingSummary::from_ratings(&[]));

    audit::record(
        state,
        user.user_id,
        "course_rated",
        "course_ratings",
        serde_json::json!({ "course_id": course_id, "rating": payload.rating }),
    )
    .await;

    Ok(ApiResponse::success(
        "Rating added",
        RatingResult {
            course_id,
            your_rating: payload.rating,
            summary,
        },
        Some(Meta::empty()),
    ))
}
