use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::{
    audit, curriculum,
    dto::{
        auth::LoginResponse,
        progress::ProgressData,
        users::{EnrolledCourse, EnrolledCourseList, UserProfile},
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        course_progress::{Column as ProgressCol, Entity as CourseProgress},
        courses::Entity as Courses,
        enrollments::{Column as EnrollCol, Entity as Enrollments},
        users::{ActiveModel as UserActive, Entity as Users, Model as UserModel},
        wishlist_items::{Column as WishCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, user_from_entity},
    response::{ApiResponse, Meta},
    services::{
        auth_service::issue_token, course_service::summarize,
        progress_service::completed_ids,
    },
    state::AppState,
};

async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<UserModel> {
    Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let model = current_user(state, user).await?;

    let wishlist: Vec<Uuid> = WishlistItems::find()
        .select_only()
        .column(WishCol::CourseId)
        .filter(WishCol::UserId.eq(user.user_id))
        .order_by_desc(WishCol::CreatedAt)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let cart: Vec<Uuid> = CartItems::find()
        .select_only()
        .column(CartCol::CourseId)
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::CreatedAt)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let enrolled_courses: Vec<Uuid> = Enrollments::find()
        .select_only()
        .column(EnrollCol::CourseId)
        .filter(EnrollCol::UserId.eq(user.user_id))
        .order_by_desc(EnrollCol::CreatedAt)
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "User",
        UserProfile {
            user: user_from_entity(model),
            wishlist,
            cart,
            enrolled_courses,
        },
        Some(Meta::empty()),
    ))
}

/// Grant the educator role and hand back a token that carries it.
pub async fn become_educator(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<LoginResponse>> {
    let model = current_user(state, user).await?;

    let model = if model.role == Role::User.as_str() {
        let mut active: UserActive = model.into();
        active.role = Set(Role::Educator.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&state.orm).await?;

        audit::record(
            state,
            user.user_id,
            "role_educator",
            "users",
            serde_json::json!({ "user_id": user.user_id }),
        )
        .await;
        updated
    } else {
        model
    };

    let token = issue_token(&state.config.jwt_secret, model.id, &model.role)?;
    Ok(ApiResponse::success(
        "You can publish a course now",
        LoginResponse {
            token: format!("Bearer {}", token),
            role: model.role,
        },
        Some(Meta::empty()),
    ))
}

pub async fn enrolled_courses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<EnrolledCourseList>> {
    let models: Vec<_> = Enrollments::find()
        .filter(EnrollCol::UserId.eq(user.user_id))
        .order_by_desc(EnrollCol::CreatedAt)
        .find_also_related(Courses)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, course)| course)
        .collect();

    let mut progress: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in CourseProgress::find()
        .filter(ProgressCol::UserId.eq(user.user_id))
        .all(&state.orm)
        .await?
    {
        progress.insert(row.course_id, completed_ids(&row.lecture_completed)?);
    }

    let summaries = summarize(&state.orm, &models).await?;
    let mut items = Vec::with_capacity(models.len());
    for (model, course) in models.iter().zip(summaries) {
        let content = curriculum::from_json(&model.content)?;
        let done = progress.remove(&model.id).unwrap_or_default();
        let data = ProgressData::new(model.id, done, &content);
        items.push(EnrolledCourse {
            course,
            completed_lectures: data.completed_lectures,
            total_lectures: data.total_lectures,
            completed: data.completed,
        });
    }

    Ok(ApiResponse::success(
        "Enrolled courses",
        EnrolledCourseList { items },
        Some(Meta::empty()),
    ))
}
