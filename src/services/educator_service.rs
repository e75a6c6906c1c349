use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    curriculum,
    dto::{
        courses::{CreateCourseRequest, UpdateCourseRequest},
        educator::{
            DashboardData, EducatorCourse, EducatorCourseList, EnrolledStudentEntry,
            EnrolledStudentList, EnrolledStudentPurchase, StudentInfo,
        },
    },
    entity::{
        courses::{ActiveModel as CourseActive, Column as CourseCol, Entity as Courses, Model as CourseModel},
        enrollments::{Column as EnrollCol, Entity as Enrollments},
        purchases::{Column as PurchaseCol, Entity as Purchases},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_educator},
    models::{Course, PurchaseStatus, course_from_entity},
    pricing::{RatingSummary, validate_discount, validate_price},
    response::{ApiResponse, Meta},
    services::course_service::{rating_summaries, summarize},
    state::AppState,
};

const DEFAULT_DOMAIN: &str = "General";

fn normalize_domain(domain: Option<String>) -> String {
    domain
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string())
}

fn student_info(user: UserModel) -> StudentInfo {
    StudentInfo {
        id: user.id,
        name: user.name,
        image_url: user.image_url,
    }
}

/// A course the caller may manage: their own, or any course for admins.
async fn owned_course(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<CourseModel> {
    ensure_educator(user)?;
    let course = Courses::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if course.educator_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(course)
}

async fn my_courses(state: &AppState, user: &AuthUser) -> AppResult<Vec<CourseModel>> {
    Ok(Courses::find()
        .filter(CourseCol::EducatorId.eq(user.user_id))
        .order_by_desc(CourseCol::CreatedAt)
        .all(&state.orm)
        .await?)
}

/// Completed-purchase revenue per course, aggregated in SQL.
async fn earnings_by_course(
    state: &AppState,
    course_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, i64>> {
    if course_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = sqlx::query_as(
        r#"
        SELECT course_id, COALESCE(SUM(amount), 0)::BIGINT
        FROM purchases
        WHERE status = $1 AND course_id = ANY($2)
        GROUP BY course_id
        "#,
    )
    .bind(PurchaseStatus::Completed.as_str())
    .bind(course_ids)
    .fetch_all(state.orm.get_postgres_connection_pool())
    .await?;
    Ok(rows.into_iter().collect())
}

async fn enrollment_counts(
    state: &AppState,
    course_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, i64>> {
    if course_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = sqlx::query_as(
        r#"
        SELECT course_id, COUNT(*)::BIGINT
        FROM enrollments
        WHERE course_id = ANY($1)
        GROUP BY course_id
        "#,
    )
    .bind(course_ids)
    .fetch_all(state.orm.get_postgres_connection_pool())
    .await?;
    Ok(rows.into_iter().collect())
}

pub async fn create_course(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    ensure_educator(user)?;

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Course title is required".into()));
    }
    if payload.thumbnail_url.trim().is_empty() {
        return Err(AppError::BadRequest("Thumbnail not attached".into()));
    }
    validate_price(payload.price).map_err(AppError::BadRequest)?;
    validate_discount(payload.discount).map_err(AppError::BadRequest)?;
    let content = curriculum::normalize_content(payload.content)?;

    let now = Utc::now();
    let course = CourseActive {
        id: Set(Uuid::new_v4()),
        educator_id: Set(user.user_id),
        title: Set(title),
        description: Set(payload.description),
        thumbnail_url: Set(payload.thumbnail_url.trim().to_string()),
        domain: Set(normalize_domain(payload.domain)),
        price: Set(payload.price),
        discount: Set(payload.discount),
        is_published: Set(payload.is_published.unwrap_or(true)),
        content: Set(curriculum::to_json(&content)?),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user.user_id,
        "course_create",
        "courses",
        serde_json::json!({ "course_id": course.id }),
    )
    .await;

    let course = course_from_entity(course, RatingSummary::from_ratings(&[]), None, false)?;
    Ok(ApiResponse::success(
        "Course added successfully",
        course,
        Some(Meta::empty()),
    ))
}

pub async fn list_my_courses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<EducatorCourseList>> {
    ensure_educator(user)?;
    let models = my_courses(state, user).await?;
    let ids: Vec<Uuid> = models.iter().map(|c| c.id).collect();
    let earnings = earnings_by_course(state, &ids).await?;
    let students = enrollment_counts(state, &ids).await?;
    let summaries = summarize(&state.orm, &models).await?;

    let items = models
        .iter()
        .zip(summaries)
        .map(|(model, course)| EducatorCourse {
            is_published: model.is_published,
            enrolled_students: students.get(&model.id).copied().unwrap_or(0) as u64,
            earnings: earnings.get(&model.id).copied().unwrap_or(0),
            course,
        })
        .collect();

    Ok(ApiResponse::success(
        "Courses",
        EducatorCourseList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_my_course(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Course>> {
    let model = owned_course(state, user, id).await?;
    let rating = rating_summaries(&state.orm, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_else(|| RatingSummary::from_ratings(&[]));
    let course = course_from_entity(model, rating, None, false)?;
    Ok(ApiResponse::success("Course", course, None))
}

pub async fn update_course(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    let existing = owned_course(state, user, id).await?;

    let mut active: CourseActive = existing.into();
    if let Some(title) = payload.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Course title is required".into()));
        }
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(thumbnail_url) = payload.thumbnail_url {
        if thumbnail_url.trim().is_empty() {
            return Err(AppError::BadRequest("Thumbnail not attached".into()));
        }
        active.thumbnail_url = Set(thumbnail_url.trim().to_string());
    }
    if payload.domain.is_some() {
        active.domain = Set(normalize_domain(payload.domain));
    }
    if let Some(price) = payload.price {
        validate_price(price).map_err(AppError::BadRequest)?;
        active.price = Set(price);
    }
    if let Some(discount) = payload.discount {
        validate_discount(discount).map_err(AppError::BadRequest)?;
        active.discount = Set(discount);
    }
    if let Some(is_published) = payload.is_published {
        active.is_published = Set(is_published);
    }
    if let Some(content) = payload.content {
        let content = curriculum::normalize_content(content)?;
        active.content = Set(curriculum::to_json(&content)?);
    }
    active.updated_at = Set(Utc::now().into());

    let course = active.update(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        "course_update",
        "courses",
        serde_json::json!({ "course_id": course.id }),
    )
    .await;

    let rating = rating_summaries(&state.orm, &[course.id])
        .await?
        .remove(&course.id)
        .unwrap_or_else(|| RatingSummary::from_ratings(&[]));
    Ok(ApiResponse::success(
        "Updated",
        course_from_entity(course, rating, None, false)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_course(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let course = owned_course(state, user, id).await?;

    // Completed sales and enrollments are kept; such courses can only be
    // unpublished.
    let sold = Purchases::find()
        .filter(PurchaseCol::CourseId.eq(course.id))
        .filter(PurchaseCol::Status.eq(PurchaseStatus::Completed.as_str()))
        .count(&state.orm)
        .await?;
    let enrolled = Enrollments::find()
        .filter(EnrollCol::CourseId.eq(course.id))
        .count(&state.orm)
        .await?;
    if sold > 0 || enrolled > 0 {
        return Err(AppError::BadRequest(
            "Course has enrolled students; unpublish it instead".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    Purchases::delete_many()
        .filter(PurchaseCol::CourseId.eq(course.id))
        .exec(&txn)
        .await?;
    let result = Courses::delete_by_id(course.id).exec(&txn).await?;
    txn.commit().await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user.user_id,
        "course_delete",
        "courses",
        serde_json::json!({ "course_id": id }),
    )
    .await;

    Ok(ApiResponse::empty("Deleted"))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardData>> {
    ensure_educator(user)?;
    let courses = my_courses(state, user).await?;
    let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    let titles: HashMap<Uuid, String> = courses.iter().map(|c| (c.id, c.title.clone())).collect();

    let total_earnings: i64 = earnings_by_course(state, &ids).await?.values().sum();

    let enrolled_students_data = Enrollments::find()
        .filter(EnrollCol::CourseId.is_in(ids.clone()))
        .order_by_desc(EnrollCol::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(enrollment, student)| {
            let student = student?;
            Some(EnrolledStudentEntry {
                course_title: titles.get(&enrollment.course_id)?.clone(),
                student: student_info(student),
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardData {
            total_earnings,
            total_courses: courses.len() as u64,
            enrolled_students_data,
        },
        Some(Meta::empty()),
    ))
}

pub async fn enrolled_students(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<EnrolledStudentList>> {
    ensure_educator(user)?;
    let courses = my_courses(state, user).await?;
    let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    let titles: HashMap<Uuid, String> = courses.into_iter().map(|c| (c.id, c.title)).collect();

    let items = Purchases::find()
        .filter(PurchaseCol::CourseId.is_in(ids))
        .filter(PurchaseCol::Status.eq(PurchaseStatus::Completed.as_str()))
        .order_by_desc(PurchaseCol::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(purchase, student)| {
            Some(EnrolledStudentPurchase {
                student: student_info(student?),
                course_title: titles.get(&purchase.course_id)?.clone(),
                purchase_date: purchase.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "Enrolled students",
        EnrolledStudentList { items },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_domain_falls_back_to_general() {
        assert_eq!(normalize_domain(None), "General");
        assert_eq!(normalize_domain(Some("   ".into())), "General");
        assert_eq!(normalize_domain(Some(" Design ".into())), "Design");
    }
}
