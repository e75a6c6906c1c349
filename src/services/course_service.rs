use std::collections::HashMap;

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::courses::{CourseList, DomainList},
    entity::{
        course_ratings::{Column as RatingCol, Entity as CourseRatings},
        courses::{Column, Entity as Courses, Model as CourseModel},
        enrollments::{Column as EnrollCol, Entity as Enrollments},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    models::{Course, CourseSummary, course_from_entity, course_summary_from_entity},
    pricing::RatingSummary,
    response::{ApiResponse, Meta},
    routes::params::{CourseQuery, CourseSortBy, SortOrder},
    state::AppState,
};

/// Substring pattern for ILIKE with `%`, `_` and `\` matched literally.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Rating summaries keyed by course. Courses without ratings are absent.
pub async fn rating_summaries<C: ConnectionTrait>(
    db: &C,
    course_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, RatingSummary>> {
    if course_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = CourseRatings::find()
        .filter(RatingCol::CourseId.is_in(course_ids.to_vec()))
        .all(db)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for row in rows {
        grouped.entry(row.course_id).or_default().push(row.rating);
    }
    Ok(grouped
        .into_iter()
        .map(|(id, ratings)| (id, RatingSummary::from_ratings(&ratings)))
        .collect())
}

/// Summaries for a batch of courses, keeping the input order.
pub async fn summarize<C: ConnectionTrait>(
    db: &C,
    models: &[CourseModel],
) -> AppResult<Vec<CourseSummary>> {
    let ids: Vec<Uuid> = models.iter().map(|c| c.id).collect();
    let ratings = rating_summaries(db, &ids).await?;
    models
        .iter()
        .map(|model| {
            let rating = ratings
                .get(&model.id)
                .copied()
                .unwrap_or_else(|| RatingSummary::from_ratings(&[]));
            course_summary_from_entity(model, rating)
        })
        .collect()
}

pub async fn find_published<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<CourseModel> {
    Courses::find_by_id(id)
        .filter(Column::IsPublished.eq(true))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn is_enrolled<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    course_id: Uuid,
) -> AppResult<bool> {
    let count = Enrollments::find()
        .filter(EnrollCol::UserId.eq(user_id))
        .filter(EnrollCol::CourseId.eq(course_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn list_courses(
    state: &AppState,
    query: CourseQuery,
) -> AppResult<ApiResponse<CourseList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(Column::IsPublished.eq(true));

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(domain) = query
        .domain
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        condition = condition
            .add(Expr::expr(Func::lower(Expr::col(Column::Domain))).eq(domain.to_lowercase()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_col = match query.sort_by.unwrap_or(CourseSortBy::CreatedAt) {
        CourseSortBy::CreatedAt => Column::CreatedAt,
        CourseSortBy::Price => Column::Price,
        CourseSortBy::Title => Column::Title,
    };

    let mut finder = Courses::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = summarize(&state.orm, &models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Courses", CourseList { items }, Some(meta)))
}

pub async fn list_domains(state: &AppState) -> AppResult<ApiResponse<DomainList>> {
    let items: Vec<String> = Courses::find()
        .select_only()
        .column(Column::Domain)
        .distinct()
        .filter(Column::IsPublished.eq(true))
        .order_by_asc(Column::Domain)
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Domains",
        DomainList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_course(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Course>> {
    let model = find_published(&state.orm, id).await?;
    let educator_name = Users::find_by_id(model.educator_id)
        .one(&state.orm)
        .await?
        .map(|u| u.name);
    let rating = rating_summaries(&state.orm, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_else(|| RatingSummary::from_ratings(&[]));

    let course = course_from_entity(model, rating, educator_name, true)?;
    Ok(ApiResponse::success("Course", course, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("_"), "%\\_%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
