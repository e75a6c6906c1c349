use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartItemDto, CartList},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        courses::{Entity as Courses, Model as CourseModel},
        enrollments::{Column as EnrollCol, Entity as Enrollments},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing::cart_subtotal,
    response::{ApiResponse, Meta},
    services::course_service::{find_published, is_enrolled, summarize},
    state::AppState,
};

/// Whether a cart course would be charged at checkout: published, not the
/// buyer's own, and not already owned.
pub(crate) fn checkout_eligible(course: &CourseModel, user_id: Uuid, enrolled: &[Uuid]) -> bool {
    course.is_published && course.educator_id != user_id && !enrolled.contains(&course.id)
}

pub(crate) async fn enrolled_course_ids(state: &AppState, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    Ok(Enrollments::find()
        .select_only()
        .column(EnrollCol::CourseId)
        .filter(EnrollCol::UserId.eq(user_id))
        .into_tuple()
        .all(&state.orm)
        .await?)
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::CreatedAt)
        .find_also_related(Courses)
        .all(&state.orm)
        .await?;
    let enrolled = enrolled_course_ids(state, user.user_id).await?;

    let (cart_ids, models): (Vec<Uuid>, Vec<_>) = rows
        .into_iter()
        .filter_map(|(item, course)| course.map(|c| (item.id, c)))
        .unzip();

    let available: Vec<bool> = models
        .iter()
        .map(|c| checkout_eligible(c, user.user_id, &enrolled))
        .collect();
    let subtotal = cart_subtotal(
        models
            .iter()
            .zip(&available)
            .filter(|(_, ok)| **ok)
            .map(|(c, _)| (c.price, c.discount)),
    );
    let summaries = summarize(&state.orm, &models).await?;
    let items: Vec<CartItemDto> = cart_ids
        .into_iter()
        .zip(summaries)
        .zip(available)
        .map(|((id, course), available)| CartItemDto {
            id,
            course,
            available,
        })
        .collect();

    let total = items.len() as i64;
    let meta = Meta::new(1, total.max(1), total);
    Ok(ApiResponse::success(
        "OK",
        CartList {
            items,
            subtotal,
            currency: state.config.currency.clone(),
        },
        Some(meta),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let course = find_published(&state.orm, payload.course_id).await?;

    if course.educator_id == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot buy your own course".into(),
        ));
    }
    if is_enrolled(&state.orm, user.user_id, course.id).await? {
        return Err(AppError::BadRequest(
            "Already enrolled in this course".into(),
        ));
    }

    let exist = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::CourseId.eq(course.id))
        .count(&state.orm)
        .await?;

    if exist == 0 {
        CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            course_id: Set(course.id),
            created_at: Set(Utc::now().into()),
        }
        .insert(&state.orm)
        .await?;

        audit::record(
            state,
            user.user_id,
            "cart_add",
            "cart_items",
            serde_json::json!({ "course_id": course.id }),
        )
        .await;
    }

    Ok(ApiResponse::empty("Added to cart"))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::CourseId.eq(course_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "course_id": course_id }),
    )
    .await;

    Ok(ApiResponse::empty("Removed from cart"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(educator_id: Uuid, is_published: bool) -> CourseModel {
        let now = Utc::now().fixed_offset();
        CourseModel {
            id: Uuid::new_v4(),
            educator_id,
            title: "Rust 101".into(),
            description: String::new(),
            thumbnail_url: "https://images.example.com/t.png".into(),
            domain: "General".into(),
            price: 1_000,
            discount: 0,
            is_published,
            content: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn eligibility_matches_checkout_rules() {
        let buyer = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(checkout_eligible(&course(other, true), buyer, &[]));
        assert!(!checkout_eligible(&course(other, false), buyer, &[]));
        assert!(!checkout_eligible(&course(buyer, true), buyer, &[]));

        let owned = course(other, true);
        assert!(!checkout_eligible(&owned, buyer, &[owned.id]));
    }
}
