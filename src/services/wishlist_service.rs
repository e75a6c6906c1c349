use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::wishlist::{AddWishlistRequest, WishlistCourseList, WishlistToggle},
    entity::{
        courses::Entity as Courses,
        wishlist_items::{ActiveModel as WishlistActive, Column as WishCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::course_service::{find_published, summarize},
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistCourseList>> {
    let (page, limit, offset) = pagination.normalize();
    let base = WishlistItems::find().filter(WishCol::UserId.eq(user.user_id));

    let total = base.clone().count(&state.orm).await? as i64;

    let models: Vec<_> = base
        .order_by_desc(WishCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Courses)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, course)| course)
        .collect();
    let items = summarize(&state.orm, &models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        WishlistCourseList { items },
        Some(meta),
    ))
}

async fn exists(state: &AppState, user_id: Uuid, course_id: Uuid) -> AppResult<bool> {
    let count = WishlistItems::find()
        .filter(WishCol::UserId.eq(user_id))
        .filter(WishCol::CourseId.eq(course_id))
        .count(&state.orm)
        .await?;
    Ok(count > 0)
}

async fn insert(state: &AppState, user: &AuthUser, course_id: Uuid) -> AppResult<()> {
    WishlistActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        course_id: Set(course_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user.user_id,
        "wishlist_add",
        "wishlist_items",
        serde_json::json!({ "course_id": course_id }),
    )
    .await;
    Ok(())
}

async fn delete(state: &AppState, user: &AuthUser, course_id: Uuid) -> AppResult<u64> {
    let result = WishlistItems::delete_many()
        .filter(WishCol::UserId.eq(user.user_id))
        .filter(WishCol::CourseId.eq(course_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected > 0 {
        audit::record(
            state,
            user.user_id,
            "wishlist_remove",
            "wishlist_items",
            serde_json::json!({ "course_id": course_id }),
        )
        .await;
    }
    Ok(result.rows_affected)
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistToggle>> {
    find_published(&state.orm, payload.course_id).await?;

    if !exists(state, user.user_id, payload.course_id).await? {
        insert(state, user, payload.course_id).await?;
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        WishlistToggle {
            course_id: payload.course_id,
            in_wishlist: true,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if delete(state, user, course_id).await? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::empty("Removed from wishlist"))
}

pub async fn toggle_wishlist(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> AppResult<ApiResponse<WishlistToggle>> {
    let in_wishlist = if exists(state, user.user_id, course_id).await? {
        delete(state, user, course_id).await?;
        false
    } else {
        find_published(&state.orm, course_id).await?;
        insert(state, user, course_id).await?;
        true
    };

    let message = if in_wishlist {
        "Added to wishlist"
    } else {
        "Removed from wishlist"
    };
    Ok(ApiResponse::success(
        message,
        WishlistToggle {
            course_id,
            in_wishlist,
        },
        Some(Meta::empty()),
    ))
}
