use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        admin::{UpdateRoleRequest, UserList, UserListQuery},
        purchases::PurchaseList,
    },
    entity::{
        purchases::Column as PurchaseCol,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Role, User, user_from_entity},
    response::{ApiResponse, Meta},
    routes::params::PurchaseListQuery,
    services::purchase_service::list_purchases_where,
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::Role.eq(role.clone()));
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn update_user_role(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let role = Role::parse(payload.role.trim())
        .ok_or_else(|| AppError::BadRequest("Invalid role".into()))?;
    if id == user.user_id {
        return Err(AppError::BadRequest("You cannot change your own role".into()));
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    active.role = Set(role.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        "user_role_update",
        "users",
        serde_json::json!({ "user_id": updated.id, "role": updated.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User role updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_purchases(
    state: &AppState,
    user: &AuthUser,
    query: PurchaseListQuery,
) -> AppResult<ApiResponse<PurchaseList>> {
    ensure_admin(user)?;
    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(PurchaseCol::Status.eq(status.clone()));
    }
    list_purchases_where(state, condition, query).await
}
