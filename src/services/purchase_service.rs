use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::purchases::{CheckoutResponse, PurchaseList, WebhookOutcome},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        courses::{Entity as Courses, Model as CourseModel},
        enrollments::{ActiveModel as EnrollActive, Column as EnrollCol, Entity as Enrollments},
        purchases::{ActiveModel as PurchaseActive, Column as PurchaseCol, Entity as Purchases},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{PurchaseStatus, purchase_from_entity},
    payments::{CheckoutSessionRequest, LineItem, SessionStatus},
    pricing::final_price,
    response::{ApiResponse, Meta},
    routes::params::{PurchaseListQuery, SortOrder},
    services::{
        cart_service::{checkout_eligible, enrolled_course_ids},
        course_service::{find_published, is_enrolled},
    },
    state::AppState,
};

fn redirect_urls(state: &AppState, origin: Option<String>) -> (String, String) {
    let origin = origin
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| state.config.frontend_origin.clone());
    let origin = origin.trim_end_matches('/');
    (
        format!("{origin}/loading/my-enrollments"),
        format!("{origin}/"),
    )
}

/// Record pending purchases for `courses` and open one checkout session
/// covering all of them.
async fn open_checkout(
    state: &AppState,
    user: &AuthUser,
    courses: Vec<CourseModel>,
    origin: Option<String>,
) -> AppResult<CheckoutResponse> {
    let currency = state.config.currency.clone();
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let mut purchase_ids = Vec::with_capacity(courses.len());
    let mut line_items = Vec::with_capacity(courses.len());
    let mut amount = 0;
    for course in &courses {
        let price = final_price(course.price, course.discount);
        let purchase = PurchaseActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            course_id: Set(course.id),
            amount: Set(price),
            currency: Set(currency.clone()),
            status: Set(PurchaseStatus::Pending.as_str().to_string()),
            session_id: Set(None),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        purchase_ids.push(purchase.id);
        line_items.push(LineItem {
            name: course.title.clone(),
            unit_amount: price,
        });
        amount += price;
    }
    txn.commit().await?;

    let (success_url, cancel_url) = redirect_urls(state, origin);
    let reference = user.user_id.to_string();

    let session = state
        .payments
        .create_checkout_session(CheckoutSessionRequest {
            currency,
            line_items,
            success_url,
            cancel_url,
            client_reference: reference,
        })
        .await;

    let session = match session {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(error = %err, user_id = %user.user_id, "checkout session failed");
            Purchases::update_many()
                .col_expr(
                    PurchaseCol::Status,
                    sea_orm::sea_query::Expr::value(PurchaseStatus::Failed.as_str()),
                )
                .filter(PurchaseCol::Id.is_in(purchase_ids.clone()))
                .exec(&state.orm)
                .await?;
            return Err(err);
        }
    };

    Purchases::update_many()
        .col_expr(
            PurchaseCol::SessionId,
            sea_orm::sea_query::Expr::value(session.id.clone()),
        )
        .filter(PurchaseCol::Id.is_in(purchase_ids.clone()))
        .exec(&state.orm)
        .await?;

    audit::record(
        state,
        user.user_id,
        "checkout_started",
        "purchases",
        serde_json::json!({ "purchase_ids": purchase_ids, "session_id": session.id }),
    )
    .await;

    Ok(CheckoutResponse {
        session_url: session.url,
        session_id: session.id,
        purchase_ids,
        amount,
    })
}

pub async fn purchase_course(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
    origin: Option<String>,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let course = find_published(&state.orm, course_id).await?;
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

    let resp = open_checkout(state, user, vec![course], origin).await?;
    Ok(ApiResponse::success(
        "Checkout session created",
        resp,
        Some(Meta::empty()),
    ))
}

pub async fn checkout_cart(
    state: &AppState,
    user: &AuthUser,
    origin: Option<String>,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .find_also_related(Courses)
        .all(&state.orm)
        .await?;

    let enrolled = enrolled_course_ids(state, user.user_id).await?;

    let courses: Vec<CourseModel> = rows
        .into_iter()
        .filter_map(|(_, course)| course)
        .filter(|c| checkout_eligible(c, user.user_id, &enrolled))
        .collect();

    if courses.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let resp = open_checkout(state, user, courses, origin).await?;
    Ok(ApiResponse::success(
        "Checkout session created",
        resp,
        Some(Meta::empty()),
    ))
}

pub async fn list_my_purchases(
    state: &AppState,
    user: &AuthUser,
    query: PurchaseListQuery,
) -> AppResult<ApiResponse<PurchaseList>> {
    let mut condition = Condition::all().add(PurchaseCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(PurchaseCol::Status.eq(status.clone()));
    }
    list_purchases_where(state, condition, query).await
}

/// Shared by the buyer's and the admin's purchase listings.
pub async fn list_purchases_where(
    state: &AppState,
    condition: Condition,
    query: PurchaseListQuery,
) -> AppResult<ApiResponse<PurchaseList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Purchases::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(PurchaseCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(PurchaseCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(purchase_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Purchases",
        PurchaseList { items },
        Some(meta),
    ))
}

/// Settle the purchases of a checkout session.
///
/// The webhook body is not trusted: the session status is always re-read
/// from the gateway. Settling twice is a no-op because only `pending`
/// purchases are touched and enrollments are unique per user and course.
pub async fn handle_webhook(
    state: &AppState,
    session_id: &str,
) -> AppResult<ApiResponse<WebhookOutcome>> {
    let purchases = Purchases::find()
        .filter(PurchaseCol::SessionId.eq(session_id))
        .all(&state.orm)
        .await?;
    if purchases.is_empty() {
        return Err(AppError::NotFound);
    }

    let status = state.payments.session_status(session_id).await?;
    let pending: Vec<_> = purchases
        .into_iter()
        .filter(|p| p.status == PurchaseStatus::Pending.as_str())
        .collect();

    let mut outcome = WebhookOutcome {
        session_id: session_id.to_string(),
        status: match status {
            SessionStatus::Open => "open",
            SessionStatus::Paid => "paid",
            SessionStatus::Expired => "expired",
        }
        .to_string(),
        purchases_updated: 0,
        enrollments_created: 0,
    };

    match status {
        SessionStatus::Open => {}
        SessionStatus::Expired => {
            let now = Utc::now();
            for purchase in pending {
                let mut active: PurchaseActive = purchase.into();
                active.status = Set(PurchaseStatus::Failed.as_str().to_string());
                active.updated_at = Set(now.into());
                active.update(&state.orm).await?;
                outcome.purchases_updated += 1;
            }
        }
        SessionStatus::Paid => {
            let now = Utc::now();
            let txn = state.orm.begin().await?;
            let mut settled = Vec::with_capacity(pending.len());
            for purchase in pending {
                let user_id = purchase.user_id;
                let course_id = purchase.course_id;
                let purchase_id = purchase.id;

                let mut active: PurchaseActive = purchase.into();
                active.status = Set(PurchaseStatus::Completed.as_str().to_string());
                active.completed_at = Set(Some(now.into()));
                active.updated_at = Set(now.into());
                active.update(&txn).await?;
                outcome.purchases_updated += 1;

                let inserted = Enrollments::insert(EnrollActive {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    course_id: Set(course_id),
                    purchase_id: Set(Some(purchase_id)),
                    created_at: Set(now.into()),
                })
                .on_conflict(
                    OnConflict::columns([EnrollCol::UserId, EnrollCol::CourseId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
                outcome.enrollments_created += inserted as usize;

                CartItems::delete_many()
                    .filter(CartCol::UserId.eq(user_id))
                    .filter(CartCol::CourseId.eq(course_id))
                    .exec(&txn)
                    .await?;
                settled.push((user_id, purchase_id, course_id));
            }
            txn.commit().await?;

            for (user_id, purchase_id, course_id) in settled {
                audit::record(
                    state,
                    user_id,
                    "purchase_completed",
                    "purchases",
                    serde_json::json!({ "purchase_id": purchase_id, "course_id": course_id }),
                )
                .await;
            }
        }
    }

    tracing::info!(
        session_id,
        status = %outcome.status,
        purchases = outcome.purchases_updated,
        enrollments = outcome.enrollments_created,
        "payment webhook processed"
    );

    Ok(ApiResponse::success(
        "Webhook processed",
        outcome,
        Some(Meta::empty()),
    ))
}
