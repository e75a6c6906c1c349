mod common;

use std::sync::Arc;

use common::{
    FakeGateway, JWT_SECRET, course_request, create_user, database_url, lecture, publish_course,
    setup_state,
};
use course_marketplace_api::{
    dto::{
        admin::{UpdateRoleRequest, UserListQuery},
        auth::RegisterRequest,
        cart::AddToCartRequest,
        courses::UpdateCourseRequest,
        wishlist::AddWishlistRequest,
    },
    error::AppError,
    middleware::auth::{AuthUser, decode_token},
    payments::SessionStatus,
    routes::params::{CourseQuery, CourseSortBy, Pagination, PurchaseListQuery, SortOrder},
    services::{
        admin_service, auth_service, cart_service, course_service, educator_service,
        progress_service, purchase_service, user_service, wishlist_service,
    },
    state::AppState,
};
use uuid::Uuid;

// Business rules around the catalog, wishlist, checkout, settlement and
// administration. Scenarios share one database so they run in order.
#[tokio::test]
async fn marketplace_rules() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };

    let gateway = Arc::new(FakeGateway::new());
    let state = setup_state(&database_url, gateway.clone()).await?;

    let educator = create_user(&state, "educator", "instructor@example.com").await?;
    let student = create_user(&state, "user", "learner@example.com").await?;

    let catalog = catalog_filters(&state, &educator).await?;
    wishlist_rules(&state, &student, catalog.design).await?;
    failed_and_unknown_settlement(&state, &gateway, &educator, &student, catalog.rust).await?;
    cart_availability(&state, &educator, &student).await?;
    large_cart_checkout(&state, &gateway, &educator, &student).await?;
    course_deletion(&state, &educator, catalog.rust, catalog.draft).await?;
    role_management(&state, &student).await?;
    duplicate_registration(&state).await?;

    Ok(())
}

struct Catalog {
    rust: Uuid,
    design: Uuid,
    draft: Uuid,
}

fn query() -> CourseQuery {
    CourseQuery::default()
}

async fn titles(state: &AppState, query: CourseQuery) -> anyhow::Result<Vec<String>> {
    let listed = course_service::list_courses(state, query)
        .await?
        .data
        .expect("courses");
    Ok(listed.items.into_iter().map(|c| c.title).collect())
}

async fn catalog_filters(state: &AppState, educator: &AuthUser) -> anyhow::Result<Catalog> {
    let rust = publish_course(state, educator, "Async Rust", "Programming", 1000, 0).await?;
    let design = publish_course(state, educator, "Brand Design", "Design", 3000, 50).await?;

    let mut draft = course_request(
        "Hidden Draft",
        Some("Programming"),
        2000,
        0,
        vec![lecture("", "Intro", 5, false)],
    );
    draft.is_published = Some(false);
    let draft = educator_service::create_course(state, educator, draft)
        .await?
        .data
        .expect("draft")
        .summary
        .id;

    // Drafts never show up in the catalog.
    let all = course_service::list_courses(state, query()).await?;
    assert_eq!(all.meta.and_then(|m| m.total), Some(2));

    // Search is case-insensitive and treats LIKE wildcards literally.
    assert_eq!(
        titles(state, CourseQuery { q: Some("rUsT".into()), ..query() }).await?,
        vec!["Async Rust"]
    );
    assert!(titles(state, CourseQuery { q: Some("_".into()), ..query() })
        .await?
        .is_empty());
    assert!(titles(state, CourseQuery { q: Some("%".into()), ..query() })
        .await?
        .is_empty());

    assert_eq!(
        titles(state, CourseQuery { domain: Some("design".into()), ..query() }).await?,
        vec!["Brand Design"]
    );

    // Price bounds apply to the list price.
    assert_eq!(
        titles(state, CourseQuery { min_price: Some(2000), ..query() }).await?,
        vec!["Brand Design"]
    );
    assert_eq!(
        titles(state, CourseQuery { max_price: Some(1500), ..query() }).await?,
        vec!["Async Rust"]
    );

    assert_eq!(
        titles(
            state,
            CourseQuery {
                sort_by: Some(CourseSortBy::Price),
                sort_order: Some(SortOrder::Asc),
                ..query()
            }
        )
        .await?,
        vec!["Async Rust", "Brand Design"]
    );
    assert_eq!(
        titles(
            state,
            CourseQuery {
                sort_by: Some(CourseSortBy::Title),
                sort_order: Some(SortOrder::Desc),
                ..query()
            }
        )
        .await?,
        vec!["Brand Design", "Async Rust"]
    );

    let domains = course_service::list_domains(state)
        .await?
        .data
        .expect("domains");
    assert_eq!(domains.items, vec!["Design", "Programming"]);

    Ok(Catalog {
        rust,
        design,
        draft,
    })
}

async fn wishlist_rules(state: &AppState, student: &AuthUser, course_id: Uuid) -> anyhow::Result<()> {
    let added = wishlist_service::add_to_wishlist(state, student, AddWishlistRequest { course_id })
        .await?
        .data
        .expect("toggle");
    assert!(added.in_wishlist);
    // Adding twice keeps one entry.
    wishlist_service::add_to_wishlist(state, student, AddWishlistRequest { course_id }).await?;

    let listed = wishlist_service::list_wishlist(state, student, Pagination::default())
        .await?
        .data
        .expect("wishlist");
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, course_id);

    let off = wishlist_service::toggle_wishlist(state, student, course_id)
        .await?
        .data
        .expect("toggle");
    assert!(!off.in_wishlist);

    let missing = wishlist_service::remove_from_wishlist(state, student, course_id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let on = wishlist_service::toggle_wishlist(state, student, course_id)
        .await?
        .data
        .expect("toggle");
    assert!(on.in_wishlist);
    wishlist_service::remove_from_wishlist(state, student, course_id).await?;

    let unknown = wishlist_service::add_to_wishlist(
        state,
        student,
        AddWishlistRequest {
            course_id: Uuid::new_v4(),
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    Ok(())
}

async fn failed_and_unknown_settlement(
    state: &AppState,
    gateway: &FakeGateway,
    educator: &AuthUser,
    student: &AuthUser,
    course_id: Uuid,
) -> anyhow::Result<()> {
    let own = purchase_service::purchase_course(state, educator, course_id, None).await;
    assert!(matches!(own, Err(AppError::BadRequest(_))));

    let missing = purchase_service::purchase_course(state, student, Uuid::new_v4(), None).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    gateway.set_status(SessionStatus::Expired);
    let checkout = purchase_service::purchase_course(state, student, course_id, None)
        .await?
        .data
        .expect("checkout");
    let outcome = purchase_service::handle_webhook(state, &checkout.session_id)
        .await?
        .data
        .expect("outcome");
    assert_eq!(outcome.status, "expired");
    assert_eq!(outcome.purchases_updated, 1);
    assert_eq!(outcome.enrollments_created, 0);

    let failed = purchase_service::list_my_purchases(
        state,
        student,
        PurchaseListQuery {
            status: Some("failed".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("purchases");
    assert_eq!(failed.items.len(), 1);
    assert_eq!(failed.items[0].course_id, course_id);

    // An expired session grants no access.
    let progress = progress_service::get_progress(state, student, course_id).await;
    assert!(progress.is_err());

    let unknown = purchase_service::handle_webhook(state, "cs_unknown").await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    gateway.set_status(SessionStatus::Paid);
    Ok(())
}

async fn cart_availability(
    state: &AppState,
    educator: &AuthUser,
    student: &AuthUser,
) -> anyhow::Result<()> {
    let course_id = publish_course(state, educator, "Retired Topic", "Programming", 1200, 0).await?;
    cart_service::add_to_cart(state, student, AddToCartRequest { course_id }).await?;

    educator_service::update_course(
        state,
        educator,
        course_id,
        UpdateCourseRequest {
            is_published: Some(false),
            ..Default::default()
        },
    )
    .await?;

    // The line stays visible but no longer counts toward what checkout charges.
    let cart = cart_service::list_cart(state, student)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert!(!cart.items[0].available);
    assert_eq!(cart.subtotal, 0);

    let checkout = purchase_service::checkout_cart(state, student, None).await;
    assert!(matches!(checkout, Err(AppError::BadRequest(_))));

    cart_service::remove_from_cart(state, student, course_id).await?;
    Ok(())
}

async fn large_cart_checkout(
    state: &AppState,
    gateway: &FakeGateway,
    educator: &AuthUser,
    student: &AuthUser,
) -> anyhow::Result<()> {
    let mut expected = 0;
    for n in 0..6 {
        let price = 1000 + n * 100;
        let course_id =
            publish_course(state, educator, &format!("Bundle Part {n}"), "Bundles", price, 0)
                .await?;
        cart_service::add_to_cart(state, student, AddToCartRequest { course_id }).await?;
        expected += price;
    }

    let cart = cart_service::list_cart(state, student)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.subtotal, expected);

    // The gateway rejects references over its limit, so a six-course cart
    // must still fit.
    let checkout = purchase_service::checkout_cart(state, student, None)
        .await?
        .data
        .expect("checkout");
    assert_eq!(checkout.purchase_ids.len(), 6);
    assert_eq!(checkout.amount, expected);
    {
        let requests = gateway.requests.lock().expect("requests");
        let last = requests.last().expect("request");
        assert_eq!(last.client_reference, student.user_id.to_string());
        assert_eq!(last.line_items.len(), 6);
    }

    let outcome = purchase_service::handle_webhook(state, &checkout.session_id)
        .await?
        .data
        .expect("outcome");
    assert_eq!(outcome.enrollments_created, 6);
    Ok(())
}

async fn course_deletion(
    state: &AppState,
    educator: &AuthUser,
    failed_only: Uuid,
    draft: Uuid,
) -> anyhow::Result<()> {
    let sold = educator_service::list_my_courses(state, educator)
        .await?
        .data
        .expect("courses")
        .items
        .into_iter()
        .find(|c| c.course.title == "Bundle Part 0")
        .expect("sold course")
        .course
        .id;

    let blocked = educator_service::delete_course(state, educator, sold).await;
    assert!(matches!(blocked, Err(AppError::BadRequest(_))));
    // Purchase history survives the refused delete.
    let purchases = admin_service::list_all_purchases(
        state,
        &AuthUser {
            user_id: Uuid::new_v4(),
            role: "admin".into(),
        },
        PurchaseListQuery {
            status: Some("completed".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("purchases");
    assert!(purchases.items.iter().any(|p| p.course_id == sold));

    educator_service::delete_course(state, educator, draft).await?;
    // A course whose only purchase failed can still be removed.
    educator_service::delete_course(state, educator, failed_only).await?;
    let gone = course_service::get_course(state, failed_only).await;
    assert!(matches!(gone, Err(AppError::NotFound)));
    Ok(())
}

async fn role_management(state: &AppState, student: &AuthUser) -> anyhow::Result<()> {
    let admin = create_user(state, "admin", "root@example.com").await?;
    let member = create_user(state, "user", "member@example.com").await?;

    let invalid = admin_service::update_user_role(
        state,
        &admin,
        member.user_id,
        UpdateRoleRequest {
            role: "superuser".into(),
        },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::BadRequest(_))));

    let own = admin_service::update_user_role(
        state,
        &admin,
        admin.user_id,
        UpdateRoleRequest {
            role: "user".into(),
        },
    )
    .await;
    assert!(matches!(own, Err(AppError::BadRequest(_))));

    let not_admin = admin_service::update_user_role(
        state,
        student,
        member.user_id,
        UpdateRoleRequest {
            role: "admin".into(),
        },
    )
    .await;
    assert!(matches!(not_admin, Err(AppError::Forbidden)));

    let updated = admin_service::update_user_role(
        state,
        &admin,
        member.user_id,
        UpdateRoleRequest {
            role: "educator".into(),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(updated.role, "educator");

    let admins = admin_service::list_users(
        state,
        &admin,
        UserListQuery {
            role: Some("admin".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("users");
    assert_eq!(admins.items.len(), 1);

    // Becoming an educator hands back a token that already carries the role.
    let issued = user_service::become_educator(state, student)
        .await?
        .data
        .expect("token");
    assert_eq!(issued.role, "educator");
    let token = issued.token.strip_prefix("Bearer ").expect("bearer token");
    let claims = decode_token(JWT_SECRET, token)?;
    assert_eq!(claims.user_id, student.user_id);
    assert_eq!(claims.role, "educator");

    // Admins keep their role.
    let kept = user_service::become_educator(state, &admin)
        .await?
        .data
        .expect("token");
    assert_eq!(kept.role, "admin");
    Ok(())
}

async fn duplicate_registration(state: &AppState) -> anyhow::Result<()> {
    let request = |email: &str| RegisterRequest {
        name: "Casey".into(),
        email: email.into(),
        password: "correct horse".into(),
        image_url: None,
    };

    auth_service::register_user(state, request("casey@example.com")).await?;
    let again = auth_service::register_user(state, request(" Casey@Example.com ")).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));
    Ok(())
}
