mod common;

use std::sync::Arc;

use common::{FakeGateway, create_user, database_url, setup_state};
use course_marketplace_api::{
    curriculum::{Chapter, Lecture},
    dto::{
        cart::AddToCartRequest,
        courses::{CreateCourseRequest, RateCourseRequest},
    },
    error::AppError,
    services::{
        cart_service, educator_service, progress_service, purchase_service, rating_service,
        user_service,
    },
};

// Integration flow: educator publishes -> student carts and checks out ->
// webhook settles -> student progresses and rates -> educator sees earnings.
#[tokio::test]
async fn cart_checkout_enrollment_and_dashboard_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(database_url) = database_url() else {
        return Ok(());
    };

    let gateway = Arc::new(FakeGateway::new());
    let state = setup_state(&database_url, gateway.clone()).await?;

    let educator = create_user(&state, "educator", "educator@example.com").await?;
    let student = create_user(&state, "user", "student@example.com").await?;
    let student_id = student.user_id;

    // Educator creates a two-lecture course at 2000 with 25% off.
    let created = educator_service::create_course(
        &state,
        &educator,
        CreateCourseRequest {
            title: "Integration Testing in Rust".into(),
            description: "From unit to end-to-end".into(),
            thumbnail_url: "https://images.test/thumb.png".into(),
            domain: None,
            price: 2000,
            discount: 25,
            is_published: Some(true),
            content: vec![Chapter {
                chapter_id: String::new(),
                chapter_order: 0,
                chapter_title: "Basics".into(),
                chapter_content: vec![
                    Lecture {
                        lecture_id: "l1".into(),
                        lecture_title: "Setup".into(),
                        lecture_duration: 10,
                        lecture_url: "https://videos.test/l1".into(),
                        is_preview_free: true,
                        lecture_order: 0,
                    },
                    Lecture {
                        lecture_id: "l2".into(),
                        lecture_title: "Fixtures".into(),
                        lecture_duration: 20,
                        lecture_url: "https://videos.test/l2".into(),
                        is_preview_free: false,
                        lecture_order: 0,
                    },
                ],
            }],
        },
    )
    .await?;
    let course = created.data.expect("created course");
    assert_eq!(course.summary.domain, "General");
    assert_eq!(course.summary.final_price, 1500);
    assert_eq!(course.summary.total_lectures, 2);
    let course_id = course.summary.id;

    // The educator cannot buy their own course.
    let own = cart_service::add_to_cart(&state, &educator, AddToCartRequest { course_id }).await;
    assert!(matches!(own, Err(AppError::BadRequest(_))));

    // Rating before enrollment is rejected.
    let early = rating_service::rate_course(
        &state,
        &student,
        course_id,
        RateCourseRequest { rating: 5 },
    )
    .await;
    assert!(early.is_err());

    // Adding twice keeps a single cart line.
    cart_service::add_to_cart(&state, &student, AddToCartRequest { course_id }).await?;
    cart_service::add_to_cart(&state, &student, AddToCartRequest { course_id }).await?;
    let cart = cart_service::list_cart(&state, &student)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.subtotal, 1500);

    let checkout = purchase_service::checkout_cart(
        &state,
        &student,
        Some("http://spa.test".into()),
    )
    .await?
    .data
    .expect("checkout");
    assert_eq!(checkout.amount, 1500);
    assert_eq!(checkout.purchase_ids.len(), 1);
    {
        let requests = gateway.requests.lock().expect("requests");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].success_url, "http://spa.test/loading/my-enrollments");
        assert_eq!(requests[0].cancel_url, "http://spa.test/");
        assert_eq!(requests[0].line_items[0].unit_amount, 1500);
        assert_eq!(requests[0].client_reference, student_id.to_string());
    }

    // Settling creates the enrollment; a repeated delivery changes nothing.
    let outcome = purchase_service::handle_webhook(&state, &checkout.session_id)
        .await?
        .data
        .expect("outcome");
    assert_eq!(outcome.status, "paid");
    assert_eq!(outcome.purchases_updated, 1);
    assert_eq!(outcome.enrollments_created, 1);

    let repeat = purchase_service::handle_webhook(&state, &checkout.session_id)
        .await?
        .data
        .expect("outcome");
    assert_eq!(repeat.purchases_updated, 0);
    assert_eq!(repeat.enrollments_created, 0);

    let cart = cart_service::list_cart(&state, &student)
        .await?
        .data
        .expect("cart");
    assert!(cart.items.is_empty(), "paid courses leave the cart");

    let again = cart_service::add_to_cart(&state, &student, AddToCartRequest { course_id }).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Progress
    let first = progress_service::mark_lecture_complete(&state, &student, course_id, "l1".into())
        .await?;
    let data = first.data.expect("progress");
    assert_eq!(data.percent, 50);
    assert!(!data.completed);

    let dup = progress_service::mark_lecture_complete(&state, &student, course_id, "l1".into())
        .await?;
    assert_eq!(dup.message, "Lecture already completed");

    let unknown =
        progress_service::mark_lecture_complete(&state, &student, course_id, "nope".into()).await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let done = progress_service::mark_lecture_complete(&state, &student, course_id, "l2".into())
        .await?
        .data
        .expect("progress");
    assert!(done.completed);
    assert_eq!(done.percent, 100);

    let enrollments = user_service::enrolled_courses(&state, &student)
        .await?
        .data
        .expect("enrollments");
    assert_eq!(enrollments.items.len(), 1);
    assert!(enrollments.items[0].completed);

    // Rating upserts.
    rating_service::rate_course(&state, &student, course_id, RateCourseRequest { rating: 3 })
        .await?;
    let rated = rating_service::rate_course(
        &state,
        &student,
        course_id,
        RateCourseRequest { rating: 4 },
    )
    .await?
    .data
    .expect("rating");
    assert_eq!(rated.summary.count, 1);
    assert_eq!(rated.summary.stars, 4);

    // Educator dashboard
    let dashboard = educator_service::dashboard(&state, &educator)
        .await?
        .data
        .expect("dashboard");
    assert_eq!(dashboard.total_courses, 1);
    assert_eq!(dashboard.total_earnings, 1500);
    assert_eq!(dashboard.enrolled_students_data.len(), 1);
    assert_eq!(dashboard.enrolled_students_data[0].student.id, student_id);

    let students = educator_service::enrolled_students(&state, &educator)
        .await?
        .data
        .expect("students");
    assert_eq!(students.items.len(), 1);
    assert_eq!(students.items[0].course_title, "Integration Testing in Rust");

    // Students cannot reach the educator dashboard.
    let forbidden = educator_service::dashboard(&state, &student).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    Ok(())
}
