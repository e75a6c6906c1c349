#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use course_marketplace_api::{
    config::AppConfig,
    curriculum::{Chapter, Lecture},
    db::{create_orm_conn, run_migrations},
    dto::courses::CreateCourseRequest,
    entity::users::ActiveModel as UserActive,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    payments::{
        CheckoutSession, CheckoutSessionRequest, MAX_CLIENT_REFERENCE_LEN, PaymentGateway,
        SessionStatus,
    },
    services::educator_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// Gateway that records requests and reports sessions with a settable status.
/// Like the real gateway, it refuses oversized client references.
pub struct FakeGateway {
    pub requests: Mutex<Vec<CheckoutSessionRequest>>,
    status: Mutex<SessionStatus>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            status: Mutex::new(SessionStatus::Paid),
        }
    }

    pub fn set_status(&self, status: SessionStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        if request.client_reference.len() > MAX_CLIENT_REFERENCE_LEN {
            return Err(AppError::Payment(
                "client_reference_id: too long".into(),
            ));
        }
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| AppError::Payment("poisoned".into()))?;
        requests.push(request);
        let id = format!("cs_test_{}", requests.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.test/{id}"),
            id,
        })
    }

    async fn session_status(&self, _session_id: &str) -> AppResult<SessionStatus> {
        self.status
            .lock()
            .map(|s| *s)
            .map_err(|_| AppError::Payment("poisoned".into()))
    }
}

/// Database URL for integration runs, or `None` to skip.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(
    database_url: &str,
    gateway: Arc<FakeGateway>,
) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE course_progress, enrollments, purchases, cart_items, wishlist_items, course_ratings, audit_logs, courses, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        currency: "usd".into(),
        payment_api_base: "http://payments.invalid".into(),
        payment_secret_key: "sk_test".into(),
        frontend_origin: "http://localhost:5173".into(),
    };

    Ok(AppState {
        orm,
        config: Arc::new(config),
        payments: gateway,
    })
}

pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        image_url: Set(String::new()),
        role: Set(role.into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: role.into(),
    })
}

pub fn lecture(id: &str, title: &str, minutes: u32, preview: bool) -> Lecture {
    Lecture {
        lecture_id: id.into(),
        lecture_title: title.into(),
        lecture_duration: minutes,
        lecture_url: format!("https://videos.test/{title}"),
        is_preview_free: preview,
        lecture_order: 0,
    }
}

pub fn course_request(
    title: &str,
    domain: Option<&str>,
    price: i64,
    discount: i32,
    lectures: Vec<Lecture>,
) -> CreateCourseRequest {
    CreateCourseRequest {
        title: title.into(),
        description: format!("About {title}"),
        thumbnail_url: "https://images.test/thumb.png".into(),
        domain: domain.map(str::to_string),
        price,
        discount,
        is_published: Some(true),
        content: vec![Chapter {
            chapter_id: String::new(),
            chapter_order: 0,
            chapter_title: "Basics".into(),
            chapter_content: lectures,
        }],
    }
}

/// Create a one-lecture published course and return its id.
pub async fn publish_course(
    state: &AppState,
    educator: &AuthUser,
    title: &str,
    domain: &str,
    price: i64,
    discount: i32,
) -> anyhow::Result<Uuid> {
    let created = educator_service::create_course(
        state,
        educator,
        course_request(
            title,
            Some(domain),
            price,
            discount,
            vec![lecture("", "Intro", 10, true)],
        ),
    )
    .await?;
    Ok(created.data.expect("created course").summary.id)
}
