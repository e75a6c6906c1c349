use course_marketplace_api::{
    config::AppConfig,
    curriculum::{self, Chapter, Lecture},
    db::{create_orm_conn, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = orm.get_postgres_connection_pool();

    let admin_id = ensure_user(pool, "Admin", "admin@example.com", "admin123", "admin").await?;
    let educator_id =
        ensure_user(pool, "Edna Educator", "educator@example.com", "educator123", "educator")
            .await?;
    let student_id = ensure_user(pool, "Sam Student", "student@example.com", "student123", "user")
        .await?;
    seed_courses(pool, educator_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Educator ID: {educator_id}, Student ID: {student_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

fn lecture(title: &str, minutes: u32, preview: bool) -> Lecture {
    Lecture {
        lecture_id: String::new(),
        lecture_title: title.to_string(),
        lecture_duration: minutes,
        lecture_url: format!(
            "https://videos.example.com/{}",
            title.to_lowercase().replace(' ', "-")
        ),
        is_preview_free: preview,
        lecture_order: 0,
    }
}

fn chapter(title: &str, lectures: Vec<Lecture>) -> Chapter {
    Chapter {
        chapter_id: String::new(),
        chapter_order: 0,
        chapter_title: title.to_string(),
        chapter_content: lectures,
    }
}

async fn seed_courses(pool: &sqlx::PgPool, educator_id: Uuid) -> anyhow::Result<()> {
    let courses = vec![
        (
            "Async Rust from Scratch",
            "Futures, executors and tokio in practice",
            "Programming",
            4999_i64,
            20_i32,
            vec![
                chapter(
                    "Foundations",
                    vec![
                        lecture("What is a future", 12, true),
                        lecture("Polling and wakers", 18, false),
                    ],
                ),
                chapter(
                    "Tokio",
                    vec![
                        lecture("Spawning tasks", 22, false),
                        lecture("Channels", 25, false),
                    ],
                ),
            ],
        ),
        (
            "SQL for Backend Developers",
            "Modelling, indexing and transactions with PostgreSQL",
            "Databases",
            2999,
            0,
            vec![chapter(
                "Basics",
                vec![
                    lecture("Tables and keys", 15, true),
                    lecture("Joins", 20, false),
                    lecture("Transactions", 30, false),
                ],
            )],
        ),
        (
            "Design Systems 101",
            "Tokens, components and documentation",
            "Design",
            1999,
            50,
            vec![chapter(
                "Getting started",
                vec![lecture("Why tokens", 10, true)],
            )],
        ),
    ];

    for (title, description, domain, price, discount, content) in courses {
        let content = curriculum::normalize_content(content)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let content = curriculum::to_json(&content).map_err(|e| anyhow::anyhow!(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO courses
                (id, educator_id, title, description, thumbnail_url, domain, price, discount, content)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE NOT EXISTS (SELECT 1 FROM courses WHERE title = $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(educator_id)
        .bind(title)
        .bind(description)
        .bind("https://images.example.com/course-thumbnail.png")
        .bind(domain)
        .bind(price)
        .bind(discount)
        .bind(content)
        .execute(pool)
        .await?;
    }

    println!("Seeded courses");
    Ok(())
}
