use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    curriculum::{self, Chapter},
    entity::{courses, purchases, users},
    error::AppResult,
    pricing::{RatingSummary, final_price},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Educator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Educator => "educator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "educator" => Some(Role::Educator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Failed,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog card: everything a listing needs without the lecture tree.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseSummary {
    pub id: Uuid,
    pub educator_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub domain: String,
    pub price: i64,
    pub discount: i32,
    pub final_price: i64,
    pub rating: RatingSummary,
    pub total_lectures: usize,
    pub total_duration_minutes: u32,
    pub duration: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Course {
    #[serde(flatten)]
    pub summary: CourseSummary,
    pub is_published: bool,
    pub educator_name: Option<String>,
    pub content: Vec<Chapter>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub session_id: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        image_url: model.image_url,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn course_summary_from_entity(
    model: &courses::Model,
    rating: RatingSummary,
) -> AppResult<CourseSummary> {
    let content = curriculum::from_json(&model.content)?;
    let minutes = curriculum::total_duration_minutes(&content);
    Ok(CourseSummary {
        id: model.id,
        educator_id: model.educator_id,
        title: model.title.clone(),
        description: model.description.clone(),
        thumbnail_url: model.thumbnail_url.clone(),
        domain: model.domain.clone(),
        price: model.price,
        discount: model.discount,
        final_price: final_price(model.price, model.discount),
        rating,
        total_lectures: curriculum::total_lectures(&content),
        total_duration_minutes: minutes,
        duration: curriculum::format_duration(minutes),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

/// Full course. `public` hides the URLs of lectures that are not previews.
pub fn course_from_entity(
    model: courses::Model,
    rating: RatingSummary,
    educator_name: Option<String>,
    public: bool,
) -> AppResult<Course> {
    let summary = course_summary_from_entity(&model, rating)?;
    let content = curriculum::from_json(&model.content)?;
    let content = if public {
        curriculum::public_view(content)
    } else {
        content
    };
    Ok(Course {
        summary,
        is_published: model.is_published,
        educator_name,
        content,
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub fn purchase_from_entity(model: purchases::Model) -> Purchase {
    Purchase {
        id: model.id,
        user_id: model.user_id,
        course_id: model.course_id,
        amount: model.amount,
        currency: model.currency,
        status: model.status,
        session_id: model.session_id,
        completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
