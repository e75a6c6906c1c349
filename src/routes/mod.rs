use axum::{
    Router,
    http::{HeaderMap, header},
};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod courses;
pub mod doc;
pub mod educator;
pub mod health;
pub mod params;
pub mod payments;
pub mod progress;
pub mod purchases;
pub mod users;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses::router())
        .nest("/users", users::router())
        .nest("/wishlist", wishlist::router())
        .nest("/cart", cart::router())
        .nest("/purchases", purchases::router())
        .nest("/payments", payments::router())
        .nest("/progress", progress::router())
        .nest("/educator", educator::router())
        .nest("/admin", admin::router())
}

/// The SPA origin, used to build checkout redirect URLs.
pub(crate) fn request_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
