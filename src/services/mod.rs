pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod course_service;
pub mod educator_service;
pub mod progress_service;
pub mod purchase_service;
pub mod rating_service;
pub mod user_service;
pub mod wishlist_service;
