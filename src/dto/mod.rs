pub mod admin;
pub mod auth;
pub mod cart;
pub mod courses;
pub mod educator;
pub mod progress;
pub mod purchases;
pub mod users;
pub mod wishlist;
