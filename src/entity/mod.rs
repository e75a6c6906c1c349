pub mod audit_logs;
pub mod cart_items;
pub mod course_progress;
pub mod course_ratings;
pub mod courses;
pub mod enrollments;
pub mod purchases;
pub mod users;
pub mod wishlist_items;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use course_progress::Entity as CourseProgress;
pub use course_ratings::Entity as CourseRatings;
pub use courses::Entity as Courses;
pub use enrollments::Entity as Enrollments;
pub use purchases::Entity as Purchases;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
