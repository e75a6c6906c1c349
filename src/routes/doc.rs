use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    curriculum::{Chapter, Lecture},
    dto::{
        admin::{UpdateRoleRequest, UserList},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList},
        courses::{
            CourseList, CreateCourseRequest, DomainList, RateCourseRequest, RatingResult,
            UpdateCourseRequest,
        },
        educator::{
            DashboardData, EducatorCourse, EducatorCourseList, EnrolledStudentEntry,
            EnrolledStudentList, EnrolledStudentPurchase, StudentInfo,
        },
        progress::ProgressData,
        purchases::{
            CheckoutResponse, PaymentWebhookRequest, PurchaseCourseRequest, PurchaseList,
            WebhookOutcome,
        },
        users::{EnrolledCourse, EnrolledCourseList, UserProfile},
        wishlist::{AddWishlistRequest, WishlistCourseList, WishlistToggle},
    },
    models::{Course, CourseSummary, Purchase, PurchaseStatus, Role, User},
    pricing::RatingSummary,
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cart, courses, educator, health, params, payments, progress, purchases,
        users, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::register,
        auth::login,
        courses::list_courses,
        courses::list_domains,
        courses::get_course,
        courses::rate_course,
        users::get_me,
        users::become_educator,
        users::my_enrollments,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::toggle_wishlist,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::checkout_cart,
        purchases::purchase_course,
        purchases::list_purchases,
        payments::payment_webhook,
        progress::get_progress,
        progress::complete_lecture,
        educator::create_course,
        educator::list_my_courses,
        educator::get_my_course,
        educator::update_course,
        educator::delete_course,
        educator::dashboard,
        educator::enrolled_students,
        admin::list_users,
        admin::update_user_role,
        admin::list_all_purchases
    ),
    components(
        schemas(
            Role,
            PurchaseStatus,
            User,
            CourseSummary,
            Course,
            Purchase,
            Chapter,
            Lecture,
            RatingSummary,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCourseRequest,
            UpdateCourseRequest,
            RateCourseRequest,
            RatingResult,
            CourseList,
            DomainList,
            UserProfile,
            EnrolledCourse,
            EnrolledCourseList,
            AddWishlistRequest,
            WishlistCourseList,
            WishlistToggle,
            AddToCartRequest,
            CartList,
            CartItemDto,
            PurchaseCourseRequest,
            CheckoutResponse,
            PaymentWebhookRequest,
            WebhookOutcome,
            PurchaseList,
            ProgressData,
            EducatorCourse,
            EducatorCourseList,
            StudentInfo,
            EnrolledStudentEntry,
            DashboardData,
            EnrolledStudentPurchase,
            EnrolledStudentList,
            UpdateRoleRequest,
            UserList,
            params::Pagination,
            params::SortOrder,
            params::CourseSortBy,
            params::CourseQuery,
            params::PurchaseListQuery,
            Meta,
            ApiResponse<Course>,
            ApiResponse<CourseList>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<DashboardData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Registration and login"),
        (name = "Courses", description = "Public course catalog and ratings"),
        (name = "Users", description = "Current user profile and enrollments"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Cart", description = "Cart and cart checkout"),
        (name = "Purchases", description = "Single course purchase and history"),
        (name = "Payments", description = "Payment gateway webhook"),
        (name = "Progress", description = "Lecture completion tracking"),
        (name = "Educator", description = "Course authoring and educator dashboard"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
