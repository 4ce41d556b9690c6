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
    dto::{
        admin::{
            DashboardStats, MonthlyRevenue, PaymentStatusTotal, PaymentTotalsReport,
            RevenueReport, TopTour, TopToursReport, UpdateBookingStatusRequest,
        },
        auth::{
            LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse,
            RegisterRequest,
        },
        bookings::{BookingDetail, BookingList, CreateBookingRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        payments::{
            CreatePaymentRequest, PaymentList, UpdatePaymentStatusRequest, WebhookOutcome,
            WebhookPayload,
        },
        reviews::{AdminReviewList, CreateReviewRequest, ReviewList, ReviewWithAuthor},
        tours::{CreateTourRequest, TourDetail, TourList, UpdateTourRequest},
    },
    entity::enums::{
        BookingStatus, PaymentMethod, PaymentStatus, ReviewStatus, TourStatus, TransactionStatus,
    },
    entity::tours::{BasicInfo, HighlightInfo},
    models::{Booking, Payment, Review, Tour, TourCategory, TourImage, TourSchedule, User},
    response::{ApiResponse, Pagination},
    routes::{admin, auth, bookings, categories, health, payments, tours},
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
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh,
        auth::me,
        tours::list_tours,
        tours::search_tours,
        tours::popular_tours,
        tours::latest_tours,
        tours::get_tour,
        tours::related_tours,
        tours::list_reviews,
        tours::create_review,
        categories::list_categories,
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::get_booking,
        bookings::cancel_booking,
        payments::create_payment,
        payments::list_payments,
        payments::get_payment,
        payments::confirm_payment,
        payments::cancel_payment,
        payments::refund_payment,
        payments::webhook,
        admin::dashboard,
        admin::revenue_report,
        admin::top_tours_report,
        admin::payment_totals_report,
        admin::list_tours,
        admin::create_tour,
        admin::update_tour,
        admin::delete_tour,
        admin::list_bookings,
        admin::get_booking,
        admin::update_booking_status,
        admin::delete_booking,
        admin::list_payments,
        admin::update_payment_status,
        admin::delete_payment,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_reviews,
        admin::hide_review,
        admin::delete_review
    ),
    components(
        schemas(
            User,
            Tour,
            TourCategory,
            TourImage,
            TourSchedule,
            Booking,
            Payment,
            Review,
            BasicInfo,
            HighlightInfo,
            TourStatus,
            BookingStatus,
            PaymentStatus,
            TransactionStatus,
            PaymentMethod,
            ReviewStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            LogoutRequest,
            RefreshRequest,
            RefreshResponse,
            TourList,
            TourDetail,
            CreateTourRequest,
            UpdateTourRequest,
            CategoryList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            BookingList,
            BookingDetail,
            CreateBookingRequest,
            UpdateBookingStatusRequest,
            PaymentList,
            CreatePaymentRequest,
            UpdatePaymentStatusRequest,
            WebhookPayload,
            WebhookOutcome,
            ReviewList,
            ReviewWithAuthor,
            AdminReviewList,
            CreateReviewRequest,
            DashboardStats,
            MonthlyRevenue,
            RevenueReport,
            TopTour,
            TopToursReport,
            PaymentStatusTotal,
            PaymentTotalsReport,
            Pagination,
            ApiResponse<Tour>,
            ApiResponse<TourList>,
            ApiResponse<BookingDetail>,
            ApiResponse<BookingList>,
            ApiResponse<PaymentList>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication and session endpoints"),
        (name = "Tours", description = "Tour catalog endpoints"),
        (name = "Categories", description = "Tour category endpoints"),
        (name = "Bookings", description = "Booking lifecycle endpoints"),
        (name = "Payments", description = "Payment lifecycle endpoints"),
        (name = "Reviews", description = "Tour review endpoints"),
        (name = "Admin", description = "Admin and reporting endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
