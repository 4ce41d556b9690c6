use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::admin::{
        DashboardStats, PaymentTotalsReport, RevenueReport, TopToursReport,
        UpdateBookingStatusRequest,
    },
    dto::bookings::{BookingDetail, BookingList},
    dto::categories::{CreateCategoryRequest, UpdateCategoryRequest},
    dto::payments::{PaymentList, UpdatePaymentStatusRequest},
    dto::reviews::AdminReviewList,
    dto::tours::{CreateTourRequest, TourDetail, TourList, UpdateTourRequest},
    error::AppResult,
    middleware::auth::{AccessScope, AuthUser, ensure_admin},
    models::{Booking, Payment, Review, TourCategory},
    response::ApiResponse,
    routes::params::{BookingListQuery, PaymentListQuery, ReviewListQuery, TourQuery},
    services::{
        admin_service, booking_service, category_service, review_service, tour_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/reports/revenue", get(revenue_report))
        .route("/reports/top-tours", get(top_tours_report))
        .route("/reports/payments", get(payment_totals_report))
        .route("/tours", get(list_tours))
        .route("/tours", post(create_tour))
        .route("/tours/{id}", put(update_tour))
        .route("/tours/{id}", delete(delete_tour))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        .route("/bookings/{id}", delete(delete_booking))
        .route("/payments", get(list_payments))
        .route("/payments/{id}/status", patch(update_payment_status))
        .route("/payments/{id}", delete(delete_payment))
        .route("/categories", post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/reviews", get(list_reviews))
        .route("/reviews/{id}/hide", patch(hide_review))
        .route("/reviews/{id}", delete(delete_review))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopToursQuery {
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Aggregate statistics", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = admin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/reports/revenue", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn revenue_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RevenueReport>>> {
    let resp = admin_service::revenue_by_month(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/top-tours",
    params(("limit" = Option<usize>, Query, description = "How many tours, default 10")),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn top_tours_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TopToursQuery>,
) -> AppResult<Json<ApiResponse<TopToursReport>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let resp = admin_service::top_tours(&state, &user, limit).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/reports/payments", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn payment_totals_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentTotalsReport>>> {
    let resp = admin_service::payment_totals(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/tours", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn list_tours(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TourQuery>,
) -> AppResult<Json<ApiResponse<TourList>>> {
    ensure_admin(&user)?;
    // No default status filter here; admins see inactive tours too.
    let resp = tour_service::list_tours(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/tours",
    request_body = CreateTourRequest,
    responses(
        (status = 201, description = "Tour created", body = ApiResponse<TourDetail>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_tour(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTourRequest>,
) -> AppResult<Json<ApiResponse<TourDetail>>> {
    let resp = tour_service::create_tour(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/tours/{id}",
    params(("id" = Uuid, Path, description = "Tour ID")),
    request_body = UpdateTourRequest,
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_tour(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTourRequest>,
) -> AppResult<Json<ApiResponse<TourDetail>>> {
    let resp = tour_service::update_tour(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tours/{id}",
    params(("id" = Uuid, Path, description = "Tour ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Tour has bookings"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_tour(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = tour_service::delete_tour(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/bookings", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = admin_service::list_all_bookings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingDetail>>> {
    ensure_admin(&user)?;
    let resp = booking_service::get_booking(&state, AccessScope::Unrestricted, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status overridden", body = ApiResponse<Booking>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = admin_service::update_booking_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/admin/bookings/{id}", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn delete_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/payments", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PaymentListQuery>,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    let resp = admin_service::list_all_payments(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/payments/{id}/status",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Status overridden", body = ApiResponse<Payment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = admin_service::override_payment_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/admin/payments/{id}", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn delete_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_payment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<TourCategory>>> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<TourCategory>>> {
    let resp = category_service::update_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/admin/categories/{id}", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/reviews", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<ApiResponse<AdminReviewList>>> {
    let resp = review_service::list_all_reviews(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(patch, path = "/api/admin/reviews/{id}/hide", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn hide_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::hide_review(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/admin/reviews/{id}", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete_review(&state, &user, id).await?;
    Ok(Json(resp))
}
