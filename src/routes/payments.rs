use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::payments::{CreatePaymentRequest, PaymentList, WebhookOutcome, WebhookPayload},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings/{booking_id}", post(create_payment))
        .route("/bookings/{booking_id}", get(list_payments))
        .route("/webhook", post(webhook))
        .route("/{id}", get(get_payment))
        .route("/{id}/confirm", post(confirm_payment))
        .route("/{id}/cancel", post(cancel_payment))
        .route("/{id}/refund", post(refund_payment))
}

#[utoipa::path(
    post,
    path = "/api/payments/bookings/{booking_id}",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created", body = ApiResponse<Payment>),
        (status = 400, description = "Booking already paid"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::create_payment(&state, user.scope(), booking_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/bookings/{booking_id}",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    responses((status = 200, description = "Payments for a booking", body = ApiResponse<PaymentList>)),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    let resp = payment_service::list_payments_for_booking(&state, user.scope(), booking_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses((status = 200, description = "Payment", body = ApiResponse<Payment>)),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment(&state, user.scope(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/confirm",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment confirmed", body = ApiResponse<Payment>),
        (status = 400, description = "Already confirmed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::confirm_payment(&state, user.scope(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/cancel",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment cancelled", body = ApiResponse<Payment>),
        (status = 400, description = "Cannot cancel a successful payment")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn cancel_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::cancel_payment(&state, user.scope(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Refund recorded", body = ApiResponse<Payment>),
        (status = 400, description = "Payment is not successful"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn refund_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    ensure_admin(&user)?;
    let resp = payment_service::refund_payment(&state, user.user_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Webhook processed", body = ApiResponse<WebhookOutcome>),
        (status = 401, description = "Invalid signature"),
        (status = 404, description = "Unknown transaction")
    ),
    tag = "Payments"
)]
pub async fn webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<ApiResponse<WebhookOutcome>>> {
    let resp = payment_service::handle_webhook(&state, payload).await?;
    Ok(Json(resp))
}
