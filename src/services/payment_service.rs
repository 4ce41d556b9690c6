use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::payments::{CreatePaymentRequest, PaymentList, WebhookOutcome, WebhookPayload},
    entity::{
        bookings::{ActiveModel as BookingActive, Entity as Bookings, Model as BookingModel},
        enums::{BookingStatus, PaymentStatus, TransactionStatus},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments},
    },
    error::{AppError, AppResult},
    middleware::auth::AccessScope,
    models::Payment,
    response::ApiResponse,
    state::AppState,
};

/// `TXN<millis><uuid8>`, unique enough for a synthetic gateway reference.
fn synthetic_transaction_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("TXN{}{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// What the gateway status code asks us to do with the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Confirm,
    Cancel,
}

pub fn gateway_outcome(status: &str) -> GatewayOutcome {
    match status {
        "SUCCESS" | "00" => GatewayOutcome::Confirm,
        _ => GatewayOutcome::Cancel,
    }
}

/// Digest the gateway signs webhook calls with: sha256 over
/// transaction_id + status + shared secret, hex-encoded.
pub fn webhook_signature(transaction_id: &str, status: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(transaction_id.as_bytes());
    hasher.update(status.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn load_booking<C: ConnectionTrait>(conn: &C, booking_id: Uuid) -> AppResult<BookingModel> {
    let booking = Bookings::find_by_id(booking_id).one(conn).await?;
    match booking {
        Some(b) => Ok(b),
        None => Err(AppError::NotFound),
    }
}

pub async fn create_payment(
    state: &AppState,
    scope: AccessScope,
    booking_id: Uuid,
    payload: CreatePaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let booking = load_booking(&state.orm, booking_id).await?;
    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    if booking.payment_status == PaymentStatus::Paid {
        return Err(AppError::Conflict("Booking is already paid".into()));
    }

    let transaction_id = payload
        .transaction_id
        .filter(|t| !t.is_empty())
        .unwrap_or_else(synthetic_transaction_id);

    // Amount is copied from the booking, never re-derived from the tour.
    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking.id),
        amount: Set(booking.total_price),
        method: Set(payload.method),
        transaction_id: Set(transaction_id),
        status: Set(TransactionStatus::Pending),
        paid_at: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success("Payment created", payment.into(), None))
}

pub async fn list_payments_for_booking(
    state: &AppState,
    scope: AccessScope,
    booking_id: Uuid,
) -> AppResult<ApiResponse<PaymentList>> {
    let booking = load_booking(&state.orm, booking_id).await?;
    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    let items = Payments::find()
        .filter(PaymentCol::BookingId.eq(booking.id))
        .order_by_desc(PaymentCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Payment::from)
        .collect();

    Ok(ApiResponse::success("Payments", PaymentList { items }, None))
}

pub async fn get_payment(
    state: &AppState,
    scope: AccessScope,
    payment_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let payment = Payments::find_by_id(payment_id).one(&state.orm).await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let booking = load_booking(&state.orm, payment.booking_id).await?;
    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    Ok(ApiResponse::success("Payment", payment.into(), None))
}

/// PENDING -> SUCCESS. The payment row, paid_at, and the booking's payment
/// state commit together or not at all.
pub async fn confirm_payment(
    state: &AppState,
    scope: AccessScope,
    payment_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let txn = state.orm.begin().await?;

    let payment = Payments::find_by_id(payment_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let booking = Bookings::find_by_id(payment.booking_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    match payment.status {
        TransactionStatus::Success => {
            return Err(AppError::Conflict("Payment is already confirmed".into()));
        }
        TransactionStatus::Failed => {
            return Err(AppError::Conflict("Failed payment cannot be confirmed".into()));
        }
        TransactionStatus::Pending => {}
    }

    let now = Utc::now();

    let mut payment_active: PaymentActive = payment.into();
    payment_active.status = Set(TransactionStatus::Success);
    payment_active.paid_at = Set(Some(now.into()));
    let payment = payment_active.update(&txn).await?;

    let booking_status = booking.status;
    let mut booking_active: BookingActive = booking.into();
    booking_active.payment_status = Set(PaymentStatus::Paid);
    // Payment success is what moves a pending booking to CONFIRMED.
    if booking_status == BookingStatus::Pending {
        booking_active.status = Set(BookingStatus::Confirmed);
    }
    booking_active.updated_at = Set(now.into());
    booking_active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        scope.user_id(),
        "payment_confirm",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": payment.id, "booking_id": payment.booking_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Payment confirmed", payment.into(), None))
}

pub async fn cancel_payment(
    state: &AppState,
    scope: AccessScope,
    payment_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let payment = Payments::find_by_id(payment_id).one(&state.orm).await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let booking = load_booking(&state.orm, payment.booking_id).await?;
    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    if payment.status == TransactionStatus::Success {
        return Err(AppError::Conflict(
            "Successful payment cannot be cancelled".into(),
        ));
    }

    let mut active: PaymentActive = payment.into();
    active.status = Set(TransactionStatus::Failed);
    let payment = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Payment cancelled", payment.into(), None))
}

/// Records a negative-amount reversal row and flips the booking to
/// REFUNDED/CANCELLED in one transaction. The original payment row is left
/// untouched. Admin-only; the route enforces the role.
pub async fn refund_payment(
    state: &AppState,
    admin_user_id: Uuid,
    payment_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let txn = state.orm.begin().await?;

    let original = Payments::find_by_id(payment_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let original = match original {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if original.status != TransactionStatus::Success {
        return Err(AppError::Conflict(
            "Only successful payments can be refunded".into(),
        ));
    }

    let booking = Bookings::find_by_id(original.booking_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    if booking.payment_status == PaymentStatus::Refunded {
        return Err(AppError::Conflict("Booking is already refunded".into()));
    }

    let now = Utc::now();

    let reversal = PaymentActive {
        id: Set(Uuid::new_v4()),
        booking_id: Set(original.booking_id),
        amount: Set(-original.amount),
        method: Set(original.method),
        transaction_id: Set(format!("REFUND_{}", original.transaction_id)),
        status: Set(TransactionStatus::Success),
        paid_at: Set(Some(now.into())),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut booking_active: BookingActive = booking.into();
    booking_active.payment_status = Set(PaymentStatus::Refunded);
    booking_active.status = Set(BookingStatus::Cancelled);
    booking_active.updated_at = Set(now.into());
    booking_active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(admin_user_id),
        "payment_refund",
        Some("payments"),
        Some(serde_json::json!({
            "payment_id": payment_id,
            "refund_payment_id": reversal.id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Payment refunded", reversal.into(), None))
}

/// Passive gateway relay: resolves the payment by transaction id and maps
/// the gateway status onto confirm/cancel. No ownership filter; the caller
/// is the gateway, not a user.
pub async fn handle_webhook(
    state: &AppState,
    payload: WebhookPayload,
) -> AppResult<ApiResponse<WebhookOutcome>> {
    if let Some(secret) = std::env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()) {
        let expected = webhook_signature(&payload.transaction_id, &payload.status, &secret);
        if payload.signature.as_deref() != Some(expected.as_str()) {
            return Err(AppError::Unauthorized("Invalid webhook signature".into()));
        }
    }

    let payment = Payments::find()
        .filter(PaymentCol::TransactionId.eq(payload.transaction_id.as_str()))
        .one(&state.orm)
        .await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let resp = match gateway_outcome(&payload.status) {
        GatewayOutcome::Confirm => {
            confirm_payment(state, AccessScope::Unrestricted, payment.id).await?
        }
        GatewayOutcome::Cancel => {
            cancel_payment(state, AccessScope::Unrestricted, payment.id).await?
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "payment_webhook",
        Some("payments"),
        Some(serde_json::json!({
            "transaction_id": payload.transaction_id,
            "gateway_status": payload.status,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let status = resp
        .data
        .as_ref()
        .map(|p| p.status)
        .unwrap_or(TransactionStatus::Pending);

    Ok(ApiResponse::success(
        "Webhook processed",
        WebhookOutcome {
            transaction_id: payload.transaction_id,
            status,
        },
        None,
    ))
}
