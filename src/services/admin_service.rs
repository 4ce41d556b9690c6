use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::{
        DashboardStats, MonthlyRevenue, PaymentStatusTotal, PaymentTotalsReport, RevenueReport,
        TopTour, TopToursReport, UpdateBookingStatusRequest,
    },
    dto::bookings::BookingList,
    dto::payments::{PaymentList, UpdatePaymentStatusRequest},
    entity::{
        bookings::{ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings},
        enums::{PaymentStatus, TransactionStatus},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments},
        tours::Entity as Tours,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Booking, Payment},
    response::{ApiResponse, Pagination},
    routes::params::{BookingListQuery, PaymentListQuery},
    state::AppState,
};

pub async fn list_all_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status));
    }

    let finder = Bookings::find()
        .filter(condition)
        .order_by_desc(BookingCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    let pagination = Pagination::new(page, limit, total);
    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(pagination),
    ))
}

/// Privileged direct transition (e.g. marking a finished tour COMPLETED).
/// Deliberately bypasses the user-facing state machine; every use is audited.
pub async fn update_booking_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBookingStatusRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_admin(user)?;

    let existing = Bookings::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let mut active: BookingActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "booking_status_override",
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": booking.id, "status": booking.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Booking updated", booking.into(), None))
}

pub async fn delete_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    // Payment rows cascade at the store level.
    let result = Bookings::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "booking_delete",
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Deleted", serde_json::json!({}), None))
}

pub async fn list_all_payments(
    state: &AppState,
    user: &AuthUser,
    query: PaymentListQuery,
) -> AppResult<ApiResponse<PaymentList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(PaymentCol::Status.eq(status));
    }

    let finder = Payments::find()
        .filter(condition)
        .order_by_desc(PaymentCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Payment::from)
        .collect();

    let pagination = Pagination::new(page, limit, total);
    Ok(ApiResponse::success(
        "Payments",
        PaymentList { items },
        Some(pagination),
    ))
}

/// Administrative escape hatch: writes the target state directly instead of
/// walking PENDING -> SUCCESS/FAILED. Forcing SUCCESS keeps the
/// booking-side invariant by marking it PAID in the same transaction.
pub async fn override_payment_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePaymentStatusRequest,
) -> AppResult<ApiResponse<Payment>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let payment = Payments::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let booking_id = payment.booking_id;
    let had_paid_at = payment.paid_at.is_some();

    let mut active: PaymentActive = payment.into();
    active.status = Set(payload.status);
    if payload.status == TransactionStatus::Success && !had_paid_at {
        active.paid_at = Set(Some(Utc::now().into()));
    }
    let payment = active.update(&txn).await?;

    if payload.status == TransactionStatus::Success {
        let booking = Bookings::find_by_id(booking_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        if let Some(booking) = booking {
            let mut booking_active: BookingActive = booking.into();
            booking_active.payment_status = Set(PaymentStatus::Paid);
            booking_active.updated_at = Set(Utc::now().into());
            booking_active.update(&txn).await?;
        }
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_status_override",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": payment.id, "status": payment.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Payment updated", payment.into(), None))
}

pub async fn delete_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Payments::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success("Deleted", serde_json::json!({}), None))
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;

    let total_users = Users::find().count(&state.orm).await? as i64;
    let total_tours = Tours::find().count(&state.orm).await? as i64;
    let total_bookings = Bookings::find().count(&state.orm).await? as i64;
    let total_payments = Payments::find().count(&state.orm).await? as i64;

    // SUM over BIGINT widens to NUMERIC; cast back for the decode.
    let (total_revenue,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments WHERE status = 'SUCCESS'",
    )
    .fetch_one(&state.pool)
    .await?;

    let recent_bookings = Bookings::find()
        .order_by_desc(BookingCol::CreatedAt)
        .limit(5)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    let stats = DashboardStats {
        total_users,
        total_tours,
        total_bookings,
        total_payments,
        total_revenue,
        recent_bookings,
    };

    Ok(ApiResponse::success("Dashboard", stats, None))
}

/// Full scan of successful payments folded into calendar-month buckets.
/// Fine at this scale; not meant for large datasets.
pub async fn revenue_by_month(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RevenueReport>> {
    ensure_admin(user)?;

    let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
        "SELECT paid_at, amount FROM payments WHERE status = 'SUCCESS' AND paid_at IS NOT NULL",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut buckets: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for (paid_at, amount) in rows {
        let bucket = buckets.entry(paid_at.format("%Y-%m").to_string()).or_default();
        bucket.0 += amount;
        bucket.1 += 1;
    }

    let months = buckets
        .into_iter()
        .map(|(month, (revenue, payments))| MonthlyRevenue {
            month,
            revenue,
            payments,
        })
        .collect();

    Ok(ApiResponse::success(
        "Revenue by month",
        RevenueReport { months },
        None,
    ))
}

pub async fn top_tours(
    state: &AppState,
    user: &AuthUser,
    limit: usize,
) -> AppResult<ApiResponse<TopToursReport>> {
    ensure_admin(user)?;

    let rows: Vec<(Uuid, String, i64)> = sqlx::query_as(
        r#"
        SELECT b.tour_id, t.title, b.total_price
        FROM bookings b
        JOIN tours t ON t.id = b.tour_id
        WHERE b.payment_status = 'PAID'
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let mut by_tour: HashMap<Uuid, (String, i64, i64)> = HashMap::new();
    for (tour_id, title, total_price) in rows {
        let entry = by_tour.entry(tour_id).or_insert((title, 0, 0));
        entry.1 += 1;
        entry.2 += total_price;
    }

    let mut items: Vec<TopTour> = by_tour
        .into_iter()
        .map(|(tour_id, (title, bookings, revenue))| TopTour {
            tour_id,
            title,
            bookings,
            revenue,
        })
        .collect();
    items.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(b.bookings.cmp(&a.bookings)));
    items.truncate(limit);

    Ok(ApiResponse::success(
        "Top tours",
        TopToursReport { items },
        None,
    ))
}

pub async fn payment_totals(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PaymentTotalsReport>> {
    ensure_admin(user)?;

    let rows: Vec<(String, i64)> = sqlx::query_as("SELECT status, amount FROM payments")
        .fetch_all(&state.pool)
        .await?;

    let mut by_status: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for (status, amount) in rows {
        let entry = by_status.entry(status).or_default();
        entry.0 += 1;
        entry.1 += amount;
    }

    let totals = by_status
        .into_iter()
        .map(|(status, (count, total_amount))| PaymentStatusTotal {
            status,
            count,
            total_amount,
        })
        .collect();

    Ok(ApiResponse::success(
        "Payment totals",
        PaymentTotalsReport { totals },
        None,
    ))
}
