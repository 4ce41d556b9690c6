use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::bookings::{BookingDetail, BookingList, CreateBookingRequest},
    entity::{
        bookings::{ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings},
        enums::{BookingStatus, PaymentStatus, TourStatus},
        tours::Entity as Tours,
    },
    error::{AppError, AppResult},
    middleware::auth::{AccessScope, AuthUser},
    models::Booking,
    response::{ApiResponse, Pagination},
    routes::params::BookingListQuery,
    state::AppState,
};

/// Children travel at 70% of the adult fare. Integer minor units; computed
/// once at creation and never re-derived.
pub fn compute_total_price(price: i64, adults: i32, children: i32) -> i64 {
    price * adults as i64 + price * children as i64 * 7 / 10
}

pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    if payload.adults < 1 {
        return Err(AppError::Validation("At least one adult is required".into()));
    }
    if payload.children < 0 {
        return Err(AppError::Validation("children must not be negative".into()));
    }

    let tour = Tours::find_by_id(payload.tour_id).one(&state.orm).await?;
    let tour = match tour.filter(|t| t.status == TourStatus::Active) {
        Some(t) => t,
        None => {
            return Err(AppError::Conflict(
                "Tour is not available for booking".into(),
            ));
        }
    };

    let total_price = compute_total_price(tour.price, payload.adults, payload.children);

    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        tour_id: Set(tour.id),
        start_date: Set(payload.start_date),
        adults: Set(payload.adults),
        children: Set(payload.children),
        total_price: Set(total_price),
        status: Set(BookingStatus::Pending),
        payment_status: Set(PaymentStatus::Unpaid),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "booking_create",
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": booking.id, "tour_id": tour.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Booking created",
        booking.into(),
        None,
    ))
}

pub async fn list_my_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(BookingCol::UserId.eq(user.user_id));
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

pub async fn get_booking(
    state: &AppState,
    scope: AccessScope,
    id: Uuid,
) -> AppResult<ApiResponse<BookingDetail>> {
    let booking = Bookings::find_by_id(id).one(&state.orm).await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    let tour = Tours::find_by_id(booking.tour_id)
        .one(&state.orm)
        .await?
        .map(Into::into);

    Ok(ApiResponse::success(
        "OK",
        BookingDetail {
            booking: booking.into(),
            tour,
        },
        None,
    ))
}

/// PENDING|CONFIRMED -> CANCELLED. A paid booking flips to REFUNDED, an
/// unpaid one stays UNPAID.
pub async fn cancel_booking(
    state: &AppState,
    scope: AccessScope,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    let booking = Bookings::find_by_id(id).one(&state.orm).await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    if !scope.permits(booking.user_id) {
        return Err(AppError::Forbidden);
    }

    match booking.status {
        BookingStatus::Cancelled => {
            return Err(AppError::Conflict("Booking is already cancelled".into()));
        }
        BookingStatus::Completed => {
            return Err(AppError::Conflict(
                "Completed booking cannot be cancelled".into(),
            ));
        }
        BookingStatus::Pending | BookingStatus::Confirmed => {}
    }

    let was_paid = booking.payment_status == PaymentStatus::Paid;

    let mut active: BookingActive = booking.into();
    active.status = Set(BookingStatus::Cancelled);
    if was_paid {
        active.payment_status = Set(PaymentStatus::Refunded);
    }
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        scope.user_id(),
        "booking_cancel",
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": booking.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Booking cancelled", booking.into(), None))
}
