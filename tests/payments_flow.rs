use axum_tour_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::bookings::CreateBookingRequest,
    dto::payments::{CreatePaymentRequest, WebhookPayload},
    entity::Payments,
    entity::enums::{BookingStatus, PaymentMethod, PaymentStatus, TourStatus, TransactionStatus},
    entity::{tours::ActiveModel as TourActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    services::{booking_service, payment_service},
    state::AppState,
};
use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement};
use uuid::Uuid;

// Refund reversal rows and webhook dispatch resolve to the same states as
// the direct confirm/cancel operations.
#[tokio::test]
async fn refund_and_webhook_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let alice = create_user(&state, "USER", "alice@example.com").await?;
    let admin = create_user(&state, "ADMIN", "admin@example.com").await?;
    let tour_id = create_tour(&state, 800_000).await?;

    // --- Webhook "00" resolves like a direct confirm. ---
    let webhook_booking = make_booking(&state, &alice, tour_id).await?;
    payment_service::create_payment(
        &state,
        alice.scope(),
        webhook_booking,
        CreatePaymentRequest {
            method: PaymentMethod::BankTransfer,
            transaction_id: Some("TXN1".into()),
        },
    )
    .await?;

    let outcome = payment_service::handle_webhook(
        &state,
        WebhookPayload {
            transaction_id: "TXN1".into(),
            status: "00".into(),
            amount: None,
            signature: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(outcome.status, TransactionStatus::Success);

    let direct_booking = make_booking(&state, &alice, tour_id).await?;
    let direct_payment = payment_service::create_payment(
        &state,
        alice.scope(),
        direct_booking,
        CreatePaymentRequest {
            method: PaymentMethod::BankTransfer,
            transaction_id: Some("TXN2".into()),
        },
    )
    .await?
    .data
    .unwrap();
    payment_service::confirm_payment(&state, alice.scope(), direct_payment.id).await?;

    let via_webhook = booking_service::get_booking(&state, alice.scope(), webhook_booking)
        .await?
        .data
        .unwrap()
        .booking;
    let via_confirm = booking_service::get_booking(&state, alice.scope(), direct_booking)
        .await?
        .data
        .unwrap()
        .booking;
    assert_eq!(via_webhook.status, via_confirm.status);
    assert_eq!(via_webhook.payment_status, via_confirm.payment_status);
    assert_eq!(via_webhook.payment_status, PaymentStatus::Paid);

    // --- Any other gateway status cancels the payment. ---
    let failed_booking = make_booking(&state, &alice, tour_id).await?;
    payment_service::create_payment(
        &state,
        alice.scope(),
        failed_booking,
        CreatePaymentRequest {
            method: PaymentMethod::EWallet,
            transaction_id: Some("TXN3".into()),
        },
    )
    .await?;
    let outcome = payment_service::handle_webhook(
        &state,
        WebhookPayload {
            transaction_id: "TXN3".into(),
            status: "EXPIRED".into(),
            amount: None,
            signature: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(outcome.status, TransactionStatus::Failed);

    // Unknown transaction ids are rejected.
    let err = payment_service::handle_webhook(
        &state,
        WebhookPayload {
            transaction_id: "TXN-UNKNOWN".into(),
            status: "00".into(),
            amount: None,
            signature: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // --- Refund: one reversal row, original untouched, booking flipped. ---
    let refund_booking = make_booking(&state, &alice, tour_id).await?;
    let original = payment_service::create_payment(
        &state,
        alice.scope(),
        refund_booking,
        CreatePaymentRequest {
            method: PaymentMethod::CreditCard,
            transaction_id: Some("TXN4".into()),
        },
    )
    .await?
    .data
    .unwrap();

    // Refunding a pending payment is rejected.
    let err = payment_service::refund_payment(&state, admin.user_id, original.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    payment_service::confirm_payment(&state, alice.scope(), original.id).await?;

    let reversal = payment_service::refund_payment(&state, admin.user_id, original.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reversal.amount, -original.amount);
    assert_eq!(reversal.transaction_id, "REFUND_TXN4");
    assert_eq!(reversal.status, TransactionStatus::Success);
    assert!(reversal.paid_at.is_some());

    let original_row = Payments::find_by_id(original.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(original_row.status, TransactionStatus::Success);
    assert_eq!(original_row.amount, original.amount);

    let booking = booking_service::get_booking(&state, alice.scope(), refund_booking)
        .await?
        .data
        .unwrap()
        .booking;
    assert_eq!(booking.payment_status, PaymentStatus::Refunded);
    assert_eq!(booking.status, BookingStatus::Cancelled);

    // Exactly one reversal: a second refund is rejected.
    let err = payment_service::refund_payment(&state, admin.user_id, original.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let rows = Payments::find()
        .filter(axum_tour_api::entity::payments::Column::BookingId.eq(refund_booking))
        .all(&state.orm)
        .await?;
    assert_eq!(rows.len(), 2);

    Ok(())
}

async fn make_booking(
    state: &AppState,
    user: &AuthUser,
    tour_id: Uuid,
) -> anyhow::Result<Uuid> {
    let booking = booking_service::create_booking(
        state,
        user,
        CreateBookingRequest {
            tour_id,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            adults: 1,
            children: 0,
        },
    )
    .await?
    .data
    .unwrap();
    Ok(booking.id)
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(&pool);
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE payments, bookings, reviews, tour_schedules, tour_images, tours, tour_categories, refresh_tokens, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        user_name: Set(email.split('@').next().unwrap_or("user").to_string()),
        first_name: Set("Test".into()),
        last_name: Set("User".into()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

async fn create_tour(state: &AppState, price: i64) -> anyhow::Result<Uuid> {
    let tour = TourActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(None),
        title: Set("Refund Tour".into()),
        description: Set(Some("A tour for refund tests".into())),
        location: Set("Da Nang".into()),
        duration_days: Set(2),
        price: Set(price),
        cover_image: Set(None),
        basic_info: Set(None),
        highlight_info: Set(None),
        status: Set(TourStatus::Active),
        rating_avg: Set(0.0),
        rating_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(tour.id)
}
