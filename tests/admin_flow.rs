use axum_tour_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::admin::UpdateBookingStatusRequest,
    dto::bookings::CreateBookingRequest,
    dto::categories::CreateCategoryRequest,
    dto::payments::{CreatePaymentRequest, UpdatePaymentStatusRequest},
    dto::tours::{CreateTourRequest, TourImageInput, TourScheduleInput},
    entity::{TourImages, TourSchedules, users::ActiveModel as UserActive},
    entity::enums::{BookingStatus, PaymentMethod, PaymentStatus, TransactionStatus},
    error::AppError,
    middleware::auth::AuthUser,
    services::{admin_service, booking_service, category_service, payment_service, tour_service},
    state::AppState,
};
use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, Statement};
use uuid::Uuid;

// Admin surface: tour CRUD with the delete guard, privileged status
// overrides, and the reporting scans.
#[tokio::test]
async fn admin_crud_overrides_and_reports() -> anyhow::Result<()> {
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

    let user = create_user(&state, "USER", "user@example.com").await?;
    let admin = create_user(&state, "ADMIN", "admin@example.com").await?;

    // Role gate.
    let err = admin_service::dashboard(&state, &user).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = tour_service::create_tour(
        &state,
        &user,
        tour_request("Denied", None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Category and tour CRUD.
    let category = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Adventure".into(),
            description: Some("Off the beaten path".into()),
        },
    )
    .await?
    .data
    .unwrap();

    let booked_tour = tour_service::create_tour(
        &state,
        &admin,
        tour_request("Booked Tour", Some(category.id)),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(booked_tour.images.len(), 2);
    assert_eq!(booked_tour.schedules.len(), 2);

    let idle_tour = tour_service::create_tour(
        &state,
        &admin,
        tour_request("Idle Tour", Some(category.id)),
    )
    .await?
    .data
    .unwrap();

    let booking = booking_service::create_booking(
        &state,
        &user,
        CreateBookingRequest {
            tour_id: booked_tour.tour.id,
            start_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            adults: 2,
            children: 0,
        },
    )
    .await?
    .data
    .unwrap();

    // A tour with bookings cannot be deleted; one without can, and its
    // images and schedules go with it.
    let err = tour_service::delete_tour(&state, &admin, booked_tour.tour.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    tour_service::delete_tour(&state, &admin, idle_tour.tour.id).await?;
    let leftover_images = TourImages::find()
        .filter(axum_tour_api::entity::tour_images::Column::TourId.eq(idle_tour.tour.id))
        .count(&state.orm)
        .await?;
    let leftover_schedules = TourSchedules::find()
        .filter(axum_tour_api::entity::tour_schedules::Column::TourId.eq(idle_tour.tour.id))
        .count(&state.orm)
        .await?;
    assert_eq!(leftover_images, 0);
    assert_eq!(leftover_schedules, 0);

    // Privileged payment override: forcing SUCCESS marks the booking paid.
    let payment = payment_service::create_payment(
        &state,
        user.scope(),
        booking.id,
        CreatePaymentRequest {
            method: PaymentMethod::BankTransfer,
            transaction_id: Some("TXN-ADMIN".into()),
        },
    )
    .await?
    .data
    .unwrap();

    let forced = admin_service::override_payment_status(
        &state,
        &admin,
        payment.id,
        UpdatePaymentStatusRequest {
            status: TransactionStatus::Success,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(forced.status, TransactionStatus::Success);
    assert!(forced.paid_at.is_some());

    let detail = booking_service::get_booking(&state, user.scope(), booking.id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.booking.payment_status, PaymentStatus::Paid);

    // Privileged booking transition: COMPLETED is admin-only.
    let completed = admin_service::update_booking_status(
        &state,
        &admin,
        booking.id,
        UpdateBookingStatusRequest {
            status: BookingStatus::Completed,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // Reports fold over what we just created.
    let stats = admin_service::dashboard(&state, &admin).await?.data.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_tours, 1);
    assert_eq!(stats.total_bookings, 1);
    assert_eq!(stats.total_revenue, payment.amount);
    assert!(!stats.recent_bookings.is_empty());

    let revenue = admin_service::revenue_by_month(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(revenue.months.len(), 1);
    assert_eq!(revenue.months[0].revenue, payment.amount);
    assert_eq!(revenue.months[0].payments, 1);

    let top = admin_service::top_tours(&state, &admin, 10).await?.data.unwrap();
    assert_eq!(top.items.len(), 1);
    assert_eq!(top.items[0].tour_id, booked_tour.tour.id);
    assert_eq!(top.items[0].bookings, 1);
    assert_eq!(top.items[0].revenue, booking.total_price);

    let totals = admin_service::payment_totals(&state, &admin)
        .await?
        .data
        .unwrap();
    assert!(totals
        .totals
        .iter()
        .any(|t| t.status == "SUCCESS" && t.count == 1 && t.total_amount == payment.amount));

    Ok(())
}

fn tour_request(title: &str, category_id: Option<Uuid>) -> CreateTourRequest {
    CreateTourRequest {
        category_id,
        title: title.into(),
        description: Some("Created in tests".into()),
        location: "Hue".into(),
        duration_days: 2,
        price: 900_000,
        cover_image: None,
        basic_info: None,
        highlight_info: None,
        status: None,
        images: vec![
            TourImageInput {
                image_url: "https://img.example.com/1.jpg".into(),
                sort_order: 0,
            },
            TourImageInput {
                image_url: "https://img.example.com/2.jpg".into(),
                sort_order: 1,
            },
        ],
        schedules: vec![
            TourScheduleInput {
                day_number: 1,
                title: "Arrival".into(),
                description: None,
            },
            TourScheduleInput {
                day_number: 2,
                title: "Departure".into(),
                description: None,
            },
        ],
    }
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
