use axum_tour_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::reviews::CreateReviewRequest,
    entity::Tours,
    entity::enums::TourStatus,
    entity::{tours::ActiveModel as TourActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::{Pagination, ReviewListQuery},
    services::review_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Review creation feeds the rolling rating aggregate; hidden reviews stay
// out of the public listing.
#[tokio::test]
async fn review_aggregate_and_visibility_flow() -> anyhow::Result<()> {
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
    let bob = create_user(&state, "USER", "bob@example.com").await?;
    let admin = create_user(&state, "ADMIN", "admin@example.com").await?;
    let tour_id = create_tour(&state).await?;

    let err = review_service::create_review(
        &state,
        &alice,
        tour_id,
        CreateReviewRequest {
            rating: 6,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = review_service::create_review(
        &state,
        &alice,
        Uuid::new_v4(),
        CreateReviewRequest {
            rating: 4,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    review_service::create_review(
        &state,
        &alice,
        tour_id,
        CreateReviewRequest {
            rating: 5,
            comment: Some("Wonderful".into()),
        },
    )
    .await?;

    let tour = Tours::find_by_id(tour_id).one(&state.orm).await?.unwrap();
    assert_eq!(tour.rating_count, 1);
    assert!((tour.rating_avg - 5.0).abs() < f64::EPSILON);

    let hidden_candidate = review_service::create_review(
        &state,
        &bob,
        tour_id,
        CreateReviewRequest {
            rating: 3,
            comment: Some("Average".into()),
        },
    )
    .await?
    .data
    .unwrap();

    let tour = Tours::find_by_id(tour_id).one(&state.orm).await?.unwrap();
    assert_eq!(tour.rating_count, 2);
    assert!((tour.rating_avg - 4.0).abs() < 1e-9);

    let listed = review_service::list_reviews_for_tour(&state, tour_id, list_query())
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 2);
    assert!(listed.items.iter().any(|r| r.author == "alice"));

    // Hiding removes it from the public listing but not the admin one.
    review_service::hide_review(&state, &admin, hidden_candidate.id).await?;

    let listed = review_service::list_reviews_for_tour(&state, tour_id, list_query())
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].rating, 5);

    let all = review_service::list_all_reviews(&state, &admin, list_query())
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 2);

    let err = review_service::hide_review(&state, &alice, hidden_candidate.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    review_service::delete_review(&state, &admin, hidden_candidate.id).await?;
    let all = review_service::list_all_reviews(&state, &admin, list_query())
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 1);

    Ok(())
}

fn list_query() -> ReviewListQuery {
    ReviewListQuery {
        pagination: Pagination {
            page: Some(1),
            limit: Some(20),
        },
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

async fn create_tour(state: &AppState) -> anyhow::Result<Uuid> {
    let tour = TourActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(None),
        title: Set("Review Tour".into()),
        description: Set(Some("A tour for review tests".into())),
        location: Set("Hoi An".into()),
        duration_days: Set(1),
        price: Set(300_000),
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
