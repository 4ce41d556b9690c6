use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use axum_tour_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    let orm = create_orm_conn(&pool);
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "ADMIN").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123", "USER").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let user_name = email.split('@').next().unwrap_or(email);

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, user_name, first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_name)
    .bind("Demo")
    .bind(user_name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the user already exists, fetch the id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM tour_categories WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tour_categories (id, name, description) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let beach = ensure_category(pool, "Beach", "Sun, sand and sea").await?;
    let mountain = ensure_category(pool, "Mountain", "Trekking and highland escapes").await?;
    let city = ensure_category(pool, "City break", "Short urban getaways").await?;

    let tours = vec![
        (
            beach,
            "Ha Long Bay Cruise",
            "Two nights on a traditional junk among the karsts",
            "Ha Long, Vietnam",
            3,
            4_500_000_i64,
        ),
        (
            beach,
            "Phu Quoc Island Escape",
            "Snorkelling, night markets and beach time",
            "Phu Quoc, Vietnam",
            4,
            6_200_000_i64,
        ),
        (
            mountain,
            "Sapa Valley Trek",
            "Rice terraces and homestays with local guides",
            "Sapa, Vietnam",
            3,
            2_900_000_i64,
        ),
        (
            city,
            "Hanoi Old Quarter Weekend",
            "Street food tour and water puppet theatre",
            "Hanoi, Vietnam",
            2,
            1_500_000_i64,
        ),
    ];

    for (category_id, title, description, location, duration_days, price) in tours {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tours WHERE title = $1")
            .bind(title)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let tour_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO tours (id, category_id, title, description, location, duration_days, price, basic_info, highlight_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(tour_id)
        .bind(category_id)
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(duration_days)
        .bind(price)
        .bind(serde_json::json!({
            "departure": "Ho Chi Minh City",
            "transport": "Coach",
            "hotel": "3-star",
            "meal": "Breakfast included"
        }))
        .bind(serde_json::json!({ "highlights": ["Local guide", "Small group"] }))
        .execute(pool)
        .await?;

        for day in 1..=duration_days {
            sqlx::query(
                r#"
                INSERT INTO tour_schedules (id, tour_id, day_number, title, description)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(tour_id)
            .bind(day)
            .bind(format!("Day {day}"))
            .bind("Itinerary details")
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded categories and tours");
    Ok(())
}
