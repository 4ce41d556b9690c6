use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    state::AppState,
    audit::log_audit,
    dto::tours::{CreateTourRequest, TourDetail, TourList, UpdateTourRequest},
    entity::{
        bookings::{Column as BookingCol, Entity as Bookings},
        enums::TourStatus,
        tour_categories::Entity as TourCategories,
        tour_images::{ActiveModel as TourImageActive, Column as TourImageCol, Entity as TourImages},
        tour_schedules::{
            ActiveModel as TourScheduleActive, Column as TourScheduleCol, Entity as TourSchedules,
        },
        tours::{ActiveModel as TourActive, Column as TourCol, Entity as Tours},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Tour,
    response::{ApiResponse, Pagination},
    routes::params::{SortOrder, TourQuery, TourSortBy},
};

fn build_condition(query: &TourQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(status) = query.status {
        condition = condition.add(TourCol::Status.eq(status));
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(TourCol::CategoryId.eq(category_id));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(TourCol::Title).ilike(pattern.clone()))
                .add(Expr::col(TourCol::Location).ilike(pattern.clone()))
                .add(Expr::col(TourCol::Description).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(TourCol::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(TourCol::Price.lte(max_price));
    }
    if let Some(min_duration) = query.min_duration {
        condition = condition.add(TourCol::DurationDays.gte(min_duration));
    }
    if let Some(max_duration) = query.max_duration {
        condition = condition.add(TourCol::DurationDays.lte(max_duration));
    }

    condition
}

pub async fn list_tours(state: &AppState, query: TourQuery) -> AppResult<ApiResponse<TourList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let condition = build_condition(&query);

    let sort_by = query.sort_by.unwrap_or(TourSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        TourSortBy::CreatedAt => TourCol::CreatedAt,
        TourSortBy::Price => TourCol::Price,
        TourSortBy::RatingAvg => TourCol::RatingAvg,
        TourSortBy::DurationDays => TourCol::DurationDays,
    };

    let mut finder = Tours::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Tour::from)
        .collect();

    let pagination = Pagination::new(page, limit, total);
    Ok(ApiResponse::success(
        "Tours",
        TourList { items },
        Some(pagination),
    ))
}

pub async fn get_tour(state: &AppState, id: Uuid) -> AppResult<ApiResponse<TourDetail>> {
    let tour = Tours::find_by_id(id).one(&state.orm).await?;
    let tour = match tour {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let category = match tour.category_id {
        Some(category_id) => TourCategories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .map(Into::into),
        None => None,
    };

    let images = TourImages::find()
        .filter(TourImageCol::TourId.eq(tour.id))
        .order_by_asc(TourImageCol::SortOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let schedules = TourSchedules::find()
        .filter(TourScheduleCol::TourId.eq(tour.id))
        .order_by_asc(TourScheduleCol::DayNumber)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let detail = TourDetail {
        tour: tour.into(),
        category,
        images,
        schedules,
    };

    Ok(ApiResponse::success("Tour", detail, None))
}

pub async fn popular_tours(state: &AppState, limit: u64) -> AppResult<ApiResponse<TourList>> {
    let items = Tours::find()
        .filter(TourCol::Status.eq(TourStatus::Active))
        .order_by_desc(TourCol::RatingAvg)
        .order_by_desc(TourCol::RatingCount)
        .limit(limit)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Tour::from)
        .collect();

    Ok(ApiResponse::success("Popular tours", TourList { items }, None))
}

pub async fn latest_tours(state: &AppState, limit: u64) -> AppResult<ApiResponse<TourList>> {
    let items = Tours::find()
        .filter(TourCol::Status.eq(TourStatus::Active))
        .order_by_desc(TourCol::CreatedAt)
        .limit(limit)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Tour::from)
        .collect();

    Ok(ApiResponse::success("Latest tours", TourList { items }, None))
}

/// Same category, excluding the tour itself; empty when it has no category.
pub async fn related_tours(
    state: &AppState,
    id: Uuid,
    limit: u64,
) -> AppResult<ApiResponse<TourList>> {
    let tour = Tours::find_by_id(id).one(&state.orm).await?;
    let tour = match tour {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let items = match tour.category_id {
        Some(category_id) => Tours::find()
            .filter(
                Condition::all()
                    .add(TourCol::CategoryId.eq(category_id))
                    .add(TourCol::Id.ne(tour.id))
                    .add(TourCol::Status.eq(TourStatus::Active)),
            )
            .order_by_desc(TourCol::RatingAvg)
            .limit(limit)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(Tour::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(ApiResponse::success("Related tours", TourList { items }, None))
}

pub async fn create_tour(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTourRequest,
) -> AppResult<ApiResponse<TourDetail>> {
    ensure_admin(user)?;

    if payload.duration_days < 1 {
        return Err(AppError::Validation("duration_days must be at least 1".into()));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let id = Uuid::new_v4();
    let tour = TourActive {
        id: Set(id),
        category_id: Set(payload.category_id),
        title: Set(payload.title),
        description: Set(payload.description),
        location: Set(payload.location),
        duration_days: Set(payload.duration_days),
        price: Set(payload.price),
        cover_image: Set(payload.cover_image),
        basic_info: Set(payload.basic_info),
        highlight_info: Set(payload.highlight_info),
        status: Set(payload.status.unwrap_or(TourStatus::Active)),
        rating_avg: Set(0.0),
        rating_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    insert_images(state, tour.id, &payload.images).await?;
    insert_schedules(state, tour.id, &payload.schedules).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "tour_create",
        Some("tours"),
        Some(serde_json::json!({ "tour_id": tour.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut resp = get_tour(state, tour.id).await?;
    resp.message = "Tour created".into();
    Ok(resp)
}

pub async fn update_tour(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTourRequest,
) -> AppResult<ApiResponse<TourDetail>> {
    ensure_admin(user)?;

    let existing = Tours::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let mut active: TourActive = existing.into();
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(duration_days) = payload.duration_days {
        active.duration_days = Set(duration_days);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(cover_image) = payload.cover_image {
        active.cover_image = Set(Some(cover_image));
    }
    if let Some(basic_info) = payload.basic_info {
        active.basic_info = Set(Some(basic_info));
    }
    if let Some(highlight_info) = payload.highlight_info {
        active.highlight_info = Set(Some(highlight_info));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
    let tour = active.update(&state.orm).await?;

    // Replace-on-update; not transactional, a partial failure leaves the
    // previous set removed (accepted gap).
    if let Some(images) = payload.images.as_deref() {
        TourImages::delete_many()
            .filter(TourImageCol::TourId.eq(tour.id))
            .exec(&state.orm)
            .await?;
        insert_images(state, tour.id, images).await?;
    }
    if let Some(schedules) = payload.schedules.as_deref() {
        TourSchedules::delete_many()
            .filter(TourScheduleCol::TourId.eq(tour.id))
            .exec(&state.orm)
            .await?;
        insert_schedules(state, tour.id, schedules).await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "tour_update",
        Some("tours"),
        Some(serde_json::json!({ "tour_id": tour.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut resp = get_tour(state, tour.id).await?;
    resp.message = "Updated".into();
    Ok(resp)
}

pub async fn delete_tour(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let tour = Tours::find_by_id(id).one(&state.orm).await?;
    if tour.is_none() {
        return Err(AppError::NotFound);
    }

    let bookings = Bookings::find()
        .filter(BookingCol::TourId.eq(id))
        .count(&state.orm)
        .await?;
    if bookings > 0 {
        return Err(AppError::Conflict(
            "Tour has bookings and cannot be deleted".into(),
        ));
    }

    // Images, schedules and reviews cascade at the store level.
    Tours::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "tour_delete",
        Some("tours"),
        Some(serde_json::json!({ "tour_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Deleted", serde_json::json!({}), None))
}

async fn insert_images(
    state: &AppState,
    tour_id: Uuid,
    images: &[crate::dto::tours::TourImageInput],
) -> AppResult<()> {
    for image in images {
        TourImageActive {
            id: Set(Uuid::new_v4()),
            tour_id: Set(tour_id),
            image_url: Set(image.image_url.clone()),
            sort_order: Set(image.sort_order),
        }
        .insert(&state.orm)
        .await?;
    }
    Ok(())
}

async fn insert_schedules(
    state: &AppState,
    tour_id: Uuid,
    schedules: &[crate::dto::tours::TourScheduleInput],
) -> AppResult<()> {
    for schedule in schedules {
        TourScheduleActive {
            id: Set(Uuid::new_v4()),
            tour_id: Set(tour_id),
            day_number: Set(schedule.day_number),
            title: Set(schedule.title.clone()),
            description: Set(schedule.description.clone()),
        }
        .insert(&state.orm)
        .await?;
    }
    Ok(())
}

