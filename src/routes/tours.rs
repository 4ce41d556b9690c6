use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList},
    dto::tours::{TourDetail, TourList},
    entity::enums::TourStatus,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    routes::params::{ReviewListQuery, SelectionQuery, TourQuery},
    services::{review_service, tour_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tours))
        .route("/search", get(search_tours))
        .route("/popular", get(popular_tours))
        .route("/latest", get(latest_tours))
        .route("/{id}", get(get_tour))
        .route("/{id}/related", get(related_tours))
        .route("/{id}/reviews", get(list_reviews))
        .route("/{id}/reviews", post(create_review))
}

#[utoipa::path(
    get,
    path = "/api/tours",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Substring match on title/location/description"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("min_price" = Option<i64>, Query, description = "Minimum price"),
        ("max_price" = Option<i64>, Query, description = "Maximum price"),
        ("min_duration" = Option<i32>, Query, description = "Minimum duration in days"),
        ("max_duration" = Option<i32>, Query, description = "Maximum duration in days"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, rating_avg, duration_days"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses((status = 200, description = "List tours", body = ApiResponse<TourList>)),
    tag = "Tours"
)]
pub async fn list_tours(
    State(state): State<AppState>,
    Query(mut query): Query<TourQuery>,
) -> AppResult<Json<ApiResponse<TourList>>> {
    // The public catalog only shows tours that are open for sale.
    query.status.get_or_insert(TourStatus::Active);
    let resp = tour_service::list_tours(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/tours/search", tag = "Tours")]
pub async fn search_tours(
    State(state): State<AppState>,
    Query(mut query): Query<TourQuery>,
) -> AppResult<Json<ApiResponse<TourList>>> {
    query.status = Some(TourStatus::Active);
    let resp = tour_service::list_tours(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/tours/popular", tag = "Tours")]
pub async fn popular_tours(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> AppResult<Json<ApiResponse<TourList>>> {
    let resp = tour_service::popular_tours(&state, query.normalize()).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/tours/latest", tag = "Tours")]
pub async fn latest_tours(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> AppResult<Json<ApiResponse<TourList>>> {
    let resp = tour_service::latest_tours(&state, query.normalize()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tours/{id}",
    params(("id" = Uuid, Path, description = "Tour ID")),
    responses(
        (status = 200, description = "Tour with images and schedules", body = ApiResponse<TourDetail>),
        (status = 404, description = "Tour not found")
    ),
    tag = "Tours"
)]
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TourDetail>>> {
    let resp = tour_service::get_tour(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/tours/{id}/related", tag = "Tours")]
pub async fn related_tours(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SelectionQuery>,
) -> AppResult<Json<ApiResponse<TourList>>> {
    let resp = tour_service::related_tours(&state, id, query.normalize()).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/tours/{id}/reviews", tag = "Reviews")]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews_for_tour(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tours/{id}/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Invalid rating"),
        (status = 404, description = "Tour not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
