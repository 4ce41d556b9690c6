use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::reviews::{AdminReviewList, CreateReviewRequest, ReviewList, ReviewWithAuthor},
    entity::{
        enums::ReviewStatus,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        tours::{ActiveModel as TourActive, Entity as Tours},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    response::{ApiResponse, Pagination},
    routes::params::ReviewListQuery,
    state::AppState,
};

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    tour_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".into()));
    }

    let tour = Tours::find_by_id(tour_id).one(&state.orm).await?;
    let tour = match tour {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        tour_id: Set(tour.id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        status: Set(ReviewStatus::Visible),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // Rolling aggregate, updated in a separate statement after the insert.
    // Not atomic with the review row; the aggregate can lag briefly.
    let new_count = tour.rating_count + 1;
    let new_avg =
        (tour.rating_avg * tour.rating_count as f64 + payload.rating as f64) / new_count as f64;

    let mut tour_active: TourActive = tour.into();
    tour_active.rating_avg = Set(new_avg);
    tour_active.rating_count = Set(new_count);
    tour_active.updated_at = Set(Utc::now().into());
    tour_active.update(&state.orm).await?;

    Ok(ApiResponse::success("Review created", review.into(), None))
}

pub async fn list_reviews_for_tour(
    state: &AppState,
    tour_id: Uuid,
    query: ReviewListQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let condition = Condition::all()
        .add(ReviewCol::TourId.eq(tour_id))
        .add(ReviewCol::Status.eq(ReviewStatus::Visible));

    let total = Reviews::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let items = Reviews::find()
        .filter(condition)
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, user)| ReviewWithAuthor {
            id: review.id,
            tour_id: review.tour_id,
            rating: review.rating,
            comment: review.comment,
            author: user.map(|u| u.user_name).unwrap_or_default(),
            created_at: review.created_at.with_timezone(&Utc),
        })
        .collect();

    let pagination = Pagination::new(page, limit, total);
    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(pagination),
    ))
}

pub async fn list_all_reviews(
    state: &AppState,
    user: &AuthUser,
    query: ReviewListQuery,
) -> AppResult<ApiResponse<AdminReviewList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let finder = Reviews::find().order_by_desc(ReviewCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    let pagination = Pagination::new(page, limit, total);
    Ok(ApiResponse::success(
        "Reviews",
        AdminReviewList { items },
        Some(pagination),
    ))
}

/// Hidden reviews stay out of public listings; the rating aggregate is not
/// rewound (same gap as review deletion).
pub async fn hide_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;

    let review = Reviews::find_by_id(id).one(&state.orm).await?;
    let review = match review {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: ReviewActive = review.into();
    active.status = Set(ReviewStatus::Hidden);
    let review = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Review hidden", review.into(), None))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Reviews::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success("Deleted", serde_json::json!({}), None))
}
