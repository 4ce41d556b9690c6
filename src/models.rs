use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;
use crate::entity::enums::{
    BookingStatus, PaymentMethod, PaymentStatus, ReviewStatus, TourStatus, TransactionStatus,
};
use crate::entity::tours::{BasicInfo, HighlightInfo};

/// Public view of a user; the credential hash never leaves the service layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        Self {
            id: model.id,
            user_name: model.user_name,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TourCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::tour_categories::Model> for TourCategory {
    fn from(model: entity::tour_categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Tour {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub duration_days: i32,
    pub price: i64,
    pub cover_image: Option<String>,
    pub basic_info: Option<BasicInfo>,
    pub highlight_info: Option<HighlightInfo>,
    pub status: TourStatus,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::tours::Model> for Tour {
    fn from(model: entity::tours::Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            location: model.location,
            duration_days: model.duration_days,
            price: model.price,
            cover_image: model.cover_image,
            basic_info: model.basic_info,
            highlight_info: model.highlight_info,
            status: model.status,
            rating_avg: model.rating_avg,
            rating_count: model.rating_count,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TourImage {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub image_url: String,
    pub sort_order: i32,
}

impl From<entity::tour_images::Model> for TourImage {
    fn from(model: entity::tour_images::Model) -> Self {
        Self {
            id: model.id,
            tour_id: model.tour_id,
            image_url: model.image_url,
            sort_order: model.sort_order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TourSchedule {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub day_number: i32,
    pub title: String,
    pub description: Option<String>,
}

impl From<entity::tour_schedules::Model> for TourSchedule {
    fn from(model: entity::tour_schedules::Model) -> Self {
        Self {
            id: model.id,
            tour_id: model.tour_id,
            day_number: model.day_number,
            title: model.title,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tour_id: Uuid,
    pub start_date: NaiveDate,
    pub adults: i32,
    pub children: i32,
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::bookings::Model> for Booking {
    fn from(model: entity::bookings::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            tour_id: model.tour_id,
            start_date: model.start_date,
            adults: model.adults,
            children: model.children,
            total_price: model.total_price,
            status: model.status,
            payment_status: model.payment_status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: i64,
    pub method: PaymentMethod,
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::payments::Model> for Payment {
    fn from(model: entity::payments::Model) -> Self {
        Self {
            id: model.id,
            booking_id: model.booking_id,
            amount: model.amount,
            method: model.method,
            transaction_id: model.transaction_id,
            status: model.status,
            paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tour_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

impl From<entity::reviews::Model> for Review {
    fn from(model: entity::reviews::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            tour_id: model.tour_id,
            rating: model.rating,
            comment: model.comment,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
