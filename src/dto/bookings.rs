use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Booking, Tour};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub tour_id: Uuid,
    pub start_date: NaiveDate,
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetail {
    pub booking: Booking,
    pub tour: Option<Tour>,
}
