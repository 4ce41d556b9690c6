use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::enums::TourStatus;
use crate::entity::tours::{BasicInfo, HighlightInfo};
use crate::models::{Tour, TourCategory, TourImage, TourSchedule};

#[derive(Debug, Serialize, ToSchema)]
pub struct TourList {
    pub items: Vec<Tour>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TourDetail {
    pub tour: Tour,
    pub category: Option<TourCategory>,
    pub images: Vec<TourImage>,
    pub schedules: Vec<TourSchedule>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TourImageInput {
    pub image_url: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TourScheduleInput {
    pub day_number: i32,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTourRequest {
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub duration_days: i32,
    pub price: i64,
    pub cover_image: Option<String>,
    pub basic_info: Option<BasicInfo>,
    pub highlight_info: Option<HighlightInfo>,
    pub status: Option<TourStatus>,
    #[serde(default)]
    pub images: Vec<TourImageInput>,
    #[serde(default)]
    pub schedules: Vec<TourScheduleInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTourRequest {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub duration_days: Option<i32>,
    pub price: Option<i64>,
    pub cover_image: Option<String>,
    pub basic_info: Option<BasicInfo>,
    pub highlight_info: Option<HighlightInfo>,
    pub status: Option<TourStatus>,
    /// When present, replaces the full image set.
    pub images: Option<Vec<TourImageInput>>,
    /// When present, replaces the full schedule set.
    pub schedules: Option<Vec<TourScheduleInput>>,
}
