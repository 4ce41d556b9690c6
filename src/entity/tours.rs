use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::TourStatus;

/// Practical details shown on the tour page. A closed record, not a free-form map.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema, Default,
)]
pub struct BasicInfo {
    pub departure: Option<String>,
    pub transport: Option<String>,
    pub hotel: Option<String>,
    pub meal: Option<String>,
}

#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema, Default,
)]
pub struct HighlightInfo {
    pub highlights: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub duration_days: i32,
    pub price: i64,
    pub cover_image: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub basic_info: Option<BasicInfo>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub highlight_info: Option<HighlightInfo>,
    pub status: TourStatus,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tour_categories::Entity",
        from = "Column::CategoryId",
        to = "super::tour_categories::Column::Id"
    )]
    TourCategories,
    #[sea_orm(has_many = "super::tour_images::Entity")]
    TourImages,
    #[sea_orm(has_many = "super::tour_schedules::Entity")]
    TourSchedules,
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::tour_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TourCategories.def()
    }
}

impl Related<super::tour_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TourImages.def()
    }
}

impl Related<super::tour_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TourSchedules.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
