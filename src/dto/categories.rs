use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::TourCategory;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<TourCategory>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}
