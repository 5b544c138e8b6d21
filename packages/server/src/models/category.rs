use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_name, validate_optional_text};
use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Laptops")]
    pub name: String,
    #[schema(example = "Portable computers issued to staff")]
    pub description: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    /// Send `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CategoryListQuery {
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Laptops")]
    pub name: String,
    pub description: Option<String>,
    /// Number of assets in this category.
    #[schema(example = 12)]
    pub asset_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryListResponse {
    pub data: Vec<CategoryResponse>,
    pub pagination: Pagination,
}

impl CategoryResponse {
    pub fn new(m: crate::entity::category::Model, asset_count: u64) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            asset_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name", MAX_NAME_LEN)?;
    validate_optional_text(req.description.as_deref(), "Description", MAX_DESCRIPTION_LEN)
}

pub fn validate_update_category(req: &UpdateCategoryRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name", MAX_NAME_LEN)?;
    }
    if let Some(Some(ref description)) = req.description {
        validate_optional_text(Some(description), "Description", MAX_DESCRIPTION_LEN)?;
    }
    Ok(())
}
