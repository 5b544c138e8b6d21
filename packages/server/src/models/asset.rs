use chrono::{DateTime, NaiveDate, Utc};
use common::AssetStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, double_option, validate_id, validate_name, validate_optional_text};
use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_SHORT_TEXT_LEN: usize = 128;
pub const MAX_LONG_TEXT_LEN: usize = 10_000;

/// Request body for registering a new asset. New assets always start
/// `available` with no holder.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAssetRequest {
    #[schema(example = "ThinkPad X1 Carbon")]
    pub name: String,
    #[schema(example = 1)]
    pub category_id: i32,
    /// Initial physical location.
    #[schema(example = 1)]
    pub location_id: i32,
    #[schema(example = "PF-3X9QK2")]
    pub serial_number: Option<String>,
    #[schema(example = "Lenovo")]
    pub brand: Option<String>,
    #[schema(example = "X1 Carbon Gen 11")]
    pub model: Option<String>,
    #[schema(example = "i7-1365U, 32GB RAM, 1TB SSD")]
    pub specifications: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    #[schema(example = 189_900)]
    pub purchase_cost_cents: Option<i64>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Administrative edit of descriptive fields.
///
/// Status, holder and location have no field here: they change only through
/// lifecycle operations. Unknown fields (including `status`) are rejected.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub brand: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub specifications: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub purchase_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub purchase_cost_cents: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub warranty_expiry: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AssetListQuery {
    /// Case-insensitive substring match on name, serial number, brand and model.
    pub search: Option<String>,
    /// One of `available`, `assigned`, `repair`, `retired`.
    #[param(example = "available")]
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    /// Current holder's user ID.
    pub holder_id: Option<i32>,
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// One of `created_at` (default), `updated_at`, `name`, `status`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssetResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub asset_tag: Uuid,
    #[schema(example = "ThinkPad X1 Carbon")]
    pub name: String,
    pub serial_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub specifications: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost_cents: Option<i64>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
    pub category_id: i32,
    pub location_id: i32,
    pub status: AssetStatus,
    /// Present only while the asset is `assigned`.
    pub current_holder_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssetListResponse {
    pub data: Vec<AssetResponse>,
    pub pagination: Pagination,
}

impl From<crate::entity::asset::Model> for AssetResponse {
    fn from(m: crate::entity::asset::Model) -> Self {
        Self {
            id: m.id,
            asset_tag: m.asset_tag,
            name: m.name,
            serial_number: m.serial_number,
            brand: m.brand,
            model: m.model,
            specifications: m.specifications,
            purchase_date: m.purchase_date,
            purchase_cost_cents: m.purchase_cost_cents,
            warranty_expiry: m.warranty_expiry,
            notes: m.notes,
            category_id: m.category_id,
            location_id: m.location_id,
            status: m.status,
            current_holder_id: m.current_holder_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_cost(cost: Option<i64>) -> Result<(), AppError> {
    if let Some(cost) = cost
        && cost < 0
    {
        return Err(AppError::Validation(
            "purchase_cost_cents must be >= 0".into(),
        ));
    }
    Ok(())
}

fn validate_dates(purchase: Option<NaiveDate>, warranty: Option<NaiveDate>) -> Result<(), AppError> {
    if let (Some(purchase), Some(warranty)) = (purchase, warranty)
        && warranty < purchase
    {
        return Err(AppError::Validation(
            "warranty_expiry must not be before purchase_date".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_asset(req: &CreateAssetRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name", MAX_NAME_LEN)?;
    validate_id(req.category_id, "category_id")?;
    validate_id(req.location_id, "location_id")?;
    if let Some(ref serial) = req.serial_number {
        validate_name(serial, "Serial number", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(req.brand.as_deref(), "Brand", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(req.model.as_deref(), "Model", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(
        req.specifications.as_deref(),
        "Specifications",
        MAX_LONG_TEXT_LEN,
    )?;
    validate_optional_text(req.notes.as_deref(), "Notes", MAX_LONG_TEXT_LEN)?;
    validate_cost(req.purchase_cost_cents)?;
    validate_dates(req.purchase_date, req.warranty_expiry)
}

pub fn validate_update_asset(req: &UpdateAssetRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name", MAX_NAME_LEN)?;
    }
    if let Some(category_id) = req.category_id {
        validate_id(category_id, "category_id")?;
    }
    if let Some(Some(ref serial)) = req.serial_number {
        validate_name(serial, "Serial number", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(Some(ref brand)) = req.brand {
        validate_optional_text(Some(brand), "Brand", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(Some(ref model)) = req.model {
        validate_optional_text(Some(model), "Model", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(Some(ref specs)) = req.specifications {
        validate_optional_text(Some(specs), "Specifications", MAX_LONG_TEXT_LEN)?;
    }
    if let Some(Some(ref notes)) = req.notes {
        validate_optional_text(Some(notes), "Notes", MAX_LONG_TEXT_LEN)?;
    }
    validate_cost(req.purchase_cost_cents.flatten())?;
    validate_dates(req.purchase_date.flatten(), req.warranty_expiry.flatten())
}
