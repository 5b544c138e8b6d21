use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::AssetStatus;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::category::find_category;
use super::location::find_location;
use super::{conflict_on_unique, search_any};
use crate::entity::{asset, asset_transaction};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::asset::*;
use crate::models::shared::{Pagination, is_ascending, like_pattern, page_params, trim_optional};
use crate::models::transaction::TransactionResponse;
use crate::state::AppState;

const SERIAL_TAKEN: &str = "An asset with this serial number already exists";

#[utoipa::path(
    post,
    path = "/",
    tag = "Assets",
    operation_id = "createAsset",
    summary = "Register a new asset",
    description = "Creates an asset in status `available` with no holder and a freshly generated `asset_tag`. Requires `asset:create` permission. Status, holder and location change afterwards only through the lifecycle endpoints.",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category or location not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Serial number taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("asset:create")?;
    validate_create_asset(&payload)?;

    let txn = state.db.begin().await?;
    find_category(&txn, payload.category_id).await?;
    find_location(&txn, payload.location_id).await?;

    let now = chrono::Utc::now();
    let model = asset::ActiveModel {
        asset_tag: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        serial_number: Set(trim_optional(payload.serial_number)),
        brand: Set(trim_optional(payload.brand)),
        model: Set(trim_optional(payload.model)),
        specifications: Set(trim_optional(payload.specifications)),
        purchase_date: Set(payload.purchase_date),
        purchase_cost_cents: Set(payload.purchase_cost_cents),
        warranty_expiry: Set(payload.warranty_expiry),
        notes: Set(trim_optional(payload.notes)),
        category_id: Set(payload.category_id),
        location_id: Set(payload.location_id),
        status: Set(AssetStatus::Available),
        current_holder_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| conflict_on_unique(e, SERIAL_TAKEN))?;
    txn.commit().await?;

    tracing::info!(asset_id = model.id, asset_tag = %model.asset_tag, "Asset registered");

    Ok((StatusCode::CREATED, Json(AssetResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Assets",
    operation_id = "listAssets",
    summary = "List assets with filters, search and pagination",
    description = "Returns a paginated list of assets. Requires `asset:view` permission. `search` is a case-insensitive substring match on name, serial number, brand and model; the remaining filters are exact and combine with AND.",
    params(AssetListQuery),
    responses(
        (status = 200, description = "List of assets", body = AssetListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_assets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AssetListQuery>,
) -> Result<Json<AssetListResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let sort_column = match query.sort_by.as_deref().unwrap_or("created_at") {
        "created_at" => asset::Column::CreatedAt,
        "updated_at" => asset::Column::UpdatedAt,
        "name" => asset::Column::Name,
        "status" => asset::Column::Status,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, name, status".into(),
            ));
        }
    };
    let sort_order = if is_ascending(query.sort_order.as_deref())? {
        Order::Asc
    } else {
        Order::Desc
    };

    let mut select = asset::Entity::find();
    if let Some(pattern) = like_pattern(query.search.as_deref()) {
        select = select.filter(search_any(
            [
                asset::Column::Name,
                asset::Column::SerialNumber,
                asset::Column::Brand,
                asset::Column::Model,
            ],
            &pattern,
        ));
    }
    if let Some(ref status) = query.status {
        let status: AssetStatus = status
            .parse()
            .map_err(|e: common::ParseEnumError| AppError::Validation(e.to_string()))?;
        select = select.filter(asset::Column::Status.eq(status));
    }
    if let Some(category_id) = query.category_id {
        select = select.filter(asset::Column::CategoryId.eq(category_id));
    }
    if let Some(location_id) = query.location_id {
        select = select.filter(asset::Column::LocationId.eq(location_id));
    }
    if let Some(holder_id) = query.holder_id {
        select = select.filter(asset::Column::CurrentHolderId.eq(holder_id));
    }

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let data = select
        .order_by(sort_column, sort_order)
        .order_by_asc(asset::Column::Id)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(AssetResponse::from)
        .collect();

    Ok(Json(AssetListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Assets",
    operation_id = "getAsset",
    summary = "Get an asset by ID",
    description = "Requires `asset:view` permission.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = AssetResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssetResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let model = find_asset(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/tag/{tag}",
    tag = "Assets",
    operation_id = "getAssetByTag",
    summary = "Look up an asset by its label tag",
    description = "Resolves the opaque `asset_tag` printed on the asset label. Requires `asset:view` permission.",
    params(("tag" = Uuid, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Asset details", body = AssetResponse),
        (status = 400, description = "Malformed tag (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_asset_by_tag(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<AssetResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let tag = Uuid::parse_str(tag.trim())
        .map_err(|_| AppError::Validation("Asset tag must be a UUID".into()))?;

    let model = asset::Entity::find()
        .filter(asset::Column::AssetTag.eq(tag))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with tag {tag} not found")))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Assets",
    operation_id = "updateAsset",
    summary = "Edit an asset's descriptive fields",
    description = "Partially updates descriptive fields using PATCH semantics. Requires `asset:edit` permission. `status`, `current_holder_id` and `location_id` are not accepted here; use the lifecycle endpoints.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Validation error or lifecycle field supplied (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset or category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Serial number taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAssetRequest>,
) -> Result<Json<AssetResponse>, AppError> {
    auth_user.require_permission("asset:edit")?;
    validate_update_asset(&payload)?;

    if payload == UpdateAssetRequest::default() {
        let existing = find_asset(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_asset_for_update(&txn, id).await?;

    // A date supplied alone still has to be ordered against the stored one.
    let purchase = payload.purchase_date.unwrap_or(existing.purchase_date);
    let warranty = payload.warranty_expiry.unwrap_or(existing.warranty_expiry);
    if let (Some(purchase), Some(warranty)) = (purchase, warranty)
        && warranty < purchase
    {
        return Err(AppError::Validation(
            "warranty_expiry must not be before purchase_date".into(),
        ));
    }

    if let Some(category_id) = payload.category_id {
        find_category(&txn, category_id).await?;
    }

    let mut active: asset::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(serial_number) = payload.serial_number {
        active.serial_number = Set(trim_optional(serial_number));
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(trim_optional(brand));
    }
    if let Some(model) = payload.model {
        active.model = Set(trim_optional(model));
    }
    if let Some(specifications) = payload.specifications {
        active.specifications = Set(trim_optional(specifications));
    }
    if let Some(purchase_date) = payload.purchase_date {
        active.purchase_date = Set(purchase_date);
    }
    if let Some(cost) = payload.purchase_cost_cents {
        active.purchase_cost_cents = Set(cost);
    }
    if let Some(warranty_expiry) = payload.warranty_expiry {
        active.warranty_expiry = Set(warranty_expiry);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(trim_optional(notes));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active
        .update(&txn)
        .await
        .map_err(|e| conflict_on_unique(e, SERIAL_TAKEN))?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Assets",
    operation_id = "deleteAsset",
    summary = "Delete an asset",
    description = "Permanently deletes an asset that was never used. Requires `asset:delete` permission. Returns 409 CONFLICT if the asset is assigned or has any transaction history; dispose of it instead.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset assigned or has history (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("asset:delete")?;

    let txn = state.db.begin().await?;
    let existing = find_asset_for_update(&txn, id).await?;

    if existing.status == AssetStatus::Assigned {
        return Err(AppError::Conflict(
            "Cannot delete an assigned asset; check it in first".into(),
        ));
    }

    let history = asset_transaction::Entity::find()
        .filter(asset_transaction::Column::AssetId.eq(id))
        .count(&txn)
        .await?;
    if history > 0 {
        return Err(AppError::Conflict(
            "Cannot delete an asset with transaction history; dispose of it instead".into(),
        ));
    }

    asset::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/transactions",
    tag = "Assets",
    operation_id = "listAssetTransactions",
    summary = "Get an asset's transaction history",
    description = "Returns every ledger entry for the asset, oldest first. Requires `transaction:view` permission.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<TransactionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn asset_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    auth_user.require_permission("transaction:view")?;

    find_asset(&state.db, id).await?;

    let entries = asset_transaction::Entity::find()
        .filter(asset_transaction::Column::AssetId.eq(id))
        .order_by_asc(asset_transaction::Column::CreatedAt)
        .order_by_asc(asset_transaction::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        entries.into_iter().map(TransactionResponse::from).collect(),
    ))
}

async fn find_asset<C: ConnectionTrait>(db: &C, id: i32) -> Result<asset::Model, AppError> {
    asset::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {id} not found")))
}

async fn find_asset_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<asset::Model, AppError> {
    asset::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {id} not found")))
}
