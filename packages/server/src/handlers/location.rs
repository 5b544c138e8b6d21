use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{Expr, Func, SimpleExpr, LockType};
use sea_orm::*;
use tracing::instrument;

use super::{conflict_on_unique, search_any};
use crate::entity::{asset, asset_transaction, location};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::location::*;
use crate::models::shared::{Pagination, like_pattern, page_params, trim_optional};
use crate::state::AppState;

const NAME_TAKEN: &str = "A location with this name already exists";

#[utoipa::path(
    post,
    path = "/",
    tag = "Locations",
    operation_id = "createLocation",
    summary = "Create a location",
    description = "Creates a location assets can be stored at. Requires `location:manage` permission. Names are unique.",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = LocationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_location(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("location:manage")?;
    validate_create_location(&payload)?;

    let now = chrono::Utc::now();
    let model = location::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        address: Set(trim_optional(payload.address)),
        description: Set(trim_optional(payload.description)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?;

    Ok((StatusCode::CREATED, Json(LocationResponse::new(model, 0))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Locations",
    operation_id = "listLocations",
    summary = "List locations",
    description = "Returns a paginated, name-ordered list of locations with their asset counts. Requires `asset:view` permission.",
    params(LocationListQuery),
    responses(
        (status = 200, description = "List of locations", body = LocationListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_locations(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LocationListQuery>,
) -> Result<Json<LocationListResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = location::Entity::find();
    if let Some(pattern) = like_pattern(query.search.as_deref()) {
        select = select.filter(search_any(
            [location::Column::Name, location::Column::Address],
            &pattern,
        ));
    }

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let models = select
        .order_by_asc(location::Column::Name)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let counts = asset_counts(&state.db, &ids).await?;

    let data = models
        .into_iter()
        .map(|m| {
            let count = counts.get(&m.id).copied().unwrap_or(0);
            LocationResponse::new(m, count)
        })
        .collect();

    Ok(Json(LocationListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Locations",
    operation_id = "getLocation",
    summary = "Get a location by ID",
    description = "Requires `asset:view` permission.",
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location details", body = LocationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_location(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LocationResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let model = find_location(&state.db, id).await?;
    let count = asset_counts(&state.db, &[id]).await?;
    Ok(Json(LocationResponse::new(
        model,
        count.get(&id).copied().unwrap_or(0),
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Locations",
    operation_id = "updateLocation",
    summary = "Update a location",
    description = "Partially updates a location. Requires `location:manage` permission.",
    params(("id" = i32, Path, description = "Location ID")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_location(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateLocationRequest>,
) -> Result<Json<LocationResponse>, AppError> {
    auth_user.require_permission("location:manage")?;
    validate_update_location(&payload)?;

    let model = if payload == UpdateLocationRequest::default() {
        find_location(&state.db, id).await?
    } else {
        let txn = state.db.begin().await?;
        let existing = find_location_for_update(&txn, id).await?;
        let mut active: location::ActiveModel = existing.into();

        if let Some(ref name) = payload.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(address) = payload.address {
            active.address = Set(trim_optional(address));
        }
        if let Some(description) = payload.description {
            active.description = Set(trim_optional(description));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&txn)
            .await
            .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?;
        txn.commit().await?;
        model
    };

    let count = asset_counts(&state.db, &[id]).await?;
    Ok(Json(LocationResponse::new(
        model,
        count.get(&id).copied().unwrap_or(0),
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Locations",
    operation_id = "deleteLocation",
    summary = "Delete a location",
    description = "Requires `location:manage` permission. Returns 409 CONFLICT while any asset is at the location or any ledger entry references it.",
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Location still referenced (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_location(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("location:manage")?;

    let txn = state.db.begin().await?;
    find_location_for_update(&txn, id).await?;

    let in_use = asset::Entity::find()
        .filter(asset::Column::LocationId.eq(id))
        .count(&txn)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete location with {in_use} asset(s)"
        )));
    }

    let history = asset_transaction::Entity::find()
        .filter(asset_transaction::Column::LocationId.eq(id))
        .count(&txn)
        .await?;
    if history > 0 {
        return Err(AppError::Conflict(
            "Cannot delete location referenced by the transaction ledger".into(),
        ));
    }

    location::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Number of assets per location, for the given location ids.
async fn asset_counts<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> Result<HashMap<i32, u64>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i64)> = asset::Entity::find()
        .select_only()
        .column(asset::Column::LocationId)
        .column_as(SimpleExpr::from(Func::count(Expr::col(asset::Column::Id))), "count")
        .filter(asset::Column::LocationId.is_in(ids.iter().copied()))
        .group_by(asset::Column::LocationId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, count as u64))
        .collect())
}

pub(crate) async fn find_location<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<location::Model, AppError> {
    location::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location {id} not found")))
}

async fn find_location_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<location::Model, AppError> {
    location::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location {id} not found")))
}
