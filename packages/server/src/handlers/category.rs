use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{Expr, Func, SimpleExpr, LockType};
use sea_orm::*;
use tracing::instrument;

use super::{conflict_on_unique, search_any};
use crate::entity::{asset, category};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::category::*;
use crate::models::shared::{Pagination, like_pattern, page_params, trim_optional};
use crate::state::AppState;

const NAME_TAKEN: &str = "A category with this name already exists";

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Creates an asset category. Requires `category:manage` permission. Names are unique.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("category:manage")?;
    validate_create_category(&payload)?;

    let now = chrono::Utc::now();
    let model = category::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(trim_optional(payload.description)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::new(model, 0))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Returns a paginated, name-ordered list of categories with their asset counts. Requires `asset:view` permission.",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "List of categories", body = CategoryListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_categories(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CategoryListQuery>,
) -> Result<Json<CategoryListResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = category::Entity::find();
    if let Some(pattern) = like_pattern(query.search.as_deref()) {
        select = select.filter(search_any([category::Column::Name], &pattern));
    }

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let models = select
        .order_by_asc(category::Column::Name)
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
            CategoryResponse::new(m, count)
        })
        .collect();

    Ok(Json(CategoryListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category by ID",
    description = "Requires `asset:view` permission.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, AppError> {
    auth_user.require_permission("asset:view")?;

    let model = find_category(&state.db, id).await?;
    let count = asset_counts(&state.db, &[id]).await?;
    Ok(Json(CategoryResponse::new(
        model,
        count.get(&id).copied().unwrap_or(0),
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Partially updates a category. Requires `category:manage` permission.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    auth_user.require_permission("category:manage")?;
    validate_update_category(&payload)?;

    let model = if payload == UpdateCategoryRequest::default() {
        find_category(&state.db, id).await?
    } else {
        let txn = state.db.begin().await?;
        let existing = find_category_for_update(&txn, id).await?;
        let mut active: category::ActiveModel = existing.into();

        if let Some(ref name) = payload.name {
            active.name = Set(name.trim().to_string());
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
    Ok(Json(CategoryResponse::new(
        model,
        count.get(&id).copied().unwrap_or(0),
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Requires `category:manage` permission. Returns 409 CONFLICT while any asset belongs to the category.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Category still has assets (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("category:manage")?;

    let txn = state.db.begin().await?;
    find_category_for_update(&txn, id).await?;

    let in_use = asset::Entity::find()
        .filter(asset::Column::CategoryId.eq(id))
        .count(&txn)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete category with {in_use} asset(s)"
        )));
    }

    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Number of assets per category, for the given category ids.
async fn asset_counts<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> Result<HashMap<i32, u64>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i64)> = asset::Entity::find()
        .select_only()
        .column(asset::Column::CategoryId)
        .column_as(SimpleExpr::from(Func::count(Expr::col(asset::Column::Id))), "count")
        .filter(asset::Column::CategoryId.is_in(ids.iter().copied()))
        .group_by(asset::Column::CategoryId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, count as u64))
        .collect())
}

pub(crate) async fn find_category<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}

async fn find_category_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}
