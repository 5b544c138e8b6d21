use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use super::{conflict_on_unique, search_any};
use crate::entity::{asset, asset_transaction, role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::{Pagination, like_pattern, page_params, trim_optional};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::hash;

const IDENTITY_TAKEN: &str = "Username or email already in use";

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user account",
    description = "Creates a user with the given role (default `employee`). Requires `user:manage` permission.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Username or email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(username = %payload.username))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:manage")?;
    validate_create_user(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        password: Set(hash),
        full_name: Set(payload.full_name.trim().to_string()),
        email: Set(trim_optional(payload.email)),
        role: Set(payload
            .role
            .unwrap_or_else(|| role::DEFAULT_ROLE.to_string())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, IDENTITY_TAKEN))?;

    tracing::info!(user_id = model.id, role = %model.role, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Returns a paginated list of users ordered by username. Requires `user:manage` permission.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = user::Entity::find();
    if let Some(pattern) = like_pattern(query.search.as_deref()) {
        select = select.filter(search_any(
            [
                user::Column::Username,
                user::Column::FullName,
                user::Column::Email,
            ],
            &pattern,
        ));
    }
    if let Some(ref role_name) = query.role {
        validate_role(role_name)?;
        select = select.filter(user::Column::Role.eq(role_name.as_str()));
    }
    if let Some(is_active) = query.is_active {
        select = select.filter(user::Column::IsActive.eq(is_active));
    }

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let data = select
        .order_by_asc(user::Column::Username)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    description = "Requires `user:manage` permission.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let model = find_user(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user account",
    description = "Partially updates a user. Requires `user:manage` permission. Deactivating a user who still holds assets returns 409 CONFLICT; check the assets in first.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email taken or user still holds assets (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("user:manage")?;
    validate_update_user(&payload)?;

    if payload == UpdateUserRequest::default() {
        let existing = find_user(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let password_hash = match payload.password {
        Some(ref password) => Some(
            hash::hash_password(password)
                .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?,
        ),
        None => None,
    };

    let txn = state.db.begin().await?;
    let existing = find_user_for_update(&txn, id).await?;

    if payload.is_active == Some(false) && existing.is_active {
        ensure_holds_nothing(&txn, id, "deactivate").await?;
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(ref full_name) = payload.full_name {
        active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(trim_optional(email));
    }
    if let Some(role_name) = payload.role {
        active.role = Set(role_name);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(hash) = password_hash {
        active.password = Set(hash);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active
        .update(&txn)
        .await
        .map_err(|e| conflict_on_unique(e, IDENTITY_TAKEN))?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user account",
    description = "Requires `user:manage` permission. Returns 409 CONFLICT if the user holds assets or appears in the transaction ledger; deactivate such users instead.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "User still referenced (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:manage")?;

    if id == auth_user.user_id {
        return Err(AppError::Conflict("Cannot delete your own account".into()));
    }

    let txn = state.db.begin().await?;
    find_user_for_update(&txn, id).await?;

    ensure_holds_nothing(&txn, id, "delete").await?;

    let history = asset_transaction::Entity::find()
        .filter(
            Condition::any()
                .add(asset_transaction::Column::UserId.eq(id))
                .add(asset_transaction::Column::ActorId.eq(id)),
        )
        .count(&txn)
        .await?;
    if history > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a user referenced by the transaction ledger; deactivate instead".into(),
        ));
    }

    user::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_holds_nothing(
    txn: &DatabaseTransaction,
    user_id: i32,
    verb: &str,
) -> Result<(), AppError> {
    let held = asset::Entity::find()
        .filter(asset::Column::CurrentHolderId.eq(user_id))
        .count(txn)
        .await?;
    if held > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot {verb} a user who holds {held} asset(s); check them in first"
        )));
    }
    Ok(())
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

async fn find_user_for_update(txn: &DatabaseTransaction, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}
