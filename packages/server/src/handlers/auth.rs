use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{asset, role_permission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::asset::AssetResponse;
use crate::models::auth::{LoginRequest, LoginResponse, MeResponse, validate_login_request};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in and obtain a JWT",
    description = "Verifies the username and password and returns a bearer token carrying the user's role and permissions. Deactivated accounts are refused with 403 ACCOUNT_DISABLED.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account disabled (ACCOUNT_DISABLED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_active {
        tracing::debug!(user_id = user.id, "Login refused for deactivated account");
        return Err(AppError::AccountDisabled);
    }

    issue_token(&state, user).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/refresh",
    tag = "Auth",
    operation_id = "refreshToken",
    summary = "Exchange a valid token for a fresh one",
    description = "Re-reads the caller's account, so role or permission changes since the last login are picked up. Refused once the account has been deactivated or deleted.",
    responses(
        (status = 200, description = "New token issued", body = LoginResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Account disabled (ACCOUNT_DISABLED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn refresh(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    if !user.is_active {
        return Err(AppError::AccountDisabled);
    }

    issue_token(&state, user).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get current user info",
    description = "Returns the identity, role and permissions carried by the caller's token.",
    responses(
        (status = 200, description = "Current user info", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.user_id,
        username: auth_user.username,
        role: auth_user.role,
        permissions: auth_user.permissions,
    })
}

#[utoipa::path(
    get,
    path = "/me/assets",
    tag = "Auth",
    operation_id = "listMyAssets",
    summary = "List assets held by the current user",
    description = "Returns every asset currently checked out to the caller. Available to all authenticated users.",
    responses(
        (status = 200, description = "Assets held by the caller", body = Vec<AssetResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn my_assets(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssetResponse>>, AppError> {
    let assets = asset::Entity::find()
        .filter(asset::Column::CurrentHolderId.eq(auth_user.user_id))
        .order_by_asc(asset::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
}

async fn issue_token(state: &AppState, user: user::Model) -> Result<LoginResponse, AppError> {
    let permissions: Vec<String> = role_permission::Entity::find()
        .filter(role_permission::Column::Role.eq(&user.role))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|rp| rp.permission)
        .collect();

    let token = jwt::sign(
        user.id,
        &user.username,
        &user.role,
        permissions.clone(),
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(LoginResponse {
        token,
        username: user.username,
        role: user.role,
        permissions,
    })
}
