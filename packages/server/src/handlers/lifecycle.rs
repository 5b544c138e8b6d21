//! Lifecycle endpoints. Each one translates its body into a
//! [`Transition`] and hands it to [`LifecycleService`]; none of them look at
//! the asset's status directly.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::lifecycle::{LifecycleService, Transition};
use crate::models::transaction::*;
use crate::state::AppState;

const LIFECYCLE_PERMISSION: &str = "asset:lifecycle";

async fn run(
    state: &AppState,
    auth_user: &AuthUser,
    asset_id: i32,
    transition: Transition,
    notes: Option<String>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    auth_user.require_permission(LIFECYCLE_PERMISSION)?;

    let outcome = LifecycleService::new(&state.db)
        .apply(asset_id, auth_user.user_id, transition, notes)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[utoipa::path(
    post,
    path = "/{id}/checkout",
    tag = "Lifecycle",
    operation_id = "checkoutAsset",
    summary = "Check an asset out to a user",
    description = "Assigns an `available` asset to an active user. Requires `asset:lifecycle` permission.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Asset checked out", body = TransitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset not available (INVALID_TRANSITION) or user deactivated (USER_INACTIVE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id))]
pub async fn checkout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    let (transition, notes) = payload.into_parts();
    run(&state, &auth_user, id, transition, notes).await
}

#[utoipa::path(
    post,
    path = "/{id}/checkin",
    tag = "Lifecycle",
    operation_id = "checkinAsset",
    summary = "Check an asset back in",
    description = "Returns an `assigned` asset from its holder. `good` makes it `available` at `location_id` (required); `damaged` sends it to `repair`, moving it only if `location_id` is given. The condition is taken as reported. Requires `asset:lifecycle` permission.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = CheckinRequest,
    responses(
        (status = 201, description = "Asset checked in", body = TransitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset or location not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset not assigned (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id))]
pub async fn checkin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CheckinRequest>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    let (transition, notes) = payload.into_parts();
    run(&state, &auth_user, id, transition, notes).await
}

#[utoipa::path(
    post,
    path = "/{id}/transfer",
    tag = "Lifecycle",
    operation_id = "transferAsset",
    summary = "Move an asset to another location",
    description = "Relocates an asset that nobody holds (`available`, `repair` or `retired`) without changing its status. Requires `asset:lifecycle` permission.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Asset transferred", body = TransitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset or location not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset is assigned (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id))]
pub async fn transfer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<TransferRequest>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    let (transition, notes) = payload.into_parts();
    run(&state, &auth_user, id, transition, notes).await
}

#[utoipa::path(
    post,
    path = "/{id}/repair",
    tag = "Lifecycle",
    operation_id = "sendAssetToRepair",
    summary = "Send an available asset to repair",
    description = "Requires `asset:lifecycle` permission. The body is optional. Assigned assets must be checked in as `damaged` instead.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = NotesRequest,
    responses(
        (status = 201, description = "Asset sent to repair", body = TransitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset not available (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id))]
pub async fn repair(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Option<AppJson<NotesRequest>>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    let notes = payload.and_then(|AppJson(body)| body.notes);
    run(&state, &auth_user, id, Transition::Repair, notes).await
}

#[utoipa::path(
    post,
    path = "/{id}/repair-complete",
    tag = "Lifecycle",
    operation_id = "completeAssetRepair",
    summary = "Return a repaired asset to service",
    description = "Moves an asset in `repair` back to `available` at `location_id`. Requires `asset:lifecycle` permission.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = RepairCompleteRequest,
    responses(
        (status = 201, description = "Repair completed", body = TransitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset or location not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset not in repair (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id))]
pub async fn repair_complete(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RepairCompleteRequest>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    let (transition, notes) = payload.into_parts();
    run(&state, &auth_user, id, transition, notes).await
}

#[utoipa::path(
    post,
    path = "/{id}/dispose",
    tag = "Lifecycle",
    operation_id = "disposeAsset",
    summary = "Retire an asset permanently",
    description = "Moves an `available` or `repair` asset to the terminal `retired` status. Requires `asset:lifecycle` permission. The body is optional.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = NotesRequest,
    responses(
        (status = 201, description = "Asset retired", body = TransitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset assigned or already retired (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(actor_id = auth_user.user_id))]
pub async fn dispose(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Option<AppJson<NotesRequest>>,
) -> Result<(StatusCode, Json<TransitionResponse>), AppError> {
    let notes = payload.and_then(|AppJson(body)| body.notes);
    run(&state, &auth_user, id, Transition::Dispose, notes).await
}
