use axum::Json;
use axum::extract::{Path, State};
use common::TransactionAction;
use sea_orm::*;
use tracing::instrument;

use super::search_any;
use crate::entity::asset_transaction;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::models::shared::{Pagination, like_pattern, page_params};
use crate::models::transaction::{
    TransactionListQuery, TransactionListResponse, TransactionResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Transactions",
    operation_id = "listTransactions",
    summary = "Search the transaction ledger",
    description = "Returns ledger entries newest first. Requires `transaction:view` permission. `from` and `to` are inclusive RFC 3339 bounds on `created_at`; `search` matches notes case-insensitively. Filters combine with AND.",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Ledger entries", body = TransactionListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_transactions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    auth_user.require_permission("transaction:view")?;

    let (page, per_page) = page_params(query.page, query.per_page);

    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(AppError::Validation("from must not be after to".into()));
    }

    let mut select = asset_transaction::Entity::find();
    if let Some(pattern) = like_pattern(query.search.as_deref()) {
        select = select.filter(search_any([asset_transaction::Column::Notes], &pattern));
    }
    if let Some(asset_id) = query.asset_id {
        select = select.filter(asset_transaction::Column::AssetId.eq(asset_id));
    }
    if let Some(ref action) = query.action {
        let action: TransactionAction = action
            .parse()
            .map_err(|e: common::ParseEnumError| AppError::Validation(e.to_string()))?;
        select = select.filter(asset_transaction::Column::Action.eq(action));
    }
    if let Some(user_id) = query.user_id {
        select = select.filter(asset_transaction::Column::UserId.eq(user_id));
    }
    if let Some(actor_id) = query.actor_id {
        select = select.filter(asset_transaction::Column::ActorId.eq(actor_id));
    }
    if let Some(from) = query.from {
        select = select.filter(asset_transaction::Column::CreatedAt.gte(from));
    }
    if let Some(to) = query.to {
        select = select.filter(asset_transaction::Column::CreatedAt.lte(to));
    }

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let data = select
        .order_by_desc(asset_transaction::Column::CreatedAt)
        .order_by_desc(asset_transaction::Column::Id)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(TransactionListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Transactions",
    operation_id = "getTransaction",
    summary = "Get a ledger entry by ID",
    description = "Requires `transaction:view` permission.",
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Ledger entry", body = TransactionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Transaction not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_transaction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TransactionResponse>, AppError> {
    auth_user.require_permission("transaction:view")?;

    let entry = asset_transaction::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {id} not found")))?;

    Ok(Json(entry.into()))
}
