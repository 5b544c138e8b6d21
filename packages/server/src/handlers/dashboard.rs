use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use common::AssetStatus;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{asset, asset_transaction, category};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::*;
use crate::models::transaction::TransactionResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/summary",
    tag = "Dashboard",
    operation_id = "getDashboardSummary",
    summary = "Asset counts and recent activity",
    description = "Returns the total number of assets, counts per status and per category, and the most recent ledger entries. Requires `dashboard:view` permission.",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    auth_user.require_permission("dashboard:view")?;

    let status_rows: Vec<(AssetStatus, i64)> = asset::Entity::find()
        .select_only()
        .column(asset::Column::Status)
        .column_as(SimpleExpr::from(Func::count(Expr::col(asset::Column::Id))), "count")
        .group_by(asset::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;
    let per_status: HashMap<AssetStatus, u64> = status_rows
        .into_iter()
        .map(|(status, count)| (status, count as u64))
        .collect();

    let by_status: Vec<StatusCount> = AssetStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: per_status.get(&status).copied().unwrap_or(0),
        })
        .collect();
    let total_assets = by_status.iter().map(|s| s.count).sum();

    let category_rows: Vec<(i32, i64)> = asset::Entity::find()
        .select_only()
        .column(asset::Column::CategoryId)
        .column_as(SimpleExpr::from(Func::count(Expr::col(asset::Column::Id))), "count")
        .group_by(asset::Column::CategoryId)
        .into_tuple()
        .all(&state.db)
        .await?;
    let per_category: HashMap<i32, u64> = category_rows
        .into_iter()
        .map(|(id, count)| (id, count as u64))
        .collect();

    let by_category = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|c| CategoryCount {
            count: per_category.get(&c.id).copied().unwrap_or(0),
            category_id: c.id,
            name: c.name,
        })
        .collect();

    let recent_transactions = asset_transaction::Entity::find()
        .order_by_desc(asset_transaction::Column::CreatedAt)
        .order_by_desc(asset_transaction::Column::Id)
        .limit(Some(RECENT_TRANSACTIONS))
        .all(&state.db)
        .await?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(DashboardSummary {
        total_assets,
        by_status,
        by_category,
        recent_transactions,
    }))
}
