use common::AssetStatus;
use serde::Serialize;

use super::transaction::TransactionResponse;

/// Number of ledger entries included in the dashboard summary.
pub const RECENT_TRANSACTIONS: u64 = 10;

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    #[schema(example = "available")]
    pub status: AssetStatus,
    #[schema(example = 31)]
    pub count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryCount {
    #[schema(example = 1)]
    pub category_id: i32,
    #[schema(example = "Laptops")]
    pub name: String,
    #[schema(example = 12)]
    pub count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardSummary {
    #[schema(example = 57)]
    pub total_assets: u64,
    /// One entry per status, including statuses with no assets.
    pub by_status: Vec<StatusCount>,
    /// One entry per category, including empty categories.
    pub by_category: Vec<CategoryCount>,
    /// Most recent ledger entries, newest first.
    pub recent_transactions: Vec<TransactionResponse>,
}
