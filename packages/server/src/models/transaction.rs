use chrono::{DateTime, Utc};
use common::{AssetCondition, AssetStatus, TransactionAction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::Pagination;
use crate::entity::{asset, asset_transaction};
use crate::lifecycle::{Outcome, Transition};

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    /// User receiving the asset. Must exist and be active.
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = "Onboarding laptop")]
    pub notes: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckinRequest {
    /// Reported condition. `good` returns the asset to `available`,
    /// `damaged` sends it to `repair`.
    #[schema(example = "good")]
    pub condition: AssetCondition,
    /// Return location. Required when `condition` is `good`.
    #[schema(example = 1)]
    pub location_id: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TransferRequest {
    #[schema(example = 3)]
    pub location_id: i32,
    pub notes: Option<String>,
}

/// Body for operations that take nothing but optional notes
/// (`repair`, `dispose`).
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NotesRequest {
    #[schema(example = "Battery swelling")]
    pub notes: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RepairCompleteRequest {
    /// Location the repaired asset is returned to.
    #[schema(example = 1)]
    pub location_id: i32,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    pub fn into_parts(self) -> (Transition, Option<String>) {
        (
            Transition::Checkout {
                user_id: self.user_id,
            },
            self.notes,
        )
    }
}

impl CheckinRequest {
    pub fn into_parts(self) -> (Transition, Option<String>) {
        (
            Transition::Checkin {
                condition: self.condition,
                location_id: self.location_id,
            },
            self.notes,
        )
    }
}

impl TransferRequest {
    pub fn into_parts(self) -> (Transition, Option<String>) {
        (
            Transition::Transfer {
                location_id: self.location_id,
            },
            self.notes,
        )
    }
}

impl RepairCompleteRequest {
    pub fn into_parts(self) -> (Transition, Option<String>) {
        (
            Transition::RepairComplete {
                location_id: self.location_id,
            },
            self.notes,
        )
    }
}

/// Custody fields of an asset after a lifecycle operation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AssetStateResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub asset_tag: Uuid,
    #[schema(example = "assigned")]
    pub status: AssetStatus,
    #[schema(example = 42)]
    pub current_holder_id: Option<i32>,
    #[schema(example = 1)]
    pub location_id: i32,
}

impl From<&asset::Model> for AssetStateResponse {
    fn from(m: &asset::Model) -> Self {
        Self {
            id: m.id,
            asset_tag: m.asset_tag,
            status: m.status,
            current_holder_id: m.current_holder_id,
            location_id: m.location_id,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TransactionResponse {
    #[schema(example = 101)]
    pub id: i32,
    #[schema(example = 7)]
    pub asset_id: i32,
    #[schema(example = "checkout")]
    pub action: TransactionAction,
    #[schema(example = "available")]
    pub from_status: AssetStatus,
    #[schema(example = "assigned")]
    pub to_status: AssetStatus,
    /// User receiving or returning the asset.
    pub user_id: Option<i32>,
    /// Admin or staff member who performed the operation.
    pub actor_id: i32,
    pub location_id: Option<i32>,
    pub condition: Option<AssetCondition>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<asset_transaction::Model> for TransactionResponse {
    fn from(m: asset_transaction::Model) -> Self {
        Self {
            id: m.id,
            asset_id: m.asset_id,
            action: m.action,
            from_status: m.from_status,
            to_status: m.to_status,
            user_id: m.user_id,
            actor_id: m.actor_id,
            location_id: m.location_id,
            condition: m.condition,
            notes: m.notes,
            created_at: m.created_at,
        }
    }
}

/// Result of a lifecycle operation: the asset's new custody state and the
/// ledger entry recording it.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TransitionResponse {
    pub asset: AssetStateResponse,
    pub transaction: TransactionResponse,
}

impl From<Outcome> for TransitionResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            asset: AssetStateResponse::from(&outcome.asset),
            transaction: outcome.entry.into(),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TransactionListQuery {
    /// Case-insensitive substring match on notes.
    pub search: Option<String>,
    pub asset_id: Option<i32>,
    /// One of `checkout`, `checkin`, `transfer`, `repair`, `repair_complete`, `dispose`.
    #[param(example = "checkout")]
    pub action: Option<String>,
    /// Subject user (receiver or returner).
    pub user_id: Option<i32>,
    pub actor_id: Option<i32>,
    /// Inclusive lower bound on `created_at` (RFC 3339).
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at` (RFC 3339).
    pub to: Option<DateTime<Utc>>,
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TransactionListResponse {
    pub data: Vec<TransactionResponse>,
    pub pagination: Pagination,
}
