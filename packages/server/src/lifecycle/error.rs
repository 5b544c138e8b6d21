use std::fmt;

use common::{AssetStatus, TransactionAction};
use sea_orm::DbErr;
use thiserror::Error;

/// Kind of record a lifecycle operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Asset,
    User,
    Location,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Asset => "Asset",
            EntityKind::User => "User",
            EntityKind::Location => "Location",
        })
    }
}

/// Failure of a lifecycle operation.
///
/// Variants are reported in evaluation order: input validation, then
/// referenced records, then the state guard. A `Database` error aborts the
/// surrounding database transaction, so neither the asset update nor the
/// ledger insert is persisted.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i32 },

    #[error("Cannot {action} asset {asset_id}: asset is {current}")]
    Conflict {
        asset_id: i32,
        action: TransactionAction,
        current: AssetStatus,
    },

    #[error("User {0} is inactive and cannot receive assets")]
    InactiveUser(i32),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl LifecycleError {
    pub(crate) fn not_found(entity: EntityKind, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}
