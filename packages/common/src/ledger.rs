#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Kind of event recorded in the asset ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionAction {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "checkout"))]
    Checkout,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "checkin"))]
    Checkin,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "transfer"))]
    Transfer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "repair"))]
    Repair,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "repair_complete"))]
    RepairComplete,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dispose"))]
    Dispose,
}

impl TransactionAction {
    pub const ALL: &'static [TransactionAction] = &[
        Self::Checkout,
        Self::Checkin,
        Self::Transfer,
        Self::Repair,
        Self::RepairComplete,
        Self::Dispose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Checkin => "checkin",
            Self::Transfer => "transfer",
            Self::Repair => "repair",
            Self::RepairComplete => "repair_complete",
            Self::Dispose => "dispose",
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("action", s, Self::ALL.iter().map(|v| v.as_str())))
    }
}

/// Condition reported by the person checking an asset back in.
///
/// This is caller-asserted: the server does not inspect the asset, it only
/// branches on the reported value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "snake_case")]
pub enum AssetCondition {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "good"))]
    Good,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "damaged"))]
    Damaged,
}

impl AssetCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Damaged => "damaged",
        }
    }
}

impl fmt::Display for AssetCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
