#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Custody status of an asset.
///
/// `Retired` is terminal: the only transition that leaves it is a relocation
/// (`transfer`), which keeps the status unchanged.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// In stock and free to be checked out.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "available"))]
    Available,
    /// Held by a user. The only status with a current holder.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "assigned"))]
    Assigned,
    /// Out of service for repair.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "repair"))]
    Repair,
    /// Permanently out of service.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "retired"))]
    Retired,
}

impl AssetStatus {
    pub const ALL: &'static [AssetStatus] =
        &[Self::Available, Self::Assigned, Self::Repair, Self::Retired];

    /// Whether an asset in this status must have a current holder.
    pub fn requires_holder(&self) -> bool {
        matches!(self, Self::Assigned)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Retired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Assigned => "assigned",
            Self::Repair => "repair",
            Self::Retired => "retired",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl FromStr for AssetStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("status", s, Self::ALL.iter().map(|v| v.as_str())))
    }
}
