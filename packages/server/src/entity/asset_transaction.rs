use common::{AssetCondition, AssetStatus, TransactionAction};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable ledger entry. Rows are only ever inserted, by the lifecycle
/// service, in the same database transaction as the asset update they record.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_transaction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub asset_id: i32,
    #[sea_orm(belongs_to, from = "asset_id", to = "id")]
    pub asset: HasOne<super::asset::Entity>,

    #[sea_orm(indexed)]
    pub action: TransactionAction,
    pub from_status: AssetStatus,
    pub to_status: AssetStatus,

    /// User receiving (checkout) or returning (checkin) the asset.
    #[sea_orm(indexed)]
    pub user_id: Option<i32>,
    #[sea_orm(belongs_to, relation_enum = "Subject", from = "user_id", to = "id")]
    pub user: BelongsTo<Option<super::user::Entity>>,

    /// Admin or staff member who performed the operation.
    pub actor_id: i32,
    #[sea_orm(belongs_to, relation_enum = "Actor", from = "actor_id", to = "id")]
    pub actor: HasOne<super::user::Entity>,

    /// Location applied by this transition, if it moved the asset.
    pub location_id: Option<i32>,
    #[sea_orm(belongs_to, from = "location_id", to = "id")]
    pub location: BelongsTo<Option<super::location::Entity>>,

    /// Reported condition; only recorded for checkins.
    pub condition: Option<AssetCondition>,

    #[sea_orm(column_type = "Text")]
    pub notes: Option<String>,

    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
