use common::AssetStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Opaque external identifier printed on the asset label.
    #[sea_orm(unique)]
    pub asset_tag: Uuid,

    pub name: String,
    #[sea_orm(unique)]
    pub serial_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub specifications: Option<String>,
    pub purchase_date: Option<Date>,
    /// Purchase price in the smallest currency unit.
    pub purchase_cost_cents: Option<i64>,
    pub warranty_expiry: Option<Date>,
    #[sea_orm(column_type = "Text")]
    pub notes: Option<String>,

    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    /// Current physical location. Kept while the asset is checked out.
    pub location_id: i32,
    #[sea_orm(belongs_to, from = "location_id", to = "id")]
    pub location: HasOne<super::location::Entity>,

    /// Written only by the lifecycle service.
    #[sea_orm(indexed)]
    pub status: AssetStatus,

    /// Set if and only if `status` is `assigned`.
    pub current_holder_id: Option<i32>,
    #[sea_orm(belongs_to, from = "current_holder_id", to = "id")]
    pub current_holder: BelongsTo<Option<super::user::Entity>>,

    #[sea_orm(has_many)]
    pub transactions: HasMany<super::asset_transaction::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Whether the holder/status pairing is consistent.
    pub fn holder_consistent(&self) -> bool {
        self.status.requires_holder() == self.current_holder_id.is_some()
    }
}

impl ActiveModelBehavior for ActiveModel {}
