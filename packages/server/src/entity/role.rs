use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ADMIN: &str = "admin";
pub const STAFF: &str = "staff";
pub const EMPLOYEE: &str = "employee";

/// All roles, in decreasing order of privilege.
pub const ALL: &[&str] = &[ADMIN, STAFF, EMPLOYEE];

/// The role assigned to users created without an explicit role.
pub const DEFAULT_ROLE: &str = EMPLOYEE;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    #[sea_orm(has_many)]
    pub users: HasMany<super::user::Entity>,

    #[sea_orm(has_many)]
    pub permissions: HasMany<super::role_permission::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
