use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapAdminConfig;
use crate::entity::{asset, asset_transaction, role, role_permission, user};
use crate::utils::hash;

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    (role::ADMIN, "asset:view"),
    (role::ADMIN, "asset:create"),
    (role::ADMIN, "asset:edit"),
    (role::ADMIN, "asset:delete"),
    (role::ADMIN, "asset:lifecycle"),
    (role::ADMIN, "transaction:view"),
    (role::ADMIN, "dashboard:view"),
    (role::ADMIN, "category:manage"),
    (role::ADMIN, "location:manage"),
    (role::ADMIN, "user:manage"),
    // Staff
    (role::STAFF, "asset:view"),
    (role::STAFF, "asset:create"),
    (role::STAFF, "asset:edit"),
    (role::STAFF, "asset:lifecycle"),
    (role::STAFF, "transaction:view"),
    (role::STAFF, "dashboard:view"),
    // Employees hold no permissions; they only see their own assets.
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in role::ALL {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => roles_inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => perms_inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure composite indexes and the holder check constraint exist.
///
/// SeaORM's schema-sync only creates single-column indexes, so these are
/// created manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Per-asset history, oldest first:
    // SELECT ... FROM asset_transaction WHERE asset_id = ? ORDER BY created_at
    let history = Index::create()
        .if_not_exists()
        .name("idx_asset_transaction_asset_created")
        .table(asset_transaction::Entity)
        .col(asset_transaction::Column::AssetId)
        .col(asset_transaction::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    // Inventory listing filtered by status within a category.
    let inventory = Index::create()
        .if_not_exists()
        .name("idx_asset_category_status")
        .table(asset::Entity)
        .col(asset::Column::CategoryId)
        .col(asset::Column::Status)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_asset_transaction_asset_created", history),
        ("idx_asset_category_status", inventory),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    // A holder is present exactly while the asset is assigned.
    let holder_check = r#"
        DO $$ BEGIN
            ALTER TABLE "asset" ADD CONSTRAINT "chk_asset_holder_iff_assigned"
                CHECK (("status" = 'assigned') = ("current_holder_id" IS NOT NULL));
        EXCEPTION WHEN duplicate_object THEN NULL;
        END $$;
    "#;
    match db.execute_unprepared(holder_check).await {
        Ok(_) => info!("Ensured constraint chk_asset_holder_iff_assigned exists"),
        Err(e) => tracing::warn!("Failed to add constraint chk_asset_holder_iff_assigned: {}", e),
    }

    Ok(())
}

/// Create the configured administrator account if its username is free.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    admin: Option<&BootstrapAdminConfig>,
) -> anyhow::Result<()> {
    let Some(admin) = admin else {
        return Ok(());
    };

    let exists = user::Entity::find()
        .filter(user::Column::Username.eq(admin.username.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        return Ok(());
    }

    let now = chrono::Utc::now();
    let result = user::Entity::insert(user::ActiveModel {
        username: Set(admin.username.clone()),
        password: Set(hash::hash_password(&admin.password)?),
        full_name: Set("Administrator".to_string()),
        role: Set(role::ADMIN.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(user::Column::Username).do_nothing().to_owned())
    .exec_without_returning(db)
    .await;

    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    info!(username = %admin.username, "Bootstrap administrator created");
    Ok(())
}
