use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::entity::{asset, asset_transaction, location, user};

use super::{EntityKind, LifecycleError, MAX_NOTES_LEN, Transition};

/// Asset row and ledger entry written by a successful transition.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub asset: asset::Model,
    pub entry: asset_transaction::Model,
}

/// Executes lifecycle transitions against the database.
pub struct LifecycleService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LifecycleService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Apply `transition` to asset `asset_id` on behalf of `actor_id`.
    ///
    /// The asset row is read with `FOR UPDATE`, so concurrent transitions on
    /// the same asset run one after another and each sees the status left by
    /// the previous one. The asset update and the ledger insert commit
    /// together or not at all. A checkout target user and a destination
    /// location are read `FOR SHARE`, which holds off a concurrent
    /// deactivation of that user or deletion of that location until commit.
    #[instrument(skip(self, notes), fields(action = %transition.action()))]
    pub async fn apply(
        &self,
        asset_id: i32,
        actor_id: i32,
        transition: Transition,
        notes: Option<String>,
    ) -> Result<Outcome, LifecycleError> {
        transition.validate()?;
        let notes = normalize_notes(notes)?;

        let txn = self.db.begin().await?;

        let current = find_asset_for_update(&txn, asset_id).await?;

        let target_user = match transition.target_user() {
            Some(user_id) => Some(
                user::Entity::find_by_id(user_id)
                    .lock(LockType::Share)
                    .one(&txn)
                    .await?
                    .ok_or(LifecycleError::not_found(EntityKind::User, user_id))?,
            ),
            None => None,
        };
        if let Some(location_id) = transition.target_location() {
            location::Entity::find_by_id(location_id)
                .lock(LockType::Share)
                .one(&txn)
                .await?
                .ok_or(LifecycleError::not_found(EntityKind::Location, location_id))?;
        }

        let effect = transition
            .plan(current.status, current.current_holder_id)
            .ok_or(LifecycleError::Conflict {
                asset_id,
                action: transition.action(),
                current: current.status,
            })?;

        if let Some(target) = target_user
            && !target.is_active
        {
            return Err(LifecycleError::InactiveUser(target.id));
        }

        let now = Utc::now();
        let holder = effect.resulting_holder(current.current_holder_id);
        let mut active: asset::ActiveModel = current.into();
        active.status = Set(effect.to);
        active.current_holder_id = Set(holder);
        if let Some(location_id) = effect.location_id {
            active.location_id = Set(location_id);
        }
        active.updated_at = Set(now);
        let asset = active.update(&txn).await?;

        debug_assert!(asset.holder_consistent(), "holder invariant violated");

        let entry = asset_transaction::ActiveModel {
            asset_id: Set(asset.id),
            action: Set(effect.action),
            from_status: Set(effect.from),
            to_status: Set(effect.to),
            user_id: Set(effect.subject_user_id),
            actor_id: Set(actor_id),
            location_id: Set(effect.location_id),
            condition: Set(effect.condition),
            notes: Set(notes),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            asset_id,
            actor_id,
            from = %effect.from,
            to = %effect.to,
            transaction_id = entry.id,
            "Asset transition applied"
        );

        Ok(Outcome { asset, entry })
    }
}

async fn find_asset_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<asset::Model, LifecycleError> {
    asset::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(LifecycleError::not_found(EntityKind::Asset, id))
}

fn normalize_notes(notes: Option<String>) -> Result<Option<String>, LifecycleError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let notes = notes.trim();
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(LifecycleError::Validation(format!(
            "Notes must be at most {MAX_NOTES_LEN} characters"
        )));
    }
    Ok((!notes.is_empty()).then(|| notes.to_string()))
}
