//! Asset lifecycle state machine.
//!
//! Every change to an asset's `status`, `current_holder_id` or `location_id`
//! goes through [`LifecycleService::apply`], which evaluates the
//! [`Transition`] table below against a row-locked read of the asset and
//! writes the asset update and its ledger entry in one database transaction.

mod error;
mod service;

pub use error::{EntityKind, LifecycleError};
pub use service::{LifecycleService, Outcome};

use common::{AssetCondition, AssetStatus, TransactionAction};

/// Maximum length of free-text notes attached to a ledger entry.
pub const MAX_NOTES_LEN: usize = 2000;

/// A requested lifecycle operation and its operation-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Hand an available asset to a user.
    Checkout { user_id: i32 },
    /// Take an asset back from its holder. A `Good` checkin makes it
    /// available at `location_id`; a `Damaged` one sends it to repair.
    Checkin {
        condition: AssetCondition,
        location_id: Option<i32>,
    },
    /// Move an asset that nobody holds.
    Transfer { location_id: i32 },
    Repair,
    RepairComplete { location_id: i32 },
    Dispose,
}

/// What happens to the holder column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderChange {
    Assign(i32),
    Clear,
    Keep,
}

/// Writes a permitted transition performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub action: TransactionAction,
    pub from: AssetStatus,
    pub to: AssetStatus,
    pub holder: HolderChange,
    /// New location of the asset, if the transition moves it.
    pub location_id: Option<i32>,
    /// User recorded on the ledger entry: the receiver on checkout, the
    /// returning holder on checkin.
    pub subject_user_id: Option<i32>,
    pub condition: Option<AssetCondition>,
}

/// One row of the transition table.
struct Rule {
    allowed_from: &'static [AssetStatus],
    to: AssetStatus,
    holder: HolderChange,
    location_id: Option<i32>,
    subject_user_id: Option<i32>,
    condition: Option<AssetCondition>,
}

impl Transition {
    pub fn action(&self) -> TransactionAction {
        match self {
            Transition::Checkout { .. } => TransactionAction::Checkout,
            Transition::Checkin { .. } => TransactionAction::Checkin,
            Transition::Transfer { .. } => TransactionAction::Transfer,
            Transition::Repair => TransactionAction::Repair,
            Transition::RepairComplete { .. } => TransactionAction::RepairComplete,
            Transition::Dispose => TransactionAction::Dispose,
        }
    }

    /// User that must exist (and be active) for this transition.
    pub fn target_user(&self) -> Option<i32> {
        match *self {
            Transition::Checkout { user_id } => Some(user_id),
            _ => None,
        }
    }

    /// Location that must exist for this transition.
    pub fn target_location(&self) -> Option<i32> {
        match *self {
            Transition::Checkin { location_id, .. } => location_id,
            Transition::Transfer { location_id } | Transition::RepairComplete { location_id } => {
                Some(location_id)
            }
            _ => None,
        }
    }

    /// Shape checks that need no database access.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if let Transition::Checkin {
            condition: AssetCondition::Good,
            location_id: None,
        } = self
        {
            return Err(LifecycleError::Validation(
                "location_id is required when checking in an asset in good condition".into(),
            ));
        }
        if let Some(user_id) = self.target_user()
            && user_id <= 0
        {
            return Err(LifecycleError::Validation("user_id must be positive".into()));
        }
        if let Some(location_id) = self.target_location()
            && location_id <= 0
        {
            return Err(LifecycleError::Validation(
                "location_id must be positive".into(),
            ));
        }
        Ok(())
    }

    fn rule(&self, current: AssetStatus, holder: Option<i32>) -> Rule {
        use AssetStatus::*;

        match *self {
            Transition::Checkout { user_id } => Rule {
                allowed_from: &[Available],
                to: Assigned,
                holder: HolderChange::Assign(user_id),
                location_id: None,
                subject_user_id: Some(user_id),
                condition: None,
            },
            Transition::Checkin {
                condition,
                location_id,
            } => Rule {
                allowed_from: &[Assigned],
                to: match condition {
                    AssetCondition::Good => Available,
                    AssetCondition::Damaged => Repair,
                },
                holder: HolderChange::Clear,
                location_id,
                subject_user_id: holder,
                condition: Some(condition),
            },
            Transition::Transfer { location_id } => Rule {
                allowed_from: &[Available, Repair, Retired],
                to: current,
                holder: HolderChange::Keep,
                location_id: Some(location_id),
                subject_user_id: None,
                condition: None,
            },
            Transition::Repair => Rule {
                allowed_from: &[Available],
                to: Repair,
                holder: HolderChange::Keep,
                location_id: None,
                subject_user_id: None,
                condition: None,
            },
            Transition::RepairComplete { location_id } => Rule {
                allowed_from: &[Repair],
                to: Available,
                holder: HolderChange::Keep,
                location_id: Some(location_id),
                subject_user_id: None,
                condition: None,
            },
            Transition::Dispose => Rule {
                allowed_from: &[Available, Repair],
                to: Retired,
                holder: HolderChange::Keep,
                location_id: None,
                subject_user_id: None,
                condition: None,
            },
        }
    }

    /// Statuses from which this transition may start.
    pub fn allowed_from(&self) -> &'static [AssetStatus] {
        self.rule(AssetStatus::Available, None).allowed_from
    }

    /// Evaluate the guard against the asset's current status and holder.
    ///
    /// Returns `None` when the transition is not permitted from `current`.
    pub fn plan(&self, current: AssetStatus, holder: Option<i32>) -> Option<Effect> {
        let rule = self.rule(current, holder);
        if !rule.allowed_from.contains(&current) {
            return None;
        }

        Some(Effect {
            action: self.action(),
            from: current,
            to: rule.to,
            holder: rule.holder,
            location_id: rule.location_id,
            subject_user_id: rule.subject_user_id,
            condition: rule.condition,
        })
    }
}

impl Effect {
    /// Holder after applying this effect to an asset that had `before`.
    pub fn resulting_holder(&self, before: Option<i32>) -> Option<i32> {
        match self.holder {
            HolderChange::Assign(user_id) => Some(user_id),
            HolderChange::Clear => None,
            HolderChange::Keep => before,
        }
    }
}
