pub mod asset_status;
pub mod ledger;

pub use asset_status::AssetStatus;
pub use ledger::{AssetCondition, TransactionAction};

use thiserror::Error;

/// Error when parsing an invalid enum string (query parameters, CLI input).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field} '{invalid}'. Valid values: {valid}")]
pub struct ParseEnumError {
    field: &'static str,
    invalid: String,
    valid: String,
}

impl ParseEnumError {
    pub(crate) fn new<'a>(
        field: &'static str,
        invalid: &str,
        valid: impl Iterator<Item = &'a str>,
    ) -> Self {
        Self {
            field,
            invalid: invalid.to_string(),
            valid: valid.collect::<Vec<_>>().join(", "),
        }
    }

    /// Name of the field that failed to parse.
    pub fn field(&self) -> &'static str {
        self.field
    }
}
