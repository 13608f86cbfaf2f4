use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// One integrity problem found in externally supplied lot data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotIntegrityIssue {
    pub lot_id: String,
    pub message: String,
}

impl std::fmt::Display for LotIntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lot {}: {}", self.lot_id, self.message)
    }
}

/// Errors from lot allocation.
#[derive(Error, Debug)]
pub enum LotError {
    /// Requested disposal quantity exceeds what the eligible lots hold.
    /// Never partially satisfied.
    #[error("Insufficient quantity in lots: needed {needed}, found {found}")]
    InsufficientLots { needed: Decimal, found: Decimal },

    #[error("Unknown cost basis method: {0}")]
    UnknownCostBasisMethod(String),

    #[error("Specific lot IDs required for the SpecificID method")]
    MissingSpecificLotIds,

    /// A caller-supplied lot id matched no available lot.
    #[error("Lot not found among available lots: {lot_id}")]
    LotNotFound { lot_id: String },

    #[error("Disposal quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    /// Defensive validation over externally supplied lots failed.
    #[error("Lot integrity check failed with {} issue(s): {}", .0.len(),
        .0.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; "))]
    IntegrityViolation(Vec<LotIntegrityIssue>),
}
