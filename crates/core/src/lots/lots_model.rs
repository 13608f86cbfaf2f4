use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lots_errors::LotError;
use crate::compliance::{AssetClassification, ImpairmentEvent};

/// Lot consumption ordering used to compute cost basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CostBasisMethod {
    #[serde(rename = "FIFO")]
    #[default]
    Fifo,
    #[serde(rename = "LIFO")]
    Lifo,
    #[serde(rename = "HIFO")]
    Hifo,
    #[serde(rename = "SpecificID")]
    SpecificId,
}

impl CostBasisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostBasisMethod::Fifo => "FIFO",
            CostBasisMethod::Lifo => "LIFO",
            CostBasisMethod::Hifo => "HIFO",
            CostBasisMethod::SpecificId => "SpecificID",
        }
    }
}

impl fmt::Display for CostBasisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostBasisMethod {
    type Err = LotError;

    /// Parses an externally supplied method name. Unrecognized names fail
    /// rather than falling back to a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(CostBasisMethod::Fifo),
            "LIFO" => Ok(CostBasisMethod::Lifo),
            "HIFO" => Ok(CostBasisMethod::Hifo),
            "SpecificID" => Ok(CostBasisMethod::SpecificId),
            other => Err(LotError::UnknownCostBasisMethod(other.to_string())),
        }
    }
}

/// An immutable acquisition batch of one asset.
///
/// Only `remaining_quantity`, `cumulative_impairment`, and
/// `impairment_history` ever change after creation: the first through
/// explicit disposal application, the others through append-only impairment
/// recording.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub asset_symbol: String,
    pub acquisition_date: DateTime<Utc>,
    pub quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub cost_per_unit: Decimal,
    /// Total cost of the whole lot; invariant `cost_per_unit * quantity`.
    pub acquisition_cost: Decimal,
    pub fair_value_at_acquisition: Decimal,
    pub classification: AssetClassification,
    pub cumulative_impairment: Decimal,
    #[serde(default)]
    pub impairment_history: Vec<ImpairmentEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Lot {
    /// Creates a fresh, unconsumed lot. `acquisition_cost` is derived so the
    /// cost invariant holds by construction.
    pub fn new(
        id: impl Into<String>,
        asset_symbol: impl Into<String>,
        acquisition_date: DateTime<Utc>,
        quantity: Decimal,
        cost_per_unit: Decimal,
        fair_value_at_acquisition: Decimal,
        classification: AssetClassification,
    ) -> Self {
        Self {
            id: id.into(),
            asset_symbol: asset_symbol.into(),
            acquisition_date,
            quantity,
            remaining_quantity: quantity,
            cost_per_unit,
            acquisition_cost: cost_per_unit * quantity,
            fair_value_at_acquisition,
            classification,
            cumulative_impairment: Decimal::ZERO,
            impairment_history: Vec::new(),
            transaction_hash: None,
            wallet_address: None,
            notes: None,
        }
    }

    /// Appends an impairment event and updates the running total.
    /// The history is an append-only ledger.
    pub fn record_impairment(&mut self, event: ImpairmentEvent) {
        self.cumulative_impairment += event.impairment_amount;
        self.impairment_history.push(event);
    }
}

/// A disposal to be allocated against a lot pool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisposalRequest {
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub disposal_date: DateTime<Utc>,
    pub method: CostBasisMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_lot_ids: Option<Vec<String>>,
}

/// How much of one lot a disposal consumed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotConsumption {
    pub lot_id: String,
    pub quantity_used: Decimal,
    pub cost_basis: Decimal,
}

/// Outcome of one allocation. Read-only; consumption is applied back onto
/// lot state in a separate explicit step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisposalResult {
    pub total_cost_basis: Decimal,
    pub average_cost_per_unit: Decimal,
    pub lots_used: Vec<LotConsumption>,
}

/// Cost basis of one disposal quantity under each automatic ordering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CostBasisCalculation {
    #[serde(rename = "FIFO")]
    pub fifo: Decimal,
    #[serde(rename = "LIFO")]
    pub lifo: Decimal,
    #[serde(rename = "HIFO")]
    pub hifo: Decimal,
}

/// Days held and the long-term/short-term split.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPeriod {
    pub days: i64,
    pub is_long_term: bool,
}

/// Signed gain/loss of a disposal against its cost basis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GainLoss {
    pub gain_loss: Decimal,
    pub is_gain: bool,
}
