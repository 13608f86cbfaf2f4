use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::compliance::AssetClassification;
use crate::lots::{CostBasisMethod, Lot};

/// Cost basis of a holding under each method.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CostBasisByMethod {
    #[serde(rename = "FIFO")]
    pub fifo: Decimal,
    #[serde(rename = "LIFO")]
    pub lifo: Decimal,
    #[serde(rename = "HIFO")]
    pub hifo: Decimal,
    #[serde(rename = "weightedAverage")]
    pub weighted_average: Decimal,
}

impl CostBasisByMethod {
    /// Value under one method. Specific-ID has no holding-level figure, so
    /// it resolves to the weighted average.
    pub fn for_method(&self, method: CostBasisMethod) -> Decimal {
        match method {
            CostBasisMethod::Fifo => self.fifo,
            CostBasisMethod::Lifo => self.lifo,
            CostBasisMethod::Hifo => self.hifo,
            CostBasisMethod::SpecificId => self.weighted_average,
        }
    }
}

/// Unrealized gain/loss of a holding under each method.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UnrealizedByMethod {
    #[serde(rename = "FIFO")]
    pub fifo: Decimal,
    #[serde(rename = "LIFO")]
    pub lifo: Decimal,
    #[serde(rename = "HIFO")]
    pub hifo: Decimal,
    #[serde(rename = "weightedAverage")]
    pub weighted_average: Decimal,
}

/// Aggregate view over all lots of one asset symbol.
///
/// Derived on demand by [`super::build_holding`]; never independently
/// mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub asset_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    pub total_quantity: Decimal,
    pub available_quantity: Decimal,
    pub locked_quantity: Decimal,
    pub cost_basis: CostBasisByMethod,
    pub current_fair_value: Decimal,
    pub fair_value_currency: String,
    pub last_price_update: DateTime<Utc>,
    pub unrealized_gain_loss: UnrealizedByMethod,
    /// Remaining quantity per classification bucket.
    pub classification_breakdown: HashMap<AssetClassification, Decimal>,
    pub lots: Vec<Lot>,
    pub total_impairment: Decimal,
    pub impairment_events: u32,
}
