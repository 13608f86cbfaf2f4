use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::fx::RateSource;
use crate::lots::CostBasisMethod;

/// Accounting standard a holding is measured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccountingStandard {
    #[serde(rename = "US_GAAP")]
    #[default]
    UsGaap,
    #[serde(rename = "IFRS")]
    Ifrs,
    Both,
}

impl AccountingStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountingStandard::UsGaap => "US_GAAP",
            AccountingStandard::Ifrs => "IFRS",
            AccountingStandard::Both => "Both",
        }
    }
}

/// Business-model classification of a crypto asset.
///
/// Classification decides the measurement basis together with the active
/// standard; adding a variant is a compile-time-checked decision because the
/// basis table matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssetClassification {
    BrokerTrader,
    #[default]
    Investment,
    Operational,
    Inventory,
}

impl AssetClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClassification::BrokerTrader => "BrokerTrader",
            AssetClassification::Investment => "Investment",
            AssetClassification::Operational => "Operational",
            AssetClassification::Inventory => "Inventory",
        }
    }
}

/// Measurement model selected for IFRS reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IfrsMeasurementModel {
    #[default]
    CostModel,
    RevaluationModel,
}

/// Measurement basis resolved from classification and standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementBasis {
    #[serde(rename = "Fair Value through P&L")]
    FairValueThroughPnl,
    #[serde(rename = "Cost less Impairment")]
    CostLessImpairment,
    #[serde(rename = "Revaluation Model")]
    RevaluationModel,
    #[serde(rename = "Lower of Cost or NRV")]
    LowerOfCostOrNrv,
}

impl MeasurementBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementBasis::FairValueThroughPnl => "Fair Value through P&L",
            MeasurementBasis::CostLessImpairment => "Cost less Impairment",
            MeasurementBasis::RevaluationModel => "Revaluation Model",
            MeasurementBasis::LowerOfCostOrNrv => "Lower of Cost or NRV",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Account-scoped compliance configuration.
///
/// Constructor-injected into [`super::ComplianceEngine`]; read by every
/// measurement call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSettings {
    pub accounting_standard: AccountingStandard,
    pub default_cost_basis_method: CostBasisMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifrs_measurement_model: Option<IfrsMeasurementModel>,
    #[serde(default = "default_true")]
    pub allow_impairment_reversal: bool,
    pub default_classification: AssetClassification,
    #[serde(default)]
    pub classification_by_asset: HashMap<String, AssetClassification>,
    pub fair_value_source: RateSource,
    /// Seconds between fair-value refreshes, quoted in the disclosure text.
    pub fair_value_update_frequency: i64,
    pub reporting_currency: String,
    pub functional_currency: String,
}

impl ComplianceSettings {
    /// Classification for one asset: per-asset override, else the default.
    pub fn classification_for(&self, asset_symbol: &str) -> AssetClassification {
        self.classification_by_asset
            .get(asset_symbol)
            .copied()
            .unwrap_or(self.default_classification)
    }
}

/// Result of measuring one holding under the active settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    pub carrying_amount: Decimal,
    pub fair_value: Decimal,
    pub unrealized_gain_loss: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impairment_loss: Option<Decimal>,
    pub measurement_basis: MeasurementBasis,
}

/// One historic write-down on a lot. Append-only; never edited or deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpairmentEvent {
    pub event_id: String,
    pub date: DateTime<Utc>,
    pub impairment_amount: Decimal,
    pub fair_value_at_event: Decimal,
    pub carrying_amount_before: Decimal,
    pub carrying_amount_after: Decimal,
    pub reason: String,
    /// IFRS allows reversal, US GAAP does not.
    pub reversal_allowed: bool,
}

/// Outcome of an impairment test.
///
/// A negative `impairment_loss` represents a reversal of previously
/// recognized impairment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpairmentTest {
    pub is_impaired: bool,
    pub impairment_loss: Decimal,
    pub allow_reversal: bool,
}

/// Kind of transaction a journal entry set is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JournalEntryKind {
    Acquisition,
    Revaluation,
    Impairment,
    Disposal,
}

/// A single double-entry line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub date: DateTime<Utc>,
    pub debit_account: String,
    pub credit_account: String,
    pub amount: Decimal,
    pub description: String,
    pub standard: AccountingStandard,
}

/// Per-classification slice of a disclosure report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationDisclosure {
    /// Quantity held under this classification.
    pub holdings: Decimal,
    pub fair_value: Decimal,
    pub unrealized_gain_loss: Decimal,
}

/// A holding whose fair value exceeds the significance threshold.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignificantHolding {
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub fair_value: Decimal,
    pub percent_of_total: f64,
}

/// Impairment totals included in a disclosure report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpairmentSummary {
    pub total_impairments: Decimal,
    pub impairments_by_asset: HashMap<String, Decimal>,
}

/// How measurements were produced, disclosed alongside the figures.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementMethodology {
    pub cost_basis_method: CostBasisMethod,
    pub fair_value_source: RateSource,
    pub active_market_determination: String,
}

/// Standard-specific disclosure report. Point-in-time snapshot; a pure
/// function of the holdings passed in at generation time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureReport {
    pub id: String,
    pub report_date: DateTime<Utc>,
    pub standard: AccountingStandard,
    pub total_crypto_assets: Decimal,
    pub total_fair_value: Decimal,
    /// Gains and losses are reported separately, never netted.
    pub unrealized_gains: Decimal,
    pub unrealized_losses: Decimal,
    pub realized_gains: Decimal,
    pub realized_losses: Decimal,
    pub by_classification: HashMap<AssetClassification, ClassificationDisclosure>,
    pub significant_holdings: Vec<SignificantHolding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impairment_summary: Option<ImpairmentSummary>,
    pub measurement_methodology: MeasurementMethodology,
    pub accounting_policies: String,
    pub significant_judgments: String,
    pub created_at: DateTime<Utc>,
}

/// One reconciling line between the two standards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationAdjustment {
    pub description: String,
    pub amount: Decimal,
    pub explanation: String,
}

/// Treatment difference behind a reconciling line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyDifference {
    pub item: String,
    pub gaap_treatment: MeasurementBasis,
    pub ifrs_treatment: MeasurementBasis,
    pub impact: Decimal,
}

/// Side-by-side comparison of carrying amounts under US GAAP and IFRS.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GaapIfrsReconciliation {
    pub report_date: DateTime<Utc>,
    pub gaap_carrying_amount: Decimal,
    pub adjustments: Vec<ReconciliationAdjustment>,
    pub ifrs_carrying_amount: Decimal,
    pub key_differences: Vec<KeyDifference>,
}
