use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::compliance_errors::ComplianceError;
use super::compliance_model::{
    AccountingStandard, AssetClassification, ClassificationDisclosure, ComplianceSettings,
    DisclosureReport, GaapIfrsReconciliation, IfrsMeasurementModel, ImpairmentSummary,
    ImpairmentTest, JournalEntry, JournalEntryKind, KeyDifference, MeasurementBasis,
    MeasurementMethodology, MeasurementResult, ReconciliationAdjustment,
};
use crate::constants::SIGNIFICANT_HOLDING_PCT;
use crate::errors::Result;
use crate::holdings::Holding;

/// Resolves the measurement basis from classification and standard.
///
/// BrokerTrader always measures at fair value through P&L irrespective of
/// standard; under `Both` the US GAAP arm of the table applies.
pub fn measurement_basis(
    classification: AssetClassification,
    standard: AccountingStandard,
    ifrs_model: Option<IfrsMeasurementModel>,
) -> MeasurementBasis {
    if classification == AssetClassification::BrokerTrader {
        return MeasurementBasis::FairValueThroughPnl;
    }

    match standard {
        AccountingStandard::UsGaap | AccountingStandard::Both => match classification {
            AssetClassification::Inventory => MeasurementBasis::LowerOfCostOrNrv,
            AssetClassification::BrokerTrader
            | AssetClassification::Investment
            | AssetClassification::Operational => MeasurementBasis::FairValueThroughPnl,
        },
        AccountingStandard::Ifrs => {
            let model = ifrs_model.unwrap_or_default();
            match classification {
                AssetClassification::BrokerTrader => MeasurementBasis::FairValueThroughPnl,
                AssetClassification::Investment => match model {
                    IfrsMeasurementModel::RevaluationModel => MeasurementBasis::RevaluationModel,
                    IfrsMeasurementModel::CostModel => MeasurementBasis::CostLessImpairment,
                },
                AssetClassification::Operational => MeasurementBasis::CostLessImpairment,
                AssetClassification::Inventory => MeasurementBasis::LowerOfCostOrNrv,
            }
        }
    }
}

/// Restores the previous accounting standard when dropped, so a
/// swap-compute-restore sequence cannot leak the override on any exit path.
struct StandardScope<'a> {
    settings: &'a mut ComplianceSettings,
    saved: AccountingStandard,
}

impl<'a> StandardScope<'a> {
    fn new(settings: &'a mut ComplianceSettings, standard: AccountingStandard) -> Self {
        let saved = settings.accounting_standard;
        settings.accounting_standard = standard;
        Self { settings, saved }
    }

    fn settings(&self) -> &ComplianceSettings {
        self.settings
    }
}

impl Drop for StandardScope<'_> {
    fn drop(&mut self) {
        self.settings.accounting_standard = self.saved;
    }
}

/// Measurement and disclosure engine for US GAAP / IFRS reporting.
///
/// Construct with [`ComplianceEngine::new`], then call
/// [`initialize`](Self::initialize) with account-scoped settings; every other
/// method fails with [`ComplianceError::NotInitialized`] until then. The
/// settings live behind an `RwLock` so concurrent reconciliations against one
/// engine serialize behind the write lock.
pub struct ComplianceEngine {
    settings: RwLock<Option<ComplianceSettings>>,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(None),
        }
    }

    pub fn initialize(&self, settings: ComplianceSettings) -> Result<()> {
        let mut guard = self
            .settings
            .write()
            .map_err(|e| ComplianceError::Lock(e.to_string()))?;
        *guard = Some(settings);
        Ok(())
    }

    fn settings_snapshot(&self) -> Result<ComplianceSettings> {
        let guard = self
            .settings
            .read()
            .map_err(|e| ComplianceError::Lock(e.to_string()))?;
        guard
            .clone()
            .ok_or_else(|| ComplianceError::NotInitialized.into())
    }

    /// Measurement basis for a classification under the active settings.
    pub fn basis_for(&self, classification: AssetClassification) -> Result<MeasurementBasis> {
        let settings = self.settings_snapshot()?;
        Ok(measurement_basis(
            classification,
            settings.accounting_standard,
            settings.ifrs_measurement_model,
        ))
    }

    /// Carrying amount, unrealized gain/loss, and any impairment for one
    /// holding under the active settings.
    pub fn measure(
        &self,
        holding: &Holding,
        classification: AssetClassification,
    ) -> Result<MeasurementResult> {
        let settings = self.settings_snapshot()?;
        Ok(Self::measure_with(&settings, holding, classification))
    }

    fn measure_with(
        settings: &ComplianceSettings,
        holding: &Holding,
        classification: AssetClassification,
    ) -> MeasurementResult {
        let basis = measurement_basis(
            classification,
            settings.accounting_standard,
            settings.ifrs_measurement_model,
        );
        let fair_value = holding.current_fair_value;
        let cost_basis = holding
            .cost_basis
            .for_method(settings.default_cost_basis_method);

        let mut impairment_loss = None;
        let carrying_amount;
        let unrealized_gain_loss;

        match basis {
            MeasurementBasis::FairValueThroughPnl | MeasurementBasis::RevaluationModel => {
                carrying_amount = fair_value;
                unrealized_gain_loss = fair_value - cost_basis;
            }
            MeasurementBasis::CostLessImpairment => {
                let mut carrying = cost_basis - holding.total_impairment;
                // Clamp to fair value, recognizing the shortfall as
                // additional impairment.
                if fair_value < carrying {
                    impairment_loss = Some(carrying - fair_value);
                    carrying = fair_value;
                }
                carrying_amount = carrying;
                unrealized_gain_loss = carrying_amount - cost_basis;
            }
            MeasurementBasis::LowerOfCostOrNrv => {
                carrying_amount = cost_basis.min(fair_value);
                unrealized_gain_loss = carrying_amount - cost_basis;
                if carrying_amount < cost_basis {
                    impairment_loss = Some(cost_basis - carrying_amount);
                }
            }
        }

        MeasurementResult {
            carrying_amount,
            fair_value,
            unrealized_gain_loss,
            impairment_loss,
            measurement_basis: basis,
        }
    }

    /// Whether a separate impairment test is required.
    ///
    /// US GAAP: only for `Operational` assets. IFRS: only under the cost
    /// model; the revaluation model recomputes carrying amount instead.
    pub fn requires_impairment_test(
        &self,
        classification: AssetClassification,
    ) -> Result<bool> {
        let settings = self.settings_snapshot()?;
        Ok(match settings.accounting_standard {
            AccountingStandard::UsGaap => classification == AssetClassification::Operational,
            AccountingStandard::Ifrs => {
                settings.ifrs_measurement_model.unwrap_or_default()
                    == IfrsMeasurementModel::CostModel
            }
            AccountingStandard::Both => false,
        })
    }

    /// Impairment test with standard-dependent reversal rules.
    ///
    /// A reversal (negative loss) is only recognized under IFRS/Both with
    /// `allow_impairment_reversal` enabled, and never exceeds
    /// `previous_impairment`. US GAAP never reverses.
    pub fn impairment_test(
        &self,
        carrying_amount: Decimal,
        fair_value: Decimal,
        previous_impairment: Decimal,
    ) -> Result<ImpairmentTest> {
        let settings = self.settings_snapshot()?;

        let mut is_impaired = false;
        let mut impairment_loss = Decimal::ZERO;
        let mut allow_reversal = false;

        if fair_value < carrying_amount {
            is_impaired = true;
            impairment_loss = carrying_amount - fair_value;
        }

        if matches!(
            settings.accounting_standard,
            AccountingStandard::Ifrs | AccountingStandard::Both
        ) {
            allow_reversal = settings.allow_impairment_reversal;

            if allow_reversal && previous_impairment > Decimal::ZERO && fair_value > carrying_amount
            {
                let potential = fair_value - carrying_amount;
                // Cannot reverse more than was previously written off.
                impairment_loss = -potential.min(previous_impairment);
            }
        }

        Ok(ImpairmentTest {
            is_impaired,
            impairment_loss,
            allow_reversal,
        })
    }

    /// Double-entry lines for one transaction kind.
    ///
    /// Disposal entries are a documented gap: generating them needs disposal
    /// inputs (proceeds account, fee treatment) this engine is not handed,
    /// so `Disposal` yields no entries.
    pub fn journal_entries(
        &self,
        holding: &Holding,
        classification: AssetClassification,
        kind: JournalEntryKind,
    ) -> Result<Vec<JournalEntry>> {
        let settings = self.settings_snapshot()?;
        let standard = settings.accounting_standard;
        let today = Utc::now();
        let asset_account = format!("Crypto Assets - {}", holding.asset_symbol);

        let mut entries = Vec::new();

        match kind {
            JournalEntryKind::Acquisition => {
                entries.push(JournalEntry {
                    date: today,
                    debit_account: asset_account,
                    credit_account: "Cash".to_string(),
                    amount: holding
                        .cost_basis
                        .for_method(settings.default_cost_basis_method),
                    description: format!(
                        "Acquisition of {} {}",
                        holding.total_quantity, holding.asset_symbol
                    ),
                    standard,
                });
            }
            JournalEntryKind::Revaluation => {
                let measurement = Self::measure_with(&settings, holding, classification);
                let gain_loss = measurement.unrealized_gain_loss;
                if gain_loss.is_zero() {
                    return Ok(entries);
                }

                let description =
                    format!("Revaluation of {} to fair value", holding.asset_symbol);
                if gain_loss > Decimal::ZERO {
                    let credit_account = if standard == AccountingStandard::Ifrs
                        && settings.ifrs_measurement_model
                            == Some(IfrsMeasurementModel::RevaluationModel)
                    {
                        "Revaluation Surplus (OCI)".to_string()
                    } else {
                        "Unrealized Gain on Crypto Assets".to_string()
                    };
                    entries.push(JournalEntry {
                        date: today,
                        debit_account: asset_account,
                        credit_account,
                        amount: gain_loss.abs(),
                        description,
                        standard,
                    });
                } else {
                    entries.push(JournalEntry {
                        date: today,
                        debit_account: "Unrealized Loss on Crypto Assets".to_string(),
                        credit_account: asset_account,
                        amount: gain_loss.abs(),
                        description,
                        standard,
                    });
                }
            }
            JournalEntryKind::Impairment => {
                let measurement = Self::measure_with(&settings, holding, classification);
                if let Some(impairment) = measurement.impairment_loss {
                    entries.push(JournalEntry {
                        date: today,
                        debit_account: "Impairment Loss".to_string(),
                        credit_account: asset_account,
                        amount: impairment,
                        description: format!("Impairment of {}", holding.asset_symbol),
                        standard,
                    });
                }
            }
            JournalEntryKind::Disposal => {}
        }

        Ok(entries)
    }

    /// Classification used during reconciliation.
    ///
    /// A per-lot lookup would need per-classification cost-basis splits the
    /// holding does not carry, so the breakdown is reduced to Investment when
    /// present, else BrokerTrader. Known approximation.
    fn reconciliation_classification(holding: &Holding) -> AssetClassification {
        let has_investment = holding
            .classification_breakdown
            .get(&AssetClassification::Investment)
            .is_some_and(|qty| *qty > Decimal::ZERO);
        if has_investment {
            AssetClassification::Investment
        } else {
            AssetClassification::BrokerTrader
        }
    }

    fn total_carrying(
        settings: &mut ComplianceSettings,
        holdings: &[Holding],
        standard: AccountingStandard,
    ) -> Decimal {
        let scope = StandardScope::new(settings, standard);
        holdings
            .iter()
            .map(|holding| {
                let classification = Self::reconciliation_classification(holding);
                Self::measure_with(scope.settings(), holding, classification).carrying_amount
            })
            .sum()
    }

    /// Side-by-side US GAAP / IFRS reconciliation over `holdings`.
    ///
    /// Holds the settings write lock for the whole computation so concurrent
    /// reconciliations serialize; the per-standard override is restored on
    /// every exit path by [`StandardScope`]. Totals are summed independently
    /// per standard rather than from the line items, so per-line rounding
    /// cannot compound.
    pub fn reconciliation(
        &self,
        holdings: &[Holding],
        report_date: DateTime<Utc>,
    ) -> Result<GaapIfrsReconciliation> {
        let mut guard = self
            .settings
            .write()
            .map_err(|e| ComplianceError::Lock(e.to_string()))?;
        let settings = guard.as_mut().ok_or(ComplianceError::NotInitialized)?;

        let gaap_carrying_amount =
            Self::total_carrying(settings, holdings, AccountingStandard::UsGaap);
        let ifrs_carrying_amount =
            Self::total_carrying(settings, holdings, AccountingStandard::Ifrs);

        let mut adjustments = Vec::new();
        let mut key_differences = Vec::new();

        for holding in holdings {
            let classification = Self::reconciliation_classification(holding);

            let gaap = {
                let scope = StandardScope::new(settings, AccountingStandard::UsGaap);
                Self::measure_with(scope.settings(), holding, classification)
            };
            let ifrs = {
                let scope = StandardScope::new(settings, AccountingStandard::Ifrs);
                Self::measure_with(scope.settings(), holding, classification)
            };

            let difference = ifrs.carrying_amount - gaap.carrying_amount;
            if !difference.is_zero() {
                adjustments.push(ReconciliationAdjustment {
                    description: format!("{} measurement difference", holding.asset_symbol),
                    amount: difference,
                    explanation: format!(
                        "GAAP: {}, IFRS: {}",
                        gaap.measurement_basis.as_str(),
                        ifrs.measurement_basis.as_str()
                    ),
                });
                key_differences.push(KeyDifference {
                    item: holding.asset_symbol.clone(),
                    gaap_treatment: gaap.measurement_basis,
                    ifrs_treatment: ifrs.measurement_basis,
                    impact: difference,
                });
            }
        }

        Ok(GaapIfrsReconciliation {
            report_date,
            gaap_carrying_amount,
            adjustments,
            ifrs_carrying_amount,
            key_differences,
        })
    }

    /// Standard-specific disclosure report over `holdings`.
    pub fn disclosure(
        &self,
        holdings: &[Holding],
        report_date: DateTime<Utc>,
    ) -> Result<DisclosureReport> {
        let settings = self.settings_snapshot()?;

        let mut total_fair_value = Decimal::ZERO;
        let mut unrealized_gains = Decimal::ZERO;
        let mut unrealized_losses = Decimal::ZERO;
        let mut total_impairments = Decimal::ZERO;
        let mut impairments_by_asset: HashMap<String, Decimal> = HashMap::new();
        let mut by_classification: HashMap<AssetClassification, ClassificationDisclosure> =
            HashMap::new();

        for holding in holdings {
            let fair_value = holding.current_fair_value;
            total_fair_value += fair_value;

            let cost_basis = holding
                .cost_basis
                .for_method(settings.default_cost_basis_method);
            let unrealized = fair_value - cost_basis;

            if unrealized > Decimal::ZERO {
                unrealized_gains += unrealized;
            } else {
                unrealized_losses += unrealized.abs();
            }

            if holding.total_impairment > Decimal::ZERO {
                impairments_by_asset
                    .insert(holding.asset_symbol.clone(), holding.total_impairment);
                total_impairments += holding.total_impairment;
            }

            // Fair value and unrealized gain/loss are apportioned pro-rata by
            // quantity across the classification buckets.
            if !holding.total_quantity.is_zero() {
                for (classification, quantity) in &holding.classification_breakdown {
                    let share = quantity / holding.total_quantity;
                    let entry = by_classification.entry(*classification).or_default();
                    entry.holdings += *quantity;
                    entry.fair_value += fair_value * share;
                    entry.unrealized_gain_loss += unrealized * share;
                }
            }
        }

        let threshold = Decimal::from(SIGNIFICANT_HOLDING_PCT);
        let hundred = Decimal::new(100, 0);
        let mut significant_holdings = Vec::new();
        if total_fair_value > Decimal::ZERO {
            for holding in holdings {
                let percent = holding.current_fair_value / total_fair_value * hundred;
                if percent > threshold {
                    significant_holdings.push(super::SignificantHolding {
                        asset_symbol: holding.asset_symbol.clone(),
                        quantity: holding.total_quantity,
                        fair_value: holding.current_fair_value,
                        percent_of_total: percent.to_f64().unwrap_or(0.0),
                    });
                }
            }
        }

        let impairment_summary = if total_impairments > Decimal::ZERO {
            Some(ImpairmentSummary {
                total_impairments,
                impairments_by_asset,
            })
        } else {
            None
        };

        Ok(DisclosureReport {
            id: Uuid::new_v4().to_string(),
            report_date,
            standard: settings.accounting_standard,
            total_crypto_assets: total_fair_value,
            total_fair_value,
            unrealized_gains,
            unrealized_losses,
            // Realized figures need disposal data this report is not handed.
            realized_gains: Decimal::ZERO,
            realized_losses: Decimal::ZERO,
            by_classification,
            significant_holdings,
            impairment_summary,
            measurement_methodology: MeasurementMethodology {
                cost_basis_method: settings.default_cost_basis_method,
                fair_value_source: settings.fair_value_source,
                active_market_determination:
                    "Based on daily trading volume and market capitalization".to_string(),
            },
            accounting_policies: Self::accounting_policies_text(&settings),
            significant_judgments: Self::significant_judgments_text().to_string(),
            created_at: Utc::now(),
        })
    }

    fn accounting_policies_text(settings: &ComplianceSettings) -> String {
        let standard_name = match settings.accounting_standard {
            AccountingStandard::UsGaap => "US GAAP",
            AccountingStandard::Ifrs => "IFRS",
            AccountingStandard::Both => "both US GAAP and IFRS",
        };

        let mut text = format!("Crypto assets are accounted for under {}. ", standard_name);
        text.push_str(&format!(
            "Cost basis is determined using the {} method. ",
            settings.default_cost_basis_method.as_str()
        ));

        if settings.accounting_standard == AccountingStandard::Ifrs {
            if let Some(model) = settings.ifrs_measurement_model {
                let model_name = match model {
                    IfrsMeasurementModel::CostModel => "cost model",
                    IfrsMeasurementModel::RevaluationModel => "revaluation model",
                };
                text.push_str(&format!("Under IFRS, the {} is applied. ", model_name));
            }
        }

        text.push_str(&format!(
            "Fair values are obtained from {} and updated every {} seconds.",
            settings.fair_value_source.as_str(),
            settings.fair_value_update_frequency
        ));

        text
    }

    fn significant_judgments_text() -> &'static str {
        "Management makes judgments in determining whether an active market exists for crypto \
         assets, which affects the measurement approach. Active markets are identified based on \
         daily trading volume, number of exchanges, and market capitalization. Impairment \
         assessments require judgment in determining whether fair value declines are \
         other-than-temporary."
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}
