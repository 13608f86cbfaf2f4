//! Property-based integration tests for impairment testing.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

use lotbook_core::compliance::{
    AccountingStandard, AssetClassification, ComplianceEngine, ComplianceSettings,
};
use lotbook_core::fx::RateSource;
use lotbook_core::CostBasisMethod;

// =============================================================================
// Generators
// =============================================================================

fn engine(standard: AccountingStandard, allow_reversal: bool) -> ComplianceEngine {
    let engine = ComplianceEngine::new();
    engine
        .initialize(ComplianceSettings {
            accounting_standard: standard,
            default_cost_basis_method: CostBasisMethod::Fifo,
            ifrs_measurement_model: None,
            allow_impairment_reversal: allow_reversal,
            default_classification: AssetClassification::Investment,
            classification_by_asset: HashMap::new(),
            fair_value_source: RateSource::CoinGecko,
            fair_value_update_frequency: 300,
            reporting_currency: "USD".to_string(),
            functional_currency: "USD".to_string(),
        })
        .unwrap();
    engine
}

/// Non-negative two-decimal monetary amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Under IFRS a reversal never exceeds previously recognized impairment,
    /// and a shortfall is always recognized in full.
    #[test]
    fn prop_ifrs_reversal_never_exceeds_prior_impairment(
        carrying in arb_amount(),
        fair_value in arb_amount(),
        prior in arb_amount(),
    ) {
        let engine = engine(AccountingStandard::Ifrs, true);
        let test = engine.impairment_test(carrying, fair_value, prior).unwrap();

        prop_assert!(test.impairment_loss >= -prior);
        if fair_value < carrying {
            prop_assert!(test.is_impaired);
            prop_assert_eq!(test.impairment_loss, carrying - fair_value);
        }
        if fair_value > carrying && prior > Decimal::ZERO {
            prop_assert_eq!(test.impairment_loss, -(fair_value - carrying).min(prior));
        }
    }

    /// US GAAP never recognizes a reversal, whatever the recovery or the
    /// prior write-down.
    #[test]
    fn prop_us_gaap_loss_is_never_negative(
        carrying in arb_amount(),
        fair_value in arb_amount(),
        prior in arb_amount(),
    ) {
        let engine = engine(AccountingStandard::UsGaap, true);
        let test = engine.impairment_test(carrying, fair_value, prior).unwrap();

        prop_assert!(test.impairment_loss >= Decimal::ZERO);
        prop_assert!(!test.allow_reversal);
    }

    /// With the reversal switch off, IFRS recognizes no recovery either.
    #[test]
    fn prop_disabled_reversal_recognizes_no_recovery(
        carrying in arb_amount(),
        fair_value in arb_amount(),
        prior in arb_amount(),
    ) {
        let engine = engine(AccountingStandard::Ifrs, false);
        let test = engine.impairment_test(carrying, fair_value, prior).unwrap();

        prop_assert!(test.impairment_loss >= Decimal::ZERO);
        prop_assert!(!test.allow_reversal);
    }
}
