//! Property-based integration tests for lot allocation.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use lotbook_core::compliance::AssetClassification;
use lotbook_core::{CostBasisMethod, Lot, LotAllocator, LotError};

// =============================================================================
// Generators
// =============================================================================

/// Generates one of the automatic allocation orderings.
fn arb_method() -> impl Strategy<Value = CostBasisMethod> {
    prop_oneof![
        Just(CostBasisMethod::Fifo),
        Just(CostBasisMethod::Lifo),
        Just(CostBasisMethod::Hifo),
    ]
}

/// Generates a pool of 1..=20 structurally valid lots with integer
/// quantities and two-decimal unit costs.
fn arb_lot_pool() -> impl Strategy<Value = Vec<Lot>> {
    proptest::collection::vec((1u32..=100, 1u32..=100_000, 0i64..=1_000), 1..=20).prop_map(
        |specs| {
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (quantity, cost_cents, day_offset))| {
                    let cost_per_unit = Decimal::new(i64::from(cost_cents), 2);
                    let quantity = Decimal::from(quantity);
                    Lot::new(
                        format!("lot-{}", i),
                        "BTC",
                        base + Duration::days(day_offset),
                        quantity,
                        cost_per_unit,
                        cost_per_unit * quantity,
                        AssetClassification::Investment,
                    )
                })
                .collect()
        },
    )
}

/// A lot pool together with a disposal quantity its lots can cover.
fn arb_pool_and_request() -> impl Strategy<Value = (Vec<Lot>, Decimal)> {
    arb_lot_pool().prop_flat_map(|lots| {
        let total = lots
            .iter()
            .map(|lot| lot.remaining_quantity)
            .sum::<Decimal>()
            .to_u64()
            .unwrap_or(1);
        (Just(lots), 1..=total).prop_map(|(lots, requested)| (lots, Decimal::from(requested)))
    })
}

fn by_id(lots: &[Lot]) -> HashMap<&str, &Lot> {
    lots.iter().map(|lot| (lot.id.as_str(), lot)).collect()
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An allocation consumes exactly the requested quantity, and its total
    /// cost basis equals the sum over the consumed lots.
    #[test]
    fn prop_allocation_conserves_quantity_and_cost(
        (lots, requested) in arb_pool_and_request(),
        method in arb_method(),
    ) {
        let allocator = LotAllocator::new();
        let result = allocator.allocate(&lots, requested, method, None).unwrap();

        let consumed: Decimal = result.lots_used.iter().map(|u| u.quantity_used).sum();
        prop_assert_eq!(consumed, requested);

        let summed: Decimal = result.lots_used.iter().map(|u| u.cost_basis).sum();
        prop_assert_eq!(summed, result.total_cost_basis);
    }

    /// Each consumption prices at the lot's own unit cost and never takes
    /// more than the lot holds.
    #[test]
    fn prop_consumptions_respect_lot_state(
        (lots, requested) in arb_pool_and_request(),
        method in arb_method(),
    ) {
        let allocator = LotAllocator::new();
        let result = allocator.allocate(&lots, requested, method, None).unwrap();
        let index = by_id(&lots);

        for used in &result.lots_used {
            let lot = index[used.lot_id.as_str()];
            prop_assert!(used.quantity_used > Decimal::ZERO);
            prop_assert!(used.quantity_used <= lot.remaining_quantity);
            prop_assert_eq!(used.cost_basis, used.quantity_used * lot.cost_per_unit);
        }
    }

    /// Consumption order matches the method's ordering over the pool.
    #[test]
    fn prop_consumption_order_matches_method(
        (lots, requested) in arb_pool_and_request(),
        method in arb_method(),
    ) {
        let allocator = LotAllocator::new();
        let result = allocator.allocate(&lots, requested, method, None).unwrap();
        let index = by_id(&lots);

        for pair in result.lots_used.windows(2) {
            let first = index[pair[0].lot_id.as_str()];
            let second = index[pair[1].lot_id.as_str()];
            match method {
                CostBasisMethod::Fifo => {
                    prop_assert!(first.acquisition_date <= second.acquisition_date)
                }
                CostBasisMethod::Lifo => {
                    prop_assert!(first.acquisition_date >= second.acquisition_date)
                }
                CostBasisMethod::Hifo => {
                    prop_assert!(first.cost_per_unit >= second.cost_per_unit)
                }
                CostBasisMethod::SpecificId => unreachable!(),
            }
        }
    }

    /// HIFO never produces a lower cost basis than FIFO or LIFO for the same
    /// disposal.
    #[test]
    fn prop_hifo_maximizes_cost_basis(
        (lots, requested) in arb_pool_and_request(),
    ) {
        let allocator = LotAllocator::new();
        let all = allocator.cost_basis_all_methods(&lots, requested, None).unwrap();

        prop_assert!(all.hifo >= all.fifo);
        prop_assert!(all.hifo >= all.lifo);
    }

    /// Requesting more than the pool holds fails with the exact shortfall
    /// and performs no partial allocation.
    #[test]
    fn prop_over_request_reports_exact_shortfall(
        lots in arb_lot_pool(),
        excess in 1u64..=1_000,
        method in arb_method(),
    ) {
        let allocator = LotAllocator::new();
        let total: Decimal = lots.iter().map(|lot| lot.remaining_quantity).sum();
        let requested = total + Decimal::from(excess);

        let err = allocator.allocate(&lots, requested, method, None).unwrap_err();
        match err {
            lotbook_core::Error::Lot(LotError::InsufficientLots { needed, found }) => {
                prop_assert_eq!(needed, requested);
                prop_assert_eq!(found, total);
            }
            other => prop_assert!(false, "unexpected error: {}", other),
        }

        for lot in &lots {
            prop_assert_eq!(lot.remaining_quantity, lot.quantity);
        }
    }

    /// Applying a disposal removes exactly the requested quantity from the
    /// pool and never drives any lot negative.
    #[test]
    fn prop_apply_disposal_conserves_the_pool(
        (mut lots, requested) in arb_pool_and_request(),
        method in arb_method(),
    ) {
        let allocator = LotAllocator::new();
        let before: Decimal = lots.iter().map(|lot| lot.remaining_quantity).sum();

        let result = allocator.allocate(&lots, requested, method, None).unwrap();
        allocator.apply_disposal(&mut lots, &result);

        let after: Decimal = lots.iter().map(|lot| lot.remaining_quantity).sum();
        prop_assert_eq!(after, before - requested);
        for lot in &lots {
            prop_assert!(lot.remaining_quantity >= Decimal::ZERO);
        }
    }

    /// The weighted-average unit cost always lies between the cheapest and
    /// most expensive lot in the pool.
    #[test]
    fn prop_weighted_average_is_bounded(
        lots in arb_lot_pool(),
    ) {
        let allocator = LotAllocator::new();
        let average = allocator.weighted_average_cost(&lots);

        let min = lots.iter().map(|lot| lot.cost_per_unit).min().unwrap();
        let max = lots.iter().map(|lot| lot.cost_per_unit).max().unwrap();
        prop_assert!(average >= min);
        prop_assert!(average <= max);
    }

    /// Specific-ID allocation over the whole pool in any order reproduces
    /// the same total cost basis as FIFO over the whole pool.
    #[test]
    fn prop_full_pool_disposal_is_method_independent(
        lots in arb_lot_pool(),
        method in arb_method(),
    ) {
        let allocator = LotAllocator::new();
        let total: Decimal = lots.iter().map(|lot| lot.remaining_quantity).sum();
        let full_cost: Decimal = lots.iter().map(|lot| lot.acquisition_cost).sum();

        let result = allocator.allocate(&lots, total, method, None).unwrap();
        prop_assert_eq!(result.total_cost_basis, full_cost);

        let ids: Vec<String> = lots.iter().map(|lot| lot.id.clone()).collect();
        let specific = allocator
            .allocate(&lots, total, CostBasisMethod::SpecificId, Some(&ids))
            .unwrap();
        prop_assert_eq!(specific.total_cost_basis, full_cost);
    }
}
