use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::holdings_model::{CostBasisByMethod, Holding, UnrealizedByMethod};
use crate::errors::Result;
use crate::lots::{Lot, LotAllocator};

/// Derives the aggregate [`Holding`] for one asset from its lots and a
/// current fair price per unit.
///
/// Everything is recomputed from the lots on each call: quantities,
/// per-method cost basis (allocating the full remaining quantity under each
/// ordering), unrealized gain/loss, the classification breakdown, and
/// impairment totals.
pub fn build_holding(
    asset_symbol: &str,
    asset_name: Option<&str>,
    lots: &[Lot],
    fair_price_per_unit: Decimal,
    fair_value_currency: &str,
    price_timestamp: DateTime<Utc>,
) -> Result<Holding> {
    let allocator = LotAllocator::new();

    let total_quantity: Decimal = lots
        .iter()
        .filter(|lot| lot.remaining_quantity > Decimal::ZERO)
        .map(|lot| lot.remaining_quantity)
        .sum();

    let cost_basis = if total_quantity.is_zero() {
        CostBasisByMethod::default()
    } else {
        let by_method = allocator.cost_basis_all_methods(lots, total_quantity, None)?;
        // Summed directly rather than via the per-unit average, which would
        // round at the division and drift the total.
        let weighted_average = lots
            .iter()
            .filter(|lot| lot.remaining_quantity > Decimal::ZERO)
            .map(|lot| lot.remaining_quantity * lot.cost_per_unit)
            .sum();
        CostBasisByMethod {
            fifo: by_method.fifo,
            lifo: by_method.lifo,
            hifo: by_method.hifo,
            weighted_average,
        }
    };

    let current_fair_value = total_quantity * fair_price_per_unit;
    let unrealized_gain_loss = UnrealizedByMethod {
        fifo: current_fair_value - cost_basis.fifo,
        lifo: current_fair_value - cost_basis.lifo,
        hifo: current_fair_value - cost_basis.hifo,
        weighted_average: current_fair_value - cost_basis.weighted_average,
    };

    let mut classification_breakdown = HashMap::new();
    let mut total_impairment = Decimal::ZERO;
    let mut impairment_events = 0u32;
    for lot in lots {
        if lot.remaining_quantity > Decimal::ZERO {
            *classification_breakdown
                .entry(lot.classification)
                .or_insert(Decimal::ZERO) += lot.remaining_quantity;
        }
        total_impairment += lot.cumulative_impairment;
        impairment_events += lot.impairment_history.len() as u32;
    }

    Ok(Holding {
        asset_symbol: asset_symbol.to_string(),
        asset_name: asset_name.map(str::to_string),
        total_quantity,
        // Lock tracking is an input concern; everything derived here is
        // available.
        available_quantity: total_quantity,
        locked_quantity: Decimal::ZERO,
        cost_basis,
        current_fair_value,
        fair_value_currency: fair_value_currency.to_string(),
        last_price_update: price_timestamp,
        unrealized_gain_loss,
        classification_breakdown,
        lots: lots.to_vec(),
        total_impairment,
        impairment_events,
    })
}
