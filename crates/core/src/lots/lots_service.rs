use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;

use super::lots_errors::{LotError, LotIntegrityIssue};
use super::lots_model::{
    CostBasisCalculation, CostBasisMethod, DisposalRequest, DisposalResult, GainLoss,
    HoldingPeriod, Lot, LotConsumption,
};
use crate::constants::LONG_TERM_HOLDING_DAYS;
use crate::errors::Result;

/// Cost-basis engine: selects and consumes acquisition lots under a chosen
/// convention (FIFO/LIFO/HIFO/Specific-ID).
///
/// Allocation is deterministic and side-effect-free on the input lots; the
/// consumption is written back in a separate explicit step via
/// [`apply_disposal`](Self::apply_disposal).
#[derive(Debug, Clone, Copy, Default)]
pub struct LotAllocator;

impl LotAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Allocates `quantity` against `lots` under `method`.
    ///
    /// Fails with `InsufficientLots` when the eligible lots cannot cover the
    /// full quantity; never partially succeeds.
    pub fn allocate(
        &self,
        lots: &[Lot],
        quantity: Decimal,
        method: CostBasisMethod,
        specific_lot_ids: Option<&[String]>,
    ) -> Result<DisposalResult> {
        self.allocate_as_of(lots, quantity, method, specific_lot_ids, None)
    }

    /// Allocates a [`DisposalRequest`], restricting eligibility to lots
    /// acquired on or before the disposal date.
    pub fn allocate_for_request(
        &self,
        request: &DisposalRequest,
        lots: &[Lot],
    ) -> Result<DisposalResult> {
        self.allocate_as_of(
            lots,
            request.quantity,
            request.method,
            request.specific_lot_ids.as_deref(),
            Some(request.disposal_date),
        )
    }

    fn allocate_as_of(
        &self,
        lots: &[Lot],
        quantity: Decimal,
        method: CostBasisMethod,
        specific_lot_ids: Option<&[String]>,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<DisposalResult> {
        if !quantity.is_sign_positive() || quantity.is_zero() {
            return Err(LotError::InvalidQuantity(quantity).into());
        }

        let issues = self.validate_lots(lots);
        if !issues.is_empty() {
            return Err(LotError::IntegrityViolation(issues).into());
        }

        let available = Self::available_lots(lots, as_of);
        let ordered = match method {
            CostBasisMethod::Fifo => {
                let mut sorted = available;
                sorted.sort_by_key(|lot| lot.acquisition_date);
                sorted
            }
            CostBasisMethod::Lifo => {
                let mut sorted = available;
                sorted.sort_by(|a, b| b.acquisition_date.cmp(&a.acquisition_date));
                sorted
            }
            CostBasisMethod::Hifo => {
                let mut sorted = available;
                sorted.sort_by(|a, b| b.cost_per_unit.cmp(&a.cost_per_unit));
                sorted
            }
            CostBasisMethod::SpecificId => {
                let ids = specific_lot_ids
                    .filter(|ids| !ids.is_empty())
                    .ok_or(LotError::MissingSpecificLotIds)?;
                Self::lots_in_id_order(&available, ids)?
            }
        };

        Self::consume(&ordered, quantity)
    }

    /// Lots with positive remaining quantity, acquired on or before `as_of`
    /// when a disposal date is given. Input order is preserved so the sorts
    /// above tie-break stably.
    fn available_lots(lots: &[Lot], as_of: Option<DateTime<Utc>>) -> Vec<&Lot> {
        lots.iter()
            .filter(|lot| lot.remaining_quantity > Decimal::ZERO)
            .filter(|lot| match as_of {
                Some(date) => lot.acquisition_date <= date,
                None => true,
            })
            .collect()
    }

    /// Orders available lots by the caller-supplied id list. Every id must
    /// match an available lot.
    fn lots_in_id_order<'a>(available: &[&'a Lot], ids: &[String]) -> Result<Vec<&'a Lot>> {
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            let lot = available
                .iter()
                .find(|lot| &lot.id == id)
                .ok_or_else(|| LotError::LotNotFound { lot_id: id.clone() })?;
            ordered.push(*lot);
        }
        Ok(ordered)
    }

    /// Walks the ordered lots, taking `min(remaining_need, lot.remaining)`
    /// from each until the need reaches zero.
    fn consume(ordered: &[&Lot], quantity: Decimal) -> Result<DisposalResult> {
        let mut remaining_need = quantity;
        let mut total_cost = Decimal::ZERO;
        let mut lots_used = Vec::new();

        for lot in ordered {
            if remaining_need <= Decimal::ZERO {
                break;
            }
            if lot.remaining_quantity <= Decimal::ZERO {
                continue;
            }

            let quantity_used = remaining_need.min(lot.remaining_quantity);
            let cost_basis = quantity_used * lot.cost_per_unit;

            total_cost += cost_basis;
            remaining_need -= quantity_used;

            lots_used.push(LotConsumption {
                lot_id: lot.id.clone(),
                quantity_used,
                cost_basis,
            });
        }

        if remaining_need > Decimal::ZERO {
            return Err(LotError::InsufficientLots {
                needed: quantity,
                found: quantity - remaining_need,
            }
            .into());
        }

        Ok(DisposalResult {
            total_cost_basis: total_cost,
            average_cost_per_unit: total_cost / quantity,
            lots_used,
        })
    }

    /// Writes an allocation's consumption back onto lot state by
    /// decrementing `remaining_quantity`.
    pub fn apply_disposal(&self, lots: &mut [Lot], disposal: &DisposalResult) {
        for used in &disposal.lots_used {
            match lots.iter_mut().find(|lot| lot.id == used.lot_id) {
                Some(lot) => lot.remaining_quantity -= used.quantity_used,
                None => warn!(
                    "apply_disposal: lot {} from allocation not present in pool",
                    used.lot_id
                ),
            }
        }
    }

    /// Cost basis of one disposal quantity under FIFO, LIFO, and HIFO in a
    /// single call.
    pub fn cost_basis_all_methods(
        &self,
        lots: &[Lot],
        quantity: Decimal,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<CostBasisCalculation> {
        Ok(CostBasisCalculation {
            fifo: self
                .allocate_as_of(lots, quantity, CostBasisMethod::Fifo, None, as_of)?
                .total_cost_basis,
            lifo: self
                .allocate_as_of(lots, quantity, CostBasisMethod::Lifo, None, as_of)?
                .total_cost_basis,
            hifo: self
                .allocate_as_of(lots, quantity, CostBasisMethod::Hifo, None, as_of)?
                .total_cost_basis,
        })
    }

    /// Whole days held; long-term once the holding exceeds
    /// [`LONG_TERM_HOLDING_DAYS`].
    pub fn holding_period(
        &self,
        acquisition_date: DateTime<Utc>,
        disposal_date: DateTime<Utc>,
    ) -> HoldingPeriod {
        let days = (disposal_date - acquisition_date).num_days();
        HoldingPeriod {
            days,
            is_long_term: days > LONG_TERM_HOLDING_DAYS,
        }
    }

    /// Weighted-average cost per unit over lots with positive remaining
    /// quantity; zero when no such lots exist.
    pub fn weighted_average_cost(&self, lots: &[Lot]) -> Decimal {
        let mut total_cost = Decimal::ZERO;
        let mut total_quantity = Decimal::ZERO;

        for lot in lots {
            if lot.remaining_quantity > Decimal::ZERO {
                total_cost += lot.remaining_quantity * lot.cost_per_unit;
                total_quantity += lot.remaining_quantity;
            }
        }

        if total_quantity.is_zero() {
            Decimal::ZERO
        } else {
            total_cost / total_quantity
        }
    }

    /// Signed gain/loss of a disposal; wash-sale rules are out of scope.
    pub fn gain_loss(&self, cost_basis: Decimal, proceeds: Decimal) -> GainLoss {
        let gain_loss = proceeds - cost_basis;
        GainLoss {
            gain_loss,
            is_gain: gain_loss >= Decimal::ZERO,
        }
    }

    /// Defensive integrity pass over externally supplied lots.
    pub fn validate_lots(&self, lots: &[Lot]) -> Vec<LotIntegrityIssue> {
        let mut issues = Vec::new();

        for lot in lots {
            if lot.remaining_quantity > lot.quantity {
                issues.push(LotIntegrityIssue {
                    lot_id: lot.id.clone(),
                    message: "Remaining quantity exceeds total quantity".to_string(),
                });
            }

            if lot.remaining_quantity < Decimal::ZERO {
                issues.push(LotIntegrityIssue {
                    lot_id: lot.id.clone(),
                    message: "Negative remaining quantity".to_string(),
                });
            }

            let expected_cost = lot.cost_per_unit * lot.quantity;
            if expected_cost != lot.acquisition_cost {
                issues.push(LotIntegrityIssue {
                    lot_id: lot.id.clone(),
                    message: format!(
                        "Acquisition cost mismatch (expected {}, got {})",
                        expected_cost, lot.acquisition_cost
                    ),
                });
            }
        }

        issues
    }
}
