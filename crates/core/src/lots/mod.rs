//! Lots module - acquisition lots and cost-basis allocation.

mod lots_errors;
mod lots_model;
mod lots_service;

pub use lots_errors::{LotError, LotIntegrityIssue};
pub use lots_model::{
    CostBasisCalculation, CostBasisMethod, DisposalRequest, DisposalResult, GainLoss,
    HoldingPeriod, Lot, LotConsumption,
};
pub use lots_service::LotAllocator;
