//! Holdings module - derived per-asset aggregates over lots.

mod holdings_model;
mod holdings_service;

pub use holdings_model::{CostBasisByMethod, Holding, UnrealizedByMethod};
pub use holdings_service::build_holding;

#[cfg(test)]
mod holdings_service_tests;
