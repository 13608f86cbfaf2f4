//! Lotbook Core - crypto-asset accounting computation engine.
//!
//! This crate turns raw acquisition/disposal events into financial facts:
//! lot-level cost basis (FIFO/LIFO/HIFO/Specific-ID), US GAAP / IFRS
//! measurement and disclosure, and exact-decimal currency conversion with a
//! TTL rate cache. It is persistence- and transport-agnostic: callers supply
//! lots, settings, and fair values, and consume plain serializable results.

pub mod compliance;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod holdings;
pub mod lots;

// Re-export common types from the lots and holdings modules
pub use holdings::*;
pub use lots::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
