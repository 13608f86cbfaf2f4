//! Compliance module - GAAP/IFRS measurement, impairment, and disclosure.

mod compliance_errors;
mod compliance_model;
mod compliance_service;

pub use compliance_errors::ComplianceError;
pub use compliance_model::{
    AccountingStandard, AssetClassification, ClassificationDisclosure, ComplianceSettings,
    DisclosureReport, GaapIfrsReconciliation, IfrsMeasurementModel, ImpairmentEvent,
    ImpairmentSummary, ImpairmentTest, JournalEntry, JournalEntryKind, KeyDifference,
    MeasurementBasis, MeasurementMethodology, MeasurementResult, ReconciliationAdjustment,
    SignificantHolding,
};
pub use compliance_service::{measurement_basis, ComplianceEngine};
