//! Core data models for the Export Benefit Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod drawback_claim;
mod escrip;
mod outcome;
mod rate;
mod rodtep_claim;

pub use calculation_result::{
    AuditStep, CalculationStatus, DrawbackCalculation, ItemCalculation, ProductBenefit,
    RodtepCalculation,
};
pub use drawback_claim::{
    DrawbackClaim, DrawbackItem, DrawbackStatus, ExporterDetails, ProcessingEvent,
};
pub use escrip::{EScrip, ExportReference, ScripStatus};
pub use outcome::{DrawbackOutcome, DrawbackRecord, RejectionReason, RodtepOutcome, RodtepRecord};
pub use rate::RateRecord;
pub use rodtep_claim::{ExportDetails, RodtepClaim, RodtepProduct, RodtepStatus};
