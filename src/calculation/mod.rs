//! Calculation logic for the Export Benefit Engine.
//!
//! This module contains the rate lookup seam, the duty drawback calculator
//! with its per-unit and aggregate FOB caps, RoDTEP validation, eligibility
//! and benefit calculation, e-scrip issuance, and the injectable business
//! rules applied on top of the fixed scheme checks.

mod compliance;
mod drawback;
mod escrip;
mod rate_lookup;
mod rodtep;

pub use compliance::{
    BUSINESS_RULE_CODE, BusinessRule, DuplicateItemRule, RuleSet, RuleViolation,
    default_drawback_rules,
};
pub use drawback::{
    DRAWBACK_FOB_CAP_RATE, DRAWBACK_FOB_CAP_REFERENCE, DRAWBACK_RATE_REFERENCE,
    calculate_drawback, validate_drawback_claim,
};
pub use escrip::{ESCRIP_VALIDITY_DAYS, build_escrip, issue_escrip};
pub use rate_lookup::{RateSource, apply_unit_cap, lookup_rate};
pub use rodtep::{
    EligibilityResult, INELIGIBLE_CODE, RODTEP_RATE_REFERENCE, calculate_rodtep_benefits,
    check_rodtep_eligibility, validate_rodtep_claim,
};
