//! RoDTEP (Remission of Duties and Taxes on Exported Products) functionality.
//!
//! A RoDTEP claim passes three gates before a benefit is paid:
//!
//! 1. **Validation** against the rule set in force on the export date:
//!    excluded categories first, then required documents. The first
//!    failure is reported.
//! 2. **Eligibility**: every product must be notified in the RoDTEP
//!    schedule with a positive quantity and value, and the claim must be
//!    filed within the filing window. All reasons are collected.
//! 3. **Calculation**: `value × rate / 100` per product, clamped by the
//!    per-unit cap where the schedule defines one. Totals at or below the
//!    auto-approval threshold are approved; larger totals go to review.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::RuleSetConfig;
use crate::error::{EngineError, EngineResult, ValidationKind};
use crate::models::{
    AuditStep, CalculationStatus, ProductBenefit, RejectionReason, RodtepCalculation, RodtepClaim,
};

use super::compliance::RuleSet;
use super::rate_lookup::{RateSource, accumulate, apply_unit_cap, lookup_rate, percentage_of};

/// Rejection code for eligibility failures.
pub const INELIGIBLE_CODE: &str = "INELIGIBLE";

/// Reference for RoDTEP rate application.
pub const RODTEP_RATE_REFERENCE: &str = "RoDTEP Appendix 4R";

/// Validates a RoDTEP claim against a rule set.
///
/// # Errors
///
/// - `Validation(MISSING_FIELD)` if the claim id or shipping bill number is
///   blank, or the claim has no products
/// - `Validation(EXCLUDED_CATEGORY)` for the first product whose category is
///   excluded
/// - `Validation(MISSING_DOCUMENT)` for the first required document that was
///   not submitted
pub fn validate_rodtep_claim(claim: &RodtepClaim, rules: &RuleSetConfig) -> EngineResult<()> {
    if claim.claim_id.trim().is_empty() {
        return Err(EngineError::validation(
            ValidationKind::MissingField,
            "claim_id is required",
        ));
    }
    if claim.export_details.shipping_bill_no.trim().is_empty() {
        return Err(EngineError::validation(
            ValidationKind::MissingField,
            "shipping_bill_no is required",
        ));
    }
    if claim.product_details.is_empty() {
        return Err(EngineError::validation(
            ValidationKind::MissingField,
            "claim must contain at least one product",
        ));
    }

    for product in &claim.product_details {
        if rules.excluded_categories.contains(&product.category) {
            return Err(EngineError::validation(
                ValidationKind::ExcludedCategory,
                format!("Product falls under excluded category: {}", product.category),
            ));
        }
    }

    for document in &rules.required_documents {
        if !claim.has_document(&document.name) {
            return Err(EngineError::validation(
                ValidationKind::MissingDocument,
                format!("Missing required document: {}", document.name),
            ));
        }
    }

    Ok(())
}

/// The result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityResult {
    /// True when no reason was found.
    pub eligible: bool,
    /// Every reason the claim is ineligible.
    pub reasons: Vec<RejectionReason>,
}

impl EligibilityResult {
    fn from_reasons(reasons: Vec<RejectionReason>) -> Self {
        Self {
            eligible: reasons.is_empty(),
            reasons,
        }
    }
}

/// Checks whether a validated claim may receive a benefit.
///
/// `as_of` is the filing date the window is measured against. Extra
/// deployment rules in `extra_rules` contribute `BUSINESS_RULE` reasons.
///
/// # Errors
///
/// Only rate source failures are returned as errors; a product without a
/// rate is reported as a reason.
pub fn check_rodtep_eligibility<R: RateSource + ?Sized>(
    claim: &RodtepClaim,
    rates: &R,
    filing_window_days: u32,
    as_of: NaiveDate,
    extra_rules: &RuleSet<RodtepClaim>,
) -> EngineResult<EligibilityResult> {
    let mut reasons = Vec::new();

    for product in &claim.product_details {
        if rates.get_rate(&product.hs_code)?.is_none() {
            reasons.push(RejectionReason::new(
                INELIGIBLE_CODE,
                format!("HS code {} is not notified under RoDTEP", product.hs_code),
            ));
        }
        if product.quantity <= Decimal::ZERO {
            reasons.push(RejectionReason::new(
                INELIGIBLE_CODE,
                format!(
                    "Product {} has non-positive quantity {}",
                    product.hs_code, product.quantity
                ),
            ));
        }
        if product.value <= Decimal::ZERO {
            reasons.push(RejectionReason::new(
                INELIGIBLE_CODE,
                format!(
                    "Product {} has non-positive value {}",
                    product.hs_code, product.value
                ),
            ));
        }
    }

    let export_date = claim.export_details.export_date;
    if export_date > as_of {
        reasons.push(RejectionReason::new(
            INELIGIBLE_CODE,
            format!("Export date {} is after filing date {}", export_date, as_of),
        ));
    } else {
        let elapsed = (as_of - export_date).num_days();
        if elapsed > i64::from(filing_window_days) {
            reasons.push(RejectionReason::new(
                INELIGIBLE_CODE,
                format!(
                    "Claim filed {} days after export, beyond the {} day filing window",
                    elapsed, filing_window_days
                ),
            ));
        }
    }

    reasons.extend(extra_rules.evaluate(claim).into_iter().map(RejectionReason::from));

    Ok(EligibilityResult::from_reasons(reasons))
}

/// Calculates the RoDTEP benefit for a claim.
///
/// The result is `approved` when the total benefit is at or below
/// `auto_approval_threshold`, otherwise `pending_review`.
///
/// # Errors
///
/// - `Validation(INVALID_RATE)` if a product's HS code has no rate
/// - `CalculationError` if an amount or total is not representable
/// - any rate source failure unchanged
pub fn calculate_rodtep_benefits<R: RateSource + ?Sized>(
    claim: &RodtepClaim,
    rates: &R,
    auto_approval_threshold: Decimal,
) -> EngineResult<RodtepCalculation> {
    let mut product_benefits = Vec::with_capacity(claim.product_details.len());
    let mut audit_steps = Vec::with_capacity(claim.product_details.len() + 1);
    let mut total_value = Decimal::ZERO;
    let mut total_benefit = Decimal::ZERO;
    let mut step_number: u32 = 1;

    for product in &claim.product_details {
        let rate = lookup_rate(rates, &product.hs_code)?;

        let uncapped_amount = percentage_of(product.value, rate.rate)?;
        let (amount, cap_applied) =
            apply_unit_cap(uncapped_amount, rate.cap_per_unit, product.quantity);

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "rodtep_product".to_string(),
            rule_name: "RoDTEP Product Benefit".to_string(),
            reference: RODTEP_RATE_REFERENCE.to_string(),
            input: serde_json::json!({
                "hs_code": product.hs_code,
                "quantity": product.quantity.normalize().to_string(),
                "value": product.value.normalize().to_string(),
                "rate": rate.rate.normalize().to_string(),
                "cap_per_unit": rate.cap_per_unit.map(|c| c.normalize().to_string())
            }),
            output: serde_json::json!({
                "uncapped_amount": uncapped_amount.normalize().to_string(),
                "amount": amount.normalize().to_string(),
                "cap_applied": cap_applied
            }),
            reasoning: if cap_applied {
                format!(
                    "{} × {}% = {}, capped at {}",
                    product.value.normalize(),
                    rate.rate.normalize(),
                    uncapped_amount.normalize(),
                    amount.normalize()
                )
            } else {
                format!(
                    "{} × {}% = {}",
                    product.value.normalize(),
                    rate.rate.normalize(),
                    amount.normalize()
                )
            },
        });
        step_number += 1;

        product_benefits.push(ProductBenefit {
            hs_code: product.hs_code.clone(),
            category: product.category.clone(),
            value: product.value,
            rate_applied: rate.rate,
            benefit_amount: amount,
            cap_applied,
        });

        accumulate(&mut total_value, product.value, "total export value")?;
        accumulate(&mut total_benefit, amount, "total benefit")?;
    }

    let status = if total_benefit <= auto_approval_threshold {
        CalculationStatus::Approved
    } else {
        CalculationStatus::PendingReview
    };

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "rodtep_approval".to_string(),
        rule_name: "Auto-Approval Threshold".to_string(),
        reference: "scheme.yaml rodtep.auto_approval_threshold".to_string(),
        input: serde_json::json!({
            "total_benefit": total_benefit.normalize().to_string(),
            "threshold": auto_approval_threshold.normalize().to_string()
        }),
        output: serde_json::json!({ "status": status }),
        reasoning: match status {
            CalculationStatus::Approved => format!(
                "Total benefit {} is within the auto-approval threshold {}",
                total_benefit.normalize(),
                auto_approval_threshold.normalize()
            ),
            CalculationStatus::PendingReview => format!(
                "Total benefit {} exceeds the auto-approval threshold {}; manual review required",
                total_benefit.normalize(),
                auto_approval_threshold.normalize()
            ),
        },
    });

    Ok(RodtepCalculation {
        claim_id: claim.claim_id.clone(),
        product_benefits,
        total_value,
        total_benefit,
        status,
        audit_steps,
    })
}
