//! Calculation result models for the Export Benefit Engine.
//!
//! This module contains the read-only outputs of the drawback and RoDTEP
//! calculators: per-line breakdowns, aggregate totals, cap flags and the
//! audit steps recording every decision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the scheme provision for this rule.
    pub reference: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Drawback computed for one line item.
///
/// # Example
///
/// ```
/// use benefit_engine::models::ItemCalculation;
/// use rust_decimal::Decimal;
///
/// let item = ItemCalculation {
///     item_id: "item_001".to_string(),
///     tariff_heading: "610901".to_string(),
///     fob_value: Decimal::new(5000, 0),
///     rate_applied: Decimal::new(2, 0),
///     calculated_amount: Decimal::new(100, 0),
///     cap_applied: false,
/// };
/// assert!(item.calculated_amount <= item.fob_value);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCalculation {
    /// The line item identifier.
    pub item_id: String,
    /// The tariff heading the rate was looked up by.
    pub tariff_heading: String,
    /// Quantity × unit price.
    pub fob_value: Decimal,
    /// The percentage rate applied.
    pub rate_applied: Decimal,
    /// The drawback for the item after any per-unit cap.
    pub calculated_amount: Decimal,
    /// Whether the per-unit cap reduced the amount.
    pub cap_applied: bool,
}

/// The complete result of a drawback calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawbackCalculation {
    /// The claim this calculation belongs to.
    pub claim_id: String,
    /// Per-item breakdown, in claim item order.
    pub item_calculations: Vec<ItemCalculation>,
    /// Sum of FOB values across items.
    pub total_fob: Decimal,
    /// Total drawback after the aggregate FOB cap.
    pub total_drawback: Decimal,
    /// Whether the aggregate cap on total FOB value reduced the total.
    pub capped_by_fob: bool,
    /// Every decision taken during the calculation.
    pub audit_steps: Vec<AuditStep>,
}

/// Whether a RoDTEP calculation can be approved without a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    /// At or below the automatic approval threshold.
    Approved,
    /// Above the threshold; needs human sign-off.
    PendingReview,
}

impl CalculationStatus {
    /// Returns the snake_case name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationStatus::Approved => "approved",
            CalculationStatus::PendingReview => "pending_review",
        }
    }
}

/// RoDTEP benefit computed for one product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBenefit {
    /// The HS code the rate was looked up by.
    pub hs_code: String,
    /// The export category of the product.
    pub category: String,
    /// FOB value of the line.
    pub value: Decimal,
    /// The percentage rate applied.
    pub rate_applied: Decimal,
    /// Benefit after any per-unit cap.
    pub benefit_amount: Decimal,
    /// Whether the per-unit cap reduced the benefit.
    pub cap_applied: bool,
}

/// The complete result of a RoDTEP benefit calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodtepCalculation {
    /// The claim this calculation belongs to.
    pub claim_id: String,
    /// Per-product breakdown, in claim order.
    pub product_benefits: Vec<ProductBenefit>,
    /// Sum of product values.
    pub total_value: Decimal,
    /// Sum of product benefits.
    pub total_benefit: Decimal,
    /// Approval decision for the calculated benefit.
    pub status: CalculationStatus,
    /// Every decision taken during the calculation.
    pub audit_steps: Vec<AuditStep>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_item_calculation_serialization() {
        let item = ItemCalculation {
            item_id: "item_001".to_string(),
            tariff_heading: "610901".to_string(),
            fob_value: dec("5000"),
            rate_applied: dec("10"),
            calculated_amount: dec("200"),
            cap_applied: true,
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"item_id\":\"item_001\""));
        assert!(json.contains("\"fob_value\":\"5000\""));
        assert!(json.contains("\"calculated_amount\":\"200\""));
        assert!(json.contains("\"cap_applied\":true"));
    }

    #[test]
    fn test_calculation_status_serialization() {
        let json = serde_json::to_string(&CalculationStatus::PendingReview).unwrap();
        assert_eq!(json, "\"pending_review\"");

        let status: CalculationStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, CalculationStatus::Approved);
    }

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "drawback_item".to_string(),
            rule_name: "Drawback Item Calculation".to_string(),
            reference: "Drawback Rules 2017, Rule 3".to_string(),
            input: serde_json::json!({"quantity": "100"}),
            output: serde_json::json!({"amount": "100"}),
            reasoning: "5000 × 2% = 100".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step_number\":1"));
        assert!(json.contains("\"rule_id\":\"drawback_item\""));
        assert!(json.contains("\"reference\":\"Drawback Rules 2017, Rule 3\""));
    }

    #[test]
    fn test_drawback_calculation_deserialization() {
        let json = r#"{
            "claim_id": "DBK-001",
            "item_calculations": [],
            "total_fob": "0",
            "total_drawback": "0",
            "capped_by_fob": false,
            "audit_steps": []
        }"#;

        let calc: DrawbackCalculation = serde_json::from_str(json).unwrap();
        assert_eq!(calc.claim_id, "DBK-001");
        assert_eq!(calc.total_fob, Decimal::ZERO);
        assert!(!calc.capped_by_fob);
    }
}
