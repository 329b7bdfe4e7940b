//! Duty drawback calculation functionality.
//!
//! This module validates drawback claims and computes the drawback payable
//! on each line item, applying the per-unit cap from the rate schedule and
//! the aggregate cap of 12.5% of total FOB value.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult, ValidationKind};
use crate::models::{AuditStep, DrawbackCalculation, DrawbackClaim, DrawbackItem, ItemCalculation};

use super::rate_lookup::{
    RateSource, accumulate, apply_unit_cap, lookup_rate, overflow, percentage_of,
};

/// The maximum total drawback as a fraction of total FOB value (12.5%).
pub const DRAWBACK_FOB_CAP_RATE: Decimal = Decimal::from_parts(125, 0, 0, false, 3);

/// Reference for drawback rate application.
pub const DRAWBACK_RATE_REFERENCE: &str = "Drawback Rules 2017, Rule 3";

/// Reference for the aggregate FOB cap.
pub const DRAWBACK_FOB_CAP_REFERENCE: &str = "Drawback Rules 2017, Rule 8";

/// Validates a drawback claim before calculation.
///
/// # Errors
///
/// - `Validation(MISSING_FIELD)` if the claim id or shipping bill number is
///   blank, or the claim has no items
/// - `CalculationError` if an item has a negative quantity or unit price
/// - `Validation(INVALID_RATE)` if an item's tariff heading has no rate
/// - `RateSourceUnavailable` (or any other rate source error) unchanged
pub fn validate_drawback_claim<R: RateSource + ?Sized>(
    claim: &DrawbackClaim,
    rates: &R,
) -> EngineResult<()> {
    if claim.claim_id.trim().is_empty() {
        return Err(EngineError::validation(
            ValidationKind::MissingField,
            "claim_id is required",
        ));
    }
    if claim.shipping_bill_no.trim().is_empty() {
        return Err(EngineError::validation(
            ValidationKind::MissingField,
            "shipping_bill_no is required",
        ));
    }
    if claim.items.is_empty() {
        return Err(EngineError::validation(
            ValidationKind::MissingField,
            "claim must contain at least one item",
        ));
    }

    for item in &claim.items {
        check_item_amounts(item)?;
    }

    for item in &claim.items {
        lookup_rate(rates, &item.tariff_heading)?;
    }

    Ok(())
}

fn check_item_amounts(item: &DrawbackItem) -> EngineResult<()> {
    if item.quantity < Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!("Item '{}' has negative quantity {}", item.id, item.quantity),
        });
    }
    if item.unit_price < Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!(
                "Item '{}' has negative unit price {}",
                item.id, item.unit_price
            ),
        });
    }
    Ok(())
}

/// Validates a drawback claim and calculates the drawback payable.
///
/// For each item, `fob_value = quantity × unit_price` and
/// `amount = fob_value × rate / 100`, reduced to `cap_per_unit × quantity`
/// when the rate defines a per-unit cap. The summed drawback is then capped
/// at 12.5% of the summed FOB value.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::calculate_drawback;
/// use benefit_engine::models::{
///     DrawbackClaim, DrawbackItem, DrawbackStatus, ExporterDetails, RateRecord,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let mut rates = HashMap::new();
/// rates.insert("610901".to_string(), RateRecord::new("610901", Decimal::new(2, 0)));
///
/// let claim = DrawbackClaim {
///     claim_id: "DBK-001".to_string(),
///     shipping_bill_no: "SB1234567".to_string(),
///     shipping_bill_date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
///     exporter: ExporterDetails {
///         name: "Acme Textiles".to_string(),
///         iec_number: "0305012345".to_string(),
///     },
///     items: vec![DrawbackItem {
///         id: "item_001".to_string(),
///         quantity: Decimal::new(100, 0),
///         unit_price: Decimal::new(50, 0),
///         tariff_heading: "610901".to_string(),
///     }],
///     status: DrawbackStatus::Pending,
///     processing_history: vec![],
/// };
///
/// let result = calculate_drawback(&claim, &rates).unwrap();
/// assert_eq!(result.total_fob, Decimal::new(5000, 0));
/// assert_eq!(result.total_drawback, Decimal::new(100, 0));
/// ```
pub fn calculate_drawback<R: RateSource + ?Sized>(
    claim: &DrawbackClaim,
    rates: &R,
) -> EngineResult<DrawbackCalculation> {
    validate_drawback_claim(claim, rates)?;
    compute_drawback(claim, rates)
}

/// Calculates the drawback for a claim that has already been validated.
fn compute_drawback<R: RateSource + ?Sized>(
    claim: &DrawbackClaim,
    rates: &R,
) -> EngineResult<DrawbackCalculation> {
    let mut item_calculations = Vec::with_capacity(claim.items.len());
    let mut audit_steps = Vec::with_capacity(claim.items.len() + 1);
    let mut total_fob = Decimal::ZERO;
    let mut total_drawback = Decimal::ZERO;
    let mut step_number: u32 = 1;

    for item in &claim.items {
        let rate = lookup_rate(rates, &item.tariff_heading)?;

        let fob_value = item.fob_value()?;
        let uncapped_amount = percentage_of(fob_value, rate.rate)?;
        let (amount, cap_applied) = apply_unit_cap(uncapped_amount, rate.cap_per_unit, item.quantity);

        let reasoning = match rate.cap_per_unit {
            Some(cap) if cap_applied => format!(
                "{} × {}% = {} (capped at {} per unit × {} = {})",
                fob_value.normalize(),
                rate.rate.normalize(),
                uncapped_amount.normalize(),
                cap.normalize(),
                item.quantity.normalize(),
                amount.normalize()
            ),
            _ => format!(
                "{} × {}% = {}",
                fob_value.normalize(),
                rate.rate.normalize(),
                amount.normalize()
            ),
        };

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "drawback_item".to_string(),
            rule_name: "Drawback Item Calculation".to_string(),
            reference: DRAWBACK_RATE_REFERENCE.to_string(),
            input: serde_json::json!({
                "item_id": item.id,
                "tariff_heading": item.tariff_heading,
                "quantity": item.quantity.normalize().to_string(),
                "unit_price": item.unit_price.normalize().to_string(),
                "rate": rate.rate.normalize().to_string(),
                "cap_per_unit": rate.cap_per_unit.map(|c| c.normalize().to_string())
            }),
            output: serde_json::json!({
                "fob_value": fob_value.normalize().to_string(),
                "uncapped_amount": uncapped_amount.normalize().to_string(),
                "amount": amount.normalize().to_string(),
                "cap_applied": cap_applied
            }),
            reasoning,
        });
        step_number += 1;

        item_calculations.push(ItemCalculation {
            item_id: item.id.clone(),
            tariff_heading: item.tariff_heading.clone(),
            fob_value,
            rate_applied: rate.rate,
            calculated_amount: amount,
            cap_applied,
        });

        accumulate(&mut total_fob, fob_value, "total FOB value")?;
        accumulate(&mut total_drawback, amount, "total drawback")?;
    }

    let uncapped_total = total_drawback;
    let max_allowed = total_fob
        .checked_mul(DRAWBACK_FOB_CAP_RATE)
        .ok_or_else(|| overflow("12.5% of total FOB value".to_string()))?;
    let capped_by_fob = total_drawback > max_allowed;
    if capped_by_fob {
        total_drawback = max_allowed;
    }

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "drawback_fob_cap".to_string(),
        rule_name: "Aggregate FOB Cap".to_string(),
        reference: DRAWBACK_FOB_CAP_REFERENCE.to_string(),
        input: serde_json::json!({
            "total_fob": total_fob.normalize().to_string(),
            "uncapped_total": uncapped_total.normalize().to_string()
        }),
        output: serde_json::json!({
            "max_allowed": max_allowed.normalize().to_string(),
            "total_drawback": total_drawback.normalize().to_string(),
            "cap_applied": capped_by_fob
        }),
        reasoning: if capped_by_fob {
            format!(
                "Total drawback {} exceeds 12.5% of FOB {}; capped at {}",
                uncapped_total.normalize(),
                total_fob.normalize(),
                max_allowed.normalize()
            )
        } else {
            format!(
                "Total drawback {} is within 12.5% of FOB {} ({})",
                uncapped_total.normalize(),
                total_fob.normalize(),
                max_allowed.normalize()
            )
        },
    });

    Ok(DrawbackCalculation {
        claim_id: claim.claim_id.clone(),
        item_calculations,
        total_fob,
        total_drawback,
        capped_by_fob,
        audit_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DrawbackStatus, ExporterDetails, RateRecord};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_rates() -> HashMap<String, RateRecord> {
        let mut rates = HashMap::new();
        rates.insert("610901".to_string(), RateRecord::new("610901", dec("2")));
        rates.insert(
            "540701".to_string(),
            RateRecord::new("540701", dec("10")).with_cap(dec("2")),
        );
        rates.insert("730701".to_string(), RateRecord::new("730701", dec("15")));
        rates.insert("071301".to_string(), RateRecord::new("071301", dec("0.15")));
        rates
    }

    fn item(id: &str, quantity: &str, unit_price: &str, tariff: &str) -> DrawbackItem {
        DrawbackItem {
            id: id.to_string(),
            quantity: dec(quantity),
            unit_price: dec(unit_price),
            tariff_heading: tariff.to_string(),
        }
    }

    fn create_test_claim(items: Vec<DrawbackItem>) -> DrawbackClaim {
        DrawbackClaim {
            claim_id: "DBK-001".to_string(),
            shipping_bill_no: "SB1234567".to_string(),
            shipping_bill_date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            exporter: ExporterDetails {
                name: "Acme Textiles".to_string(),
                iec_number: "0305012345".to_string(),
            },
            items,
            status: DrawbackStatus::Pending,
            processing_history: vec![],
        }
    }

    /// DB-001: rate without cap
    #[test]
    fn test_db_001_rate_without_cap() {
        let claim = create_test_claim(vec![item("item_001", "100", "50", "610901")]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        let line = &result.item_calculations[0];
        assert_eq!(line.fob_value, dec("5000"));
        assert_eq!(line.rate_applied, dec("2"));
        assert_eq!(line.calculated_amount, dec("100"));
        assert!(!line.cap_applied);
        assert_eq!(result.total_drawback, dec("100"));
        assert!(!result.capped_by_fob);
    }

    /// DB-002: per-unit cap reduces the item amount
    #[test]
    fn test_db_002_per_unit_cap_applied() {
        let claim = create_test_claim(vec![item("item_001", "100", "50", "540701")]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        let line = &result.item_calculations[0];
        assert_eq!(line.fob_value, dec("5000"));
        // 5000 × 10% = 500, capped at 2 × 100 = 200
        assert_eq!(line.calculated_amount, dec("200"));
        assert!(line.cap_applied);
        assert_eq!(
            result.audit_steps[0].output["uncapped_amount"]
                .as_str()
                .unwrap(),
            "500"
        );
        assert!(result.audit_steps[0].reasoning.contains("capped"));
    }

    /// DB-003: aggregate cap at 12.5% of FOB
    #[test]
    fn test_db_003_aggregate_cap_applied() {
        let claim = create_test_claim(vec![
            item("item_001", "100", "50", "730701"),
            item("item_002", "10", "100", "730701"),
        ]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        // FOB 5000 + 1000 = 6000; raw 750 + 150 = 900 > 750
        assert_eq!(result.total_fob, dec("6000"));
        assert_eq!(result.total_drawback, dec("750"));
        assert!(result.capped_by_fob);
        assert_eq!(result.total_drawback, result.total_fob * DRAWBACK_FOB_CAP_RATE);

        let cap_step = result.audit_steps.last().unwrap();
        assert_eq!(cap_step.rule_id, "drawback_fob_cap");
        assert!(cap_step.output["cap_applied"].as_bool().unwrap());
    }

    #[test]
    fn test_fob_cap_rate_is_twelve_and_a_half_percent() {
        assert_eq!(DRAWBACK_FOB_CAP_RATE, dec("0.125"));
    }

    #[test]
    fn test_items_keep_input_order() {
        let claim = create_test_claim(vec![
            item("item_b", "1", "10", "610901"),
            item("item_a", "2", "10", "540701"),
            item("item_c", "3", "10", "071301"),
        ]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        let ids: Vec<&str> = result
            .item_calculations
            .iter()
            .map(|c| c.item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["item_b", "item_a", "item_c"]);
        assert_eq!(result.audit_steps.len(), 4);
        assert_eq!(result.audit_steps[3].step_number, 4);
    }

    #[test]
    fn test_total_is_sum_of_items_when_under_cap() {
        let claim = create_test_claim(vec![
            item("item_001", "100", "50", "610901"),
            item("item_002", "1000", "12.40", "071301"),
        ]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        let sum: Decimal = result
            .item_calculations
            .iter()
            .map(|c| c.calculated_amount)
            .sum();
        assert_eq!(result.total_drawback, sum);
        // 100 + 12400 × 0.15% = 100 + 18.60
        assert_eq!(result.total_drawback, dec("118.60"));
    }

    #[test]
    fn test_total_exactly_at_cap_is_not_flagged() {
        let mut rates = create_test_rates();
        rates.insert("999901".to_string(), RateRecord::new("999901", dec("12.5")));
        let claim = create_test_claim(vec![item("item_001", "8", "100", "999901")]);

        let result = calculate_drawback(&claim, &rates).unwrap();
        assert_eq!(result.total_drawback, dec("100"));
        assert!(!result.capped_by_fob);
    }

    #[test]
    fn test_item_exactly_at_unit_cap_is_flagged() {
        // 2000 × 10% = 200, equal to 2 × 100
        let claim = create_test_claim(vec![item("item_001", "100", "20", "540701")]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        let line = &result.item_calculations[0];
        assert_eq!(line.calculated_amount, dec("200"));
        assert!(line.cap_applied);
        assert_eq!(result.audit_steps[0].output["cap_applied"], true);
    }

    #[test]
    fn test_zero_quantity_item_yields_zero() {
        let claim = create_test_claim(vec![item("item_001", "0", "50", "540701")]);
        let result = calculate_drawback(&claim, &create_test_rates()).unwrap();

        assert_eq!(result.total_fob, Decimal::ZERO);
        assert_eq!(result.total_drawback, Decimal::ZERO);
        assert!(!result.capped_by_fob);
    }

    #[test]
    fn test_empty_shipping_bill_is_missing_field() {
        let mut claim = create_test_claim(vec![item("item_001", "1", "1", "610901")]);
        claim.shipping_bill_no = "  ".to_string();

        match calculate_drawback(&claim, &create_test_rates()) {
            Err(EngineError::Validation { kind, .. }) => {
                assert_eq!(kind, ValidationKind::MissingField)
            }
            other => panic!("Expected MISSING_FIELD, got {:?}", other),
        }
    }

    #[test]
    fn test_no_items_is_missing_field() {
        let claim = create_test_claim(vec![]);

        match validate_drawback_claim(&claim, &create_test_rates()) {
            Err(EngineError::Validation { kind, message }) => {
                assert_eq!(kind, ValidationKind::MissingField);
                assert!(message.contains("at least one item"));
            }
            other => panic!("Expected MISSING_FIELD, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tariff_is_invalid_rate() {
        let claim = create_test_claim(vec![
            item("item_001", "1", "1", "610901"),
            item("item_002", "1", "1", "000000"),
        ]);

        match calculate_drawback(&claim, &create_test_rates()) {
            Err(EngineError::Validation { kind, message }) => {
                assert_eq!(kind, ValidationKind::InvalidRate);
                assert!(message.contains("000000"));
            }
            other => panic!("Expected INVALID_RATE, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_quantity_is_calculation_error() {
        let claim = create_test_claim(vec![item("item_001", "-1", "50", "610901")]);

        let result = calculate_drawback(&claim, &create_test_rates());
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_negative_unit_price_is_calculation_error() {
        let claim = create_test_claim(vec![item("item_001", "1", "-0.01", "610901")]);

        let result = calculate_drawback(&claim, &create_test_rates());
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_overflowing_fob_value_is_calculation_error() {
        let claim = create_test_claim(vec![item(
            "item_001",
            "100000000000000000",
            "100000000000000",
            "610901",
        )]);

        match calculate_drawback(&claim, &create_test_rates()) {
            Err(error @ EngineError::CalculationError { .. }) => {
                assert!(error.is_business_rejection());
                assert!(error.to_string().contains("item_001"));
            }
            other => panic!("Expected CALCULATION_ERROR, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_total_fob_is_calculation_error() {
        let mut rates = create_test_rates();
        rates.insert("999901".to_string(), RateRecord::new("999901", dec("1")));
        let claim = create_test_claim(vec![
            item("item_001", "1", "50000000000000000000000000000", "999901"),
            item("item_002", "1", "50000000000000000000000000000", "999901"),
        ]);

        match calculate_drawback(&claim, &rates) {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("total FOB value"))
            }
            other => panic!("Expected CALCULATION_ERROR, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_source_failure_propagates() {
        struct Unavailable;
        impl RateSource for Unavailable {
            fn get_rate(&self, code: &str) -> EngineResult<Option<RateRecord>> {
                Err(EngineError::RateSourceUnavailable {
                    code: code.to_string(),
                    message: "connection refused".to_string(),
                })
            }
        }

        let claim = create_test_claim(vec![item("item_001", "1", "1", "610901")]);
        let error = calculate_drawback(&claim, &Unavailable).unwrap_err();

        assert!(error.is_retryable());
        assert!(!error.is_business_rejection());
    }
}
