//! Rate lookup functionality.
//!
//! This module defines the [`RateSource`] seam the calculators read rates
//! through, implements it for the configured rate schedules, and provides
//! the per-unit cap rule shared by both schemes.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::config::RateSchedule;
use crate::error::{EngineError, EngineResult, ValidationKind};
use crate::models::RateRecord;

/// A read-only source of benefit rates.
///
/// `Ok(None)` means the code has no rate, which makes the claim invalid.
/// `Err` means the lookup itself failed and the caller may retry later.
pub trait RateSource {
    /// Looks up the rate for a tariff heading or HS code.
    fn get_rate(&self, code: &str) -> EngineResult<Option<RateRecord>>;
}

impl RateSource for RateSchedule {
    fn get_rate(&self, code: &str) -> EngineResult<Option<RateRecord>> {
        Ok(self.rates.get(code).map(|entry| RateRecord {
            code: code.to_string(),
            rate: entry.rate,
            cap_per_unit: entry.cap_per_unit,
        }))
    }
}

impl RateSource for HashMap<String, RateRecord> {
    fn get_rate(&self, code: &str) -> EngineResult<Option<RateRecord>> {
        Ok(self.get(code).cloned())
    }
}

/// Looks up a rate that must exist.
///
/// Returns `Validation(INVALID_RATE)` when the source has no rate for `code`.
pub fn lookup_rate<R: RateSource + ?Sized>(rates: &R, code: &str) -> EngineResult<RateRecord> {
    rates.get_rate(code)?.ok_or_else(|| {
        EngineError::validation(
            ValidationKind::InvalidRate,
            format!("Invalid rate for tariff {}", code),
        )
    })
}

/// Clamps `amount` to `cap_per_unit × quantity` when a cap is defined.
///
/// Returns the (possibly reduced) amount and whether the cap bound it.
/// An amount exactly equal to the cap is reported as capped. A cap whose
/// product with `quantity` is not representable never binds.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::apply_unit_cap;
/// use rust_decimal::Decimal;
///
/// let (amount, capped) = apply_unit_cap(Decimal::new(500, 0), Some(Decimal::new(2, 0)), Decimal::new(100, 0));
/// assert_eq!(amount, Decimal::new(200, 0));
/// assert!(capped);
///
/// let (amount, capped) = apply_unit_cap(Decimal::new(500, 0), None, Decimal::new(100, 0));
/// assert_eq!(amount, Decimal::new(500, 0));
/// assert!(!capped);
/// ```
pub fn apply_unit_cap(
    amount: Decimal,
    cap_per_unit: Option<Decimal>,
    quantity: Decimal,
) -> (Decimal, bool) {
    match cap_per_unit {
        Some(cap) => match cap.checked_mul(quantity) {
            Some(max_amount) if amount >= max_amount => (max_amount, true),
            _ => (amount, false),
        },
        None => (amount, false),
    }
}

/// Returns `value × rate / 100`.
///
/// Fails with `CalculationError` when the product is not representable.
pub(crate) fn percentage_of(value: Decimal, rate: Decimal) -> EngineResult<Decimal> {
    value
        .checked_mul(rate)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| overflow(format!("{} × {}%", value, rate)))
}

/// Adds `amount` to a running total, failing with `CalculationError` on overflow.
pub(crate) fn accumulate(total: &mut Decimal, amount: Decimal, what: &str) -> EngineResult<()> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| overflow(what.to_string()))?;
    Ok(())
}

pub(crate) fn overflow(what: String) -> EngineError {
    EngineError::CalculationError {
        message: format!("Arithmetic overflow computing {}", what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleEntry;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_schedule() -> RateSchedule {
        let mut rates = HashMap::new();
        rates.insert(
            "540701".to_string(),
            ScheduleEntry {
                description: Some("Woven fabrics".to_string()),
                rate: dec("10.0"),
                cap_per_unit: Some(dec("2.00")),
            },
        );
        RateSchedule {
            scheme: "drawback".to_string(),
            notification: "test".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2023, 10, 30).unwrap(),
            rates,
        }
    }

    #[test]
    fn test_schedule_returns_rate_record() {
        let schedule = create_test_schedule();
        let rate = schedule.get_rate("540701").unwrap().unwrap();

        assert_eq!(rate.code, "540701");
        assert_eq!(rate.rate, dec("10.0"));
        assert_eq!(rate.cap_per_unit, Some(dec("2.00")));
    }

    #[test]
    fn test_schedule_unknown_code_is_none() {
        let schedule = create_test_schedule();
        assert!(schedule.get_rate("999999").unwrap().is_none());
    }

    #[test]
    fn test_lookup_rate_missing_is_invalid_rate() {
        let rates: HashMap<String, RateRecord> = HashMap::new();

        match lookup_rate(&rates, "999999") {
            Err(EngineError::Validation { kind, message }) => {
                assert_eq!(kind, ValidationKind::InvalidRate);
                assert!(message.contains("999999"));
            }
            other => panic!("Expected INVALID_RATE, got {:?}", other),
        }
    }

    #[test]
    fn test_cap_below_amount_is_applied() {
        let (amount, capped) = apply_unit_cap(dec("500"), Some(dec("2")), dec("100"));
        assert_eq!(amount, dec("200"));
        assert!(capped);
    }

    #[test]
    fn test_cap_above_amount_is_not_applied() {
        let (amount, capped) = apply_unit_cap(dec("100"), Some(dec("2")), dec("100"));
        assert_eq!(amount, dec("100"));
        assert!(!capped);
    }

    #[test]
    fn test_amount_exactly_at_cap_is_flagged() {
        let (amount, capped) = apply_unit_cap(dec("200"), Some(dec("2")), dec("100"));
        assert_eq!(amount, dec("200"));
        assert!(capped);
    }

    #[test]
    fn test_unrepresentable_cap_never_binds() {
        let (amount, capped) = apply_unit_cap(dec("500"), Some(Decimal::MAX), dec("100"));
        assert_eq!(amount, dec("500"));
        assert!(!capped);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(dec("5000"), dec("2")).unwrap(), dec("100"));
        assert_eq!(
            percentage_of(dec("1234.50"), dec("0.15")).unwrap(),
            dec("1.85175")
        );
    }

    #[test]
    fn test_percentage_of_overflow_is_calculation_error() {
        let result = percentage_of(Decimal::MAX, dec("150"));
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_accumulate_overflow_is_calculation_error() {
        let mut total = Decimal::MAX;
        let result = accumulate(&mut total, Decimal::ONE, "total");

        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
        assert_eq!(total, Decimal::MAX);
    }
}
