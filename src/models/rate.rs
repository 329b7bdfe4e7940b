//! Rate record model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A benefit rate for a tariff heading or HS code.
///
/// Rates are looked up by the calculators and never owned by a claim.
///
/// # Example
///
/// ```
/// use benefit_engine::models::RateRecord;
/// use rust_decimal::Decimal;
///
/// let rate = RateRecord::new("610910", Decimal::new(2, 0));
/// assert!(rate.cap_per_unit.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    /// The tariff heading or HS code this rate applies to.
    pub code: String,
    /// The rate as a percentage of FOB value (e.g. `2` for 2%).
    pub rate: Decimal,
    /// Optional maximum benefit per unit of quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_per_unit: Option<Decimal>,
}

impl RateRecord {
    /// Creates a rate without a per-unit cap.
    pub fn new(code: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code: code.into(),
            rate,
            cap_per_unit: None,
        }
    }

    /// Returns this rate with a per-unit cap.
    pub fn with_cap(mut self, cap_per_unit: Decimal) -> Self {
        self.cap_per_unit = Some(cap_per_unit);
        self
    }
}
