//! Duty drawback claim model and its status state machine.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a drawback claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawbackStatus {
    /// Submitted, not yet validated.
    Pending,
    /// Validated and being calculated.
    Processing,
    /// Calculated and compliant.
    Approved,
    /// Failed validation or a compliance rule.
    Rejected,
}

impl DrawbackStatus {
    /// Returns the snake_case name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawbackStatus::Pending => "pending",
            DrawbackStatus::Processing => "processing",
            DrawbackStatus::Approved => "approved",
            DrawbackStatus::Rejected => "rejected",
        }
    }

    /// Returns true if the state machine allows moving to `next`.
    ///
    /// ```text
    /// pending -> processing -> approved
    ///    |           |
    ///    +-----------+-------> rejected
    /// ```
    pub fn can_transition_to(&self, next: DrawbackStatus) -> bool {
        matches!(
            (self, next),
            (DrawbackStatus::Pending, DrawbackStatus::Processing)
                | (DrawbackStatus::Pending, DrawbackStatus::Rejected)
                | (DrawbackStatus::Processing, DrawbackStatus::Approved)
                | (DrawbackStatus::Processing, DrawbackStatus::Rejected)
        )
    }
}

impl fmt::Display for DrawbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line item on a shipping bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawbackItem {
    /// Identifier of the item within the claim.
    pub id: String,
    /// Quantity exported, in the unit of the tariff heading.
    pub quantity: Decimal,
    /// FOB price per unit.
    pub unit_price: Decimal,
    /// The drawback schedule tariff heading.
    pub tariff_heading: String,
}

impl DrawbackItem {
    /// Returns the FOB value of the item (quantity × unit price).
    ///
    /// Fails with `CalculationError` when the product is not representable.
    pub fn fob_value(&self) -> EngineResult<Decimal> {
        self.quantity
            .checked_mul(self.unit_price)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("FOB value of item '{}' overflows", self.id),
            })
    }
}

/// The exporter filing the claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterDetails {
    /// Registered name of the exporter.
    pub name: String,
    /// Importer-Exporter Code.
    pub iec_number: String,
}

/// An entry in a drawback claim's processing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEvent {
    /// When the status was entered.
    pub timestamp: DateTime<Utc>,
    /// The status entered.
    pub status: DrawbackStatus,
    /// Why the status changed.
    pub note: String,
}

/// A duty drawback claim against a shipping bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawbackClaim {
    /// Unique identifier for the claim.
    pub claim_id: String,
    /// The shipping bill number the claim is filed against.
    pub shipping_bill_no: String,
    /// The shipping bill date.
    pub shipping_bill_date: NaiveDate,
    /// The exporter filing the claim.
    pub exporter: ExporterDetails,
    /// Line items, in shipping bill order.
    pub items: Vec<DrawbackItem>,
    /// Current lifecycle status.
    pub status: DrawbackStatus,
    /// Every status the claim has passed through.
    #[serde(default)]
    pub processing_history: Vec<ProcessingEvent>,
}

impl DrawbackClaim {
    /// Moves the claim to `next`, recording the change in its history.
    ///
    /// Returns `InvalidTransition` if the state machine does not allow it.
    pub fn transition(
        &mut self,
        next: DrawbackStatus,
        note: impl Into<String>,
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                claim_id: self.claim_id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.status = next;
        self.processing_history.push(ProcessingEvent {
            timestamp: at,
            status: next,
            note: note.into(),
        });
        Ok(())
    }
}
