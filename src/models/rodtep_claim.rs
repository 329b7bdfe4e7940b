//! RoDTEP claim model.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a RoDTEP claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RodtepStatus {
    /// Submitted, not yet validated.
    Pending,
    /// Calculated, awaiting manual sign-off.
    PendingReview,
    /// Calculated and automatically approved.
    Approved,
    /// Failed validation or eligibility.
    Rejected,
}

impl RodtepStatus {
    /// Returns the snake_case name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RodtepStatus::Pending => "pending",
            RodtepStatus::PendingReview => "pending_review",
            RodtepStatus::Approved => "approved",
            RodtepStatus::Rejected => "rejected",
        }
    }

    /// Returns true if the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: RodtepStatus) -> bool {
        matches!(
            (self, next),
            (RodtepStatus::Pending, RodtepStatus::Rejected)
                | (RodtepStatus::Pending, RodtepStatus::Approved)
                | (RodtepStatus::Pending, RodtepStatus::PendingReview)
        )
    }
}

impl fmt::Display for RodtepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipment details the claim is filed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDetails {
    /// The shipping bill number.
    pub shipping_bill_no: String,
    /// The date of export (let export order date).
    pub export_date: NaiveDate,
    /// The customs port code, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_code: Option<String>,
}

/// A product line on a RoDTEP claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodtepProduct {
    /// The HS code of the product.
    pub hs_code: String,
    /// The export category of the product (checked against exclusions).
    pub category: String,
    /// Quantity exported.
    pub quantity: Decimal,
    /// FOB value of the line.
    pub value: Decimal,
}

/// A RoDTEP benefit claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodtepClaim {
    /// Unique identifier for the claim.
    pub claim_id: String,
    /// The shipment the claim is filed against.
    pub export_details: ExportDetails,
    /// Product lines, in shipping bill order.
    pub product_details: Vec<RodtepProduct>,
    /// Names of the supporting documents submitted with the claim.
    #[serde(default)]
    pub documents: BTreeSet<String>,
    /// Current lifecycle status.
    pub status: RodtepStatus,
}

impl RodtepClaim {
    /// Returns true if a document with exactly this name was submitted.
    pub fn has_document(&self, name: &str) -> bool {
        self.documents.contains(name)
    }

    /// Moves the claim to `next`.
    pub fn transition(&mut self, next: RodtepStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                claim_id: self.claim_id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}
