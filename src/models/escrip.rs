//! e-Scrip model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status of an issued e-scrip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScripStatus {
    /// Issued and usable against duty payments.
    Active,
}

/// The shipment an e-scrip was issued against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReference {
    /// The shipping bill number.
    pub shipping_bill_no: String,
    /// The date of export.
    pub export_date: NaiveDate,
}

/// A transferable electronic duty credit issued for an approved RoDTEP claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EScrip {
    /// Unique identifier of the scrip.
    pub scrip_id: String,
    /// When the scrip was issued.
    pub issue_date: DateTime<Utc>,
    /// When the scrip stops being usable.
    pub expiry_date: DateTime<Utc>,
    /// Credit amount.
    pub amount: Decimal,
    /// The claim the scrip was issued for.
    pub claim_ref: String,
    /// The shipment behind the claim.
    pub export_reference: ExportReference,
    /// Scrip status.
    pub status: ScripStatus,
    /// Whether the scrip may be transferred to another IEC holder.
    pub transferable: bool,
}
