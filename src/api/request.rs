//! Request types for the Export Benefit Engine API.
//!
//! Request bodies carry only what an exporter submits; status and history
//! are always assigned by the engine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    DrawbackClaim, DrawbackItem, DrawbackStatus, ExportDetails, ExporterDetails, RodtepClaim,
    RodtepProduct, RodtepStatus,
};

/// Request body for `POST /drawback/claims`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawbackClaimRequest {
    /// Unique identifier for the claim.
    pub claim_id: String,
    /// The shipping bill number.
    pub shipping_bill_no: String,
    /// The shipping bill date.
    pub shipping_bill_date: NaiveDate,
    /// The exporter filing the claim.
    pub exporter: ExporterDetails,
    /// Line items, in shipping bill order.
    pub items: Vec<DrawbackItem>,
}

impl From<DrawbackClaimRequest> for DrawbackClaim {
    fn from(req: DrawbackClaimRequest) -> Self {
        DrawbackClaim {
            claim_id: req.claim_id,
            shipping_bill_no: req.shipping_bill_no,
            shipping_bill_date: req.shipping_bill_date,
            exporter: req.exporter,
            items: req.items,
            status: DrawbackStatus::Pending,
            processing_history: Vec::new(),
        }
    }
}

/// Request body for `POST /rodtep/claims`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RodtepClaimRequest {
    /// Unique identifier for the claim.
    pub claim_id: String,
    /// The shipment the claim is filed against.
    pub export_details: ExportDetails,
    /// Product lines.
    pub product_details: Vec<RodtepProduct>,
    /// Names of the submitted supporting documents.
    #[serde(default)]
    pub documents: BTreeSet<String>,
    /// Filing date for the filing window check; today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<NaiveDate>,
}

impl From<RodtepClaimRequest> for RodtepClaim {
    fn from(req: RodtepClaimRequest) -> Self {
        RodtepClaim {
            claim_id: req.claim_id,
            export_details: req.export_details,
            product_details: req.product_details,
            documents: req.documents,
            status: RodtepStatus::Pending,
        }
    }
}

/// Query string for the drawback list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrawbackListQuery {
    /// Only return claims in this status.
    pub status: Option<DrawbackStatus>,
}

/// Query string for the RoDTEP list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RodtepListQuery {
    /// Only return claims in this status.
    pub status: Option<RodtepStatus>,
}
