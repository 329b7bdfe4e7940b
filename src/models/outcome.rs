//! Claim verdicts and the records persisted for each claim.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::{DrawbackCalculation, DrawbackClaim, EScrip, RodtepCalculation, RodtepClaim};

/// Why a claim was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    /// Machine-readable reason code (e.g. `EXCLUDED_CATEGORY`).
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}

impl RejectionReason {
    /// Creates a rejection reason.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&EngineError> for RejectionReason {
    fn from(error: &EngineError) -> Self {
        let message = match error {
            EngineError::Validation { message, .. } => message.clone(),
            EngineError::CalculationError { message } => message.clone(),
            other => other.to_string(),
        };
        RejectionReason::new(error.code(), message)
    }
}

/// The verdict on a drawback claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DrawbackOutcome {
    /// The claim is compliant and the drawback is payable.
    Approved {
        /// The claim identifier.
        claim_id: String,
        /// The calculation behind the verdict.
        calculation: DrawbackCalculation,
    },
    /// The claim failed validation or a compliance rule.
    Rejected {
        /// The claim identifier.
        claim_id: String,
        /// Every reason the claim was rejected.
        reasons: Vec<RejectionReason>,
    },
}

impl DrawbackOutcome {
    /// Returns the calculation if the claim was approved.
    pub fn calculation(&self) -> Option<&DrawbackCalculation> {
        match self {
            DrawbackOutcome::Approved { calculation, .. } => Some(calculation),
            DrawbackOutcome::Rejected { .. } => None,
        }
    }

    /// Returns true if the claim was rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, DrawbackOutcome::Rejected { .. })
    }
}

/// The verdict on a RoDTEP claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RodtepOutcome {
    /// Approved automatically; the e-scrip has been issued.
    Approved {
        /// The claim identifier.
        claim_id: String,
        /// The calculation behind the verdict.
        calculation: RodtepCalculation,
        /// The e-scrip issued for the claim.
        e_scrip: EScrip,
    },
    /// Calculated, but the benefit needs human sign-off.
    PendingReview {
        /// The claim identifier.
        claim_id: String,
        /// The calculation awaiting review.
        calculation: RodtepCalculation,
    },
    /// The claim failed validation or eligibility.
    Rejected {
        /// The claim identifier.
        claim_id: String,
        /// Every reason the claim was rejected.
        reasons: Vec<RejectionReason>,
    },
}

impl RodtepOutcome {
    /// Returns the calculation unless the claim was rejected.
    pub fn calculation(&self) -> Option<&RodtepCalculation> {
        match self {
            RodtepOutcome::Approved { calculation, .. }
            | RodtepOutcome::PendingReview { calculation, .. } => Some(calculation),
            RodtepOutcome::Rejected { .. } => None,
        }
    }

    /// Returns the e-scrip if one was issued.
    pub fn e_scrip(&self) -> Option<&EScrip> {
        match self {
            RodtepOutcome::Approved { e_scrip, .. } => Some(e_scrip),
            _ => None,
        }
    }
}

/// A drawback claim together with its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawbackRecord {
    /// The claim, with its final status and history.
    pub claim: DrawbackClaim,
    /// The verdict reached for the claim.
    pub outcome: DrawbackOutcome,
}

/// A RoDTEP claim together with its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodtepRecord {
    /// The claim, with its final status.
    pub claim: RodtepClaim,
    /// The verdict reached for the claim.
    pub outcome: RodtepOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationKind;

    #[test]
    fn test_rejection_reason_from_validation_error() {
        let error = EngineError::validation(
            ValidationKind::MissingDocument,
            "Missing required document: BRC",
        );
        let reason = RejectionReason::from(&error);
        assert_eq!(reason.code, "MISSING_DOCUMENT");
        assert_eq!(reason.message, "Missing required document: BRC");
    }

    #[test]
    fn test_rejected_outcome_is_tagged_by_status() {
        let outcome = DrawbackOutcome::Rejected {
            claim_id: "DBK-001".to_string(),
            reasons: vec![RejectionReason::new("INVALID_RATE", "no rate")],
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["claim_id"], "DBK-001");
        assert_eq!(json["reasons"][0]["code"], "INVALID_RATE");
        assert!(outcome.is_rejected());
        assert!(outcome.calculation().is_none());
    }

    #[test]
    fn test_rodtep_rejected_outcome_round_trips() {
        let json = r#"{
            "status": "rejected",
            "claim_id": "RC-001",
            "reasons": [{"code": "EXCLUDED_CATEGORY", "message": "excluded"}]
        }"#;

        let outcome: RodtepOutcome = serde_json::from_str(json).unwrap();
        assert!(outcome.calculation().is_none());
        assert!(outcome.e_scrip().is_none());
    }
}
