//! Error types for the Export Benefit Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while validating and calculating
//! export benefit claims.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of a validation failure.
///
/// The serialized form is the stable code reported in rejection reasons
/// and API error bodies (e.g. `EXCLUDED_CATEGORY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationKind {
    /// A required field was empty or absent.
    MissingField,
    /// A tariff or HS code has no matching rate record.
    InvalidRate,
    /// A product falls under a category excluded from the scheme.
    ExcludedCategory,
    /// A required supporting document was not submitted.
    MissingDocument,
}

impl ValidationKind {
    /// Returns the stable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationKind::MissingField => "MISSING_FIELD",
            ValidationKind::InvalidRate => "INVALID_RATE",
            ValidationKind::ExcludedCategory => "EXCLUDED_CATEGORY",
            ValidationKind::MissingDocument => "MISSING_DOCUMENT",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The main error type for the Export Benefit Engine.
///
/// Validation and calculation errors describe a claim that cannot be paid
/// and are turned into rejection outcomes by the claim processor. The
/// remaining variants are operational failures the caller should surface
/// as errors (see [`EngineError::is_business_rejection`]).
///
/// # Example
///
/// ```
/// use benefit_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/scheme.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/scheme.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The claim is malformed or breaks a fixed scheme rule.
    #[error("Validation failed [{kind}]: {message}")]
    Validation {
        /// The kind of validation failure.
        kind: ValidationKind,
        /// A description of what failed.
        message: String,
    },

    /// An arithmetic precondition was violated (e.g. a negative quantity).
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The rate source could not answer a lookup.
    #[error("Rate lookup failed for '{code}': {message}")]
    RateSourceUnavailable {
        /// The tariff or HS code being looked up.
        code: String,
        /// A description of the failure.
        message: String,
    },

    /// No RoDTEP rule set is effective on the given date.
    #[error("No RoDTEP rule set effective on {date}")]
    RuleSetNotFound {
        /// The date a rule set was requested for.
        date: NaiveDate,
    },

    /// No claim exists with the given identifier.
    #[error("Claim not found: {claim_id}")]
    ClaimNotFound {
        /// The claim identifier.
        claim_id: String,
    },

    /// The claim has already been approved and cannot be submitted again.
    #[error("Claim '{claim_id}' has already been approved")]
    DuplicateClaim {
        /// The claim identifier.
        claim_id: String,
    },

    /// A status change outside the claim state machine was attempted.
    #[error("Invalid status transition for claim '{claim_id}': {from} -> {to}")]
    InvalidTransition {
        /// The claim identifier.
        claim_id: String,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// An e-scrip was requested for a claim that is not approved.
    #[error("Cannot issue e-scrip for claim '{claim_id}' with status {status}")]
    ScripNotAllowed {
        /// The claim identifier.
        claim_id: String,
        /// The claim's current status.
        status: String,
    },

    /// The persistence layer failed.
    #[error("Store error: {message}")]
    Store {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a validation error.
    pub fn validation(kind: ValidationKind, message: impl Into<String>) -> Self {
        EngineError::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if the error means the claim itself is invalid.
    ///
    /// These errors are reported to the exporter as a rejected claim rather
    /// than as a failure of the service. An export made before any rule set
    /// took effect cannot qualify, so a missing rule set counts here too.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::Validation { .. }
                | EngineError::CalculationError { .. }
                | EngineError::RuleSetNotFound { .. }
        )
    }

    /// Returns true if retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::RateSourceUnavailable { .. } | EngineError::Store { .. }
        )
    }

    /// Returns the stable code used in rejection reasons and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::Validation { kind, .. } => kind.code(),
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
            EngineError::RateSourceUnavailable { .. } => "RATE_SOURCE_UNAVAILABLE",
            EngineError::RuleSetNotFound { .. } => "RULE_SET_NOT_FOUND",
            EngineError::ClaimNotFound { .. } => "CLAIM_NOT_FOUND",
            EngineError::DuplicateClaim { .. } => "DUPLICATE_CLAIM",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::ScripNotAllowed { .. } => "SCRIP_NOT_ALLOWED",
            EngineError::Store { .. } => "STORE_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/scheme.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/scheme.yaml"
        );
    }

    #[test]
    fn test_validation_error_displays_kind_and_message() {
        let error = EngineError::validation(
            ValidationKind::MissingDocument,
            "Missing required document: BRC",
        );
        assert_eq!(
            error.to_string(),
            "Validation failed [MISSING_DOCUMENT]: Missing required document: BRC"
        );
    }

    #[test]
    fn test_rule_set_not_found_displays_date() {
        let error = EngineError::RuleSetNotFound {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(error.to_string(), "No RoDTEP rule set effective on 2020-01-01");
    }

    #[test]
    fn test_validation_kind_serializes_as_code() {
        let json = serde_json::to_string(&ValidationKind::ExcludedCategory).unwrap();
        assert_eq!(json, "\"EXCLUDED_CATEGORY\"");

        let kind: ValidationKind = serde_json::from_str("\"INVALID_RATE\"").unwrap();
        assert_eq!(kind, ValidationKind::InvalidRate);
    }

    #[test]
    fn test_business_rejection_is_distinct_from_retryable() {
        let rejected = EngineError::validation(ValidationKind::ExcludedCategory, "excluded");
        assert!(rejected.is_business_rejection());
        assert!(!rejected.is_retryable());

        let calc = EngineError::CalculationError {
            message: "negative quantity".to_string(),
        };
        assert!(calc.is_business_rejection());

        let before_scheme = EngineError::RuleSetNotFound {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert!(before_scheme.is_business_rejection());

        let outage = EngineError::RateSourceUnavailable {
            code: "610910".to_string(),
            message: "timeout".to_string(),
        };
        assert!(!outage.is_business_rejection());
        assert!(outage.is_retryable());
    }

    #[test]
    fn test_error_codes() {
        let error = EngineError::validation(ValidationKind::InvalidRate, "no rate");
        assert_eq!(error.code(), "INVALID_RATE");

        let error = EngineError::ScripNotAllowed {
            claim_id: "RC-1".to_string(),
            status: "pending_review".to_string(),
        };
        assert_eq!(error.code(), "SCRIP_NOT_ALLOWED");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_claim_not_found() -> EngineResult<()> {
            Err(EngineError::ClaimNotFound {
                claim_id: "DBK-404".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_claim_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
