//! Claim processing.
//!
//! [`ClaimProcessor`] runs a submitted claim through validation, the
//! compliance rules and the calculator, records the verdict, and issues the
//! e-scrip for approved RoDTEP claims. Claims that fail a business check
//! come back as `rejected` outcomes; operational failures come back as
//! errors.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::calculation::{
    RuleSet, calculate_drawback, calculate_rodtep_benefits, check_rodtep_eligibility,
    default_drawback_rules, issue_escrip, validate_drawback_claim, validate_rodtep_claim,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationStatus, DrawbackClaim, DrawbackOutcome, DrawbackRecord, DrawbackStatus, EScrip,
    RejectionReason, RodtepClaim, RodtepOutcome, RodtepRecord, RodtepStatus,
};
use crate::store::{ClaimStore, InMemoryClaimStore, InMemoryScripStore, ScripStore};

/// Processes drawback and RoDTEP claims against a loaded configuration.
pub struct ClaimProcessor {
    config: Arc<ConfigLoader>,
    claims: Arc<dyn ClaimStore>,
    scrips: Arc<dyn ScripStore>,
    drawback_rules: RuleSet<DrawbackClaim>,
    rodtep_rules: RuleSet<RodtepClaim>,
}

impl ClaimProcessor {
    /// Creates a processor with the default drawback rules and no extra
    /// RoDTEP rules.
    pub fn new(
        config: Arc<ConfigLoader>,
        claims: Arc<dyn ClaimStore>,
        scrips: Arc<dyn ScripStore>,
    ) -> Self {
        Self {
            config,
            claims,
            scrips,
            drawback_rules: default_drawback_rules(),
            rodtep_rules: RuleSet::new(),
        }
    }

    /// Creates a processor backed by fresh in-memory stores.
    pub fn in_memory(config: ConfigLoader) -> Self {
        Self::new(
            Arc::new(config),
            Arc::new(InMemoryClaimStore::new()),
            Arc::new(InMemoryScripStore::new()),
        )
    }

    /// Replaces the business rules applied to drawback claims.
    pub fn with_drawback_rules(mut self, rules: RuleSet<DrawbackClaim>) -> Self {
        self.drawback_rules = rules;
        self
    }

    /// Replaces the extra eligibility rules applied to RoDTEP claims.
    pub fn with_rodtep_rules(mut self, rules: RuleSet<RodtepClaim>) -> Self {
        self.rodtep_rules = rules;
        self
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Processes a drawback claim and stores the verdict.
    ///
    /// # Errors
    ///
    /// - `DuplicateClaim` if the claim id was already approved
    /// - rate source and store failures
    pub fn process_drawback_claim(&self, mut claim: DrawbackClaim) -> EngineResult<DrawbackOutcome> {
        if let Some(existing) = self.claims.get_drawback(&claim.claim_id)? {
            if existing.claim.status == DrawbackStatus::Approved {
                warn!(claim_id = %claim.claim_id, "Drawback claim already approved");
                return Err(EngineError::DuplicateClaim {
                    claim_id: claim.claim_id,
                });
            }
        }

        claim.status = DrawbackStatus::Pending;
        claim.processing_history.clear();
        debug!(claim_id = %claim.claim_id, items = claim.items.len(), "Validating drawback claim");

        let rates = self.config.drawback_rates();

        if let Err(error) = validate_drawback_claim(&claim, rates) {
            return self.reject_drawback(claim, vec![business_reason(error)?]);
        }

        let violations = self.drawback_rules.evaluate(&claim);
        if !violations.is_empty() {
            let reasons = violations.into_iter().map(RejectionReason::from).collect();
            return self.reject_drawback(claim, reasons);
        }

        claim.transition(DrawbackStatus::Processing, "Validated", Utc::now())?;

        let calculation = match calculate_drawback(&claim, rates) {
            Ok(calculation) => calculation,
            Err(error) => return self.reject_drawback(claim, vec![business_reason(error)?]),
        };

        claim.transition(DrawbackStatus::Approved, "Drawback calculated", Utc::now())?;

        info!(
            claim_id = %claim.claim_id,
            total_fob = %calculation.total_fob,
            total_drawback = %calculation.total_drawback,
            capped_by_fob = calculation.capped_by_fob,
            "Drawback claim approved"
        );

        let outcome = DrawbackOutcome::Approved {
            claim_id: claim.claim_id.clone(),
            calculation,
        };
        self.claims.save_drawback(DrawbackRecord {
            claim,
            outcome: outcome.clone(),
        })?;

        Ok(outcome)
    }

    fn reject_drawback(
        &self,
        mut claim: DrawbackClaim,
        reasons: Vec<RejectionReason>,
    ) -> EngineResult<DrawbackOutcome> {
        let note = reasons
            .iter()
            .map(|r| r.code.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        claim.transition(DrawbackStatus::Rejected, note, Utc::now())?;

        warn!(
            claim_id = %claim.claim_id,
            reasons = reasons.len(),
            first_reason = %reasons.first().map(|r| r.message.as_str()).unwrap_or_default(),
            "Drawback claim rejected"
        );

        let outcome = DrawbackOutcome::Rejected {
            claim_id: claim.claim_id.clone(),
            reasons,
        };
        self.claims.save_drawback(DrawbackRecord {
            claim,
            outcome: outcome.clone(),
        })?;

        Ok(outcome)
    }

    /// Processes a RoDTEP claim filed on `as_of` and stores the verdict.
    ///
    /// Approved claims get their e-scrip issued as part of processing.
    ///
    /// # Errors
    ///
    /// - `DuplicateClaim` if the claim id was already approved
    /// - rate source and store failures
    pub fn process_rodtep_claim(
        &self,
        mut claim: RodtepClaim,
        as_of: NaiveDate,
    ) -> EngineResult<RodtepOutcome> {
        if let Some(existing) = self.claims.get_rodtep(&claim.claim_id)? {
            if existing.claim.status == RodtepStatus::Approved {
                warn!(claim_id = %claim.claim_id, "RoDTEP claim already approved");
                return Err(EngineError::DuplicateClaim {
                    claim_id: claim.claim_id,
                });
            }
        }

        claim.status = RodtepStatus::Pending;
        debug!(
            claim_id = %claim.claim_id,
            products = claim.product_details.len(),
            export_date = %claim.export_details.export_date,
            "Validating RoDTEP claim"
        );

        let rule_set = match self.config.rule_set_for(claim.export_details.export_date) {
            Ok(rule_set) => rule_set,
            Err(error) => return self.reject_rodtep(claim, vec![business_reason(error)?]),
        };

        if let Err(error) = validate_rodtep_claim(&claim, rule_set) {
            return self.reject_rodtep(claim, vec![business_reason(error)?]);
        }

        let rates = self.config.rodtep_rates();
        let settings = self.config.rodtep_settings();

        let eligibility = check_rodtep_eligibility(
            &claim,
            rates,
            settings.filing_window_days,
            as_of,
            &self.rodtep_rules,
        )?;
        if !eligibility.eligible {
            return self.reject_rodtep(claim, eligibility.reasons);
        }

        let calculation =
            match calculate_rodtep_benefits(&claim, rates, settings.auto_approval_threshold) {
                Ok(calculation) => calculation,
                Err(error) => return self.reject_rodtep(claim, vec![business_reason(error)?]),
            };

        let outcome = match calculation.status {
            CalculationStatus::Approved => {
                let e_scrip = issue_escrip(self.scrips.as_ref(), &claim, &calculation, Utc::now())?;
                claim.transition(RodtepStatus::Approved)?;
                info!(
                    claim_id = %claim.claim_id,
                    total_benefit = %calculation.total_benefit,
                    scrip_id = %e_scrip.scrip_id,
                    "RoDTEP claim approved"
                );
                RodtepOutcome::Approved {
                    claim_id: claim.claim_id.clone(),
                    calculation,
                    e_scrip,
                }
            }
            CalculationStatus::PendingReview => {
                claim.transition(RodtepStatus::PendingReview)?;
                info!(
                    claim_id = %claim.claim_id,
                    total_benefit = %calculation.total_benefit,
                    threshold = %settings.auto_approval_threshold,
                    "RoDTEP claim sent for review"
                );
                RodtepOutcome::PendingReview {
                    claim_id: claim.claim_id.clone(),
                    calculation,
                }
            }
        };

        self.claims.save_rodtep(RodtepRecord {
            claim,
            outcome: outcome.clone(),
        })?;

        Ok(outcome)
    }

    fn reject_rodtep(
        &self,
        mut claim: RodtepClaim,
        reasons: Vec<RejectionReason>,
    ) -> EngineResult<RodtepOutcome> {
        claim.transition(RodtepStatus::Rejected)?;

        warn!(
            claim_id = %claim.claim_id,
            reasons = reasons.len(),
            first_reason = %reasons.first().map(|r| r.message.as_str()).unwrap_or_default(),
            "RoDTEP claim rejected"
        );

        let outcome = RodtepOutcome::Rejected {
            claim_id: claim.claim_id.clone(),
            reasons,
        };
        self.claims.save_rodtep(RodtepRecord {
            claim,
            outcome: outcome.clone(),
        })?;

        Ok(outcome)
    }

    /// Returns the e-scrip for an approved RoDTEP claim.
    ///
    /// Repeated calls return the scrip issued when the claim was approved.
    ///
    /// # Errors
    ///
    /// - `ClaimNotFound` if no RoDTEP claim has this id
    /// - `ScripNotAllowed` if the claim is not approved
    pub fn generate_rodtep_scrip(&self, claim_id: &str) -> EngineResult<EScrip> {
        let record = self
            .claims
            .get_rodtep(claim_id)?
            .ok_or_else(|| EngineError::ClaimNotFound {
                claim_id: claim_id.to_string(),
            })?;

        match &record.outcome {
            RodtepOutcome::Approved { calculation, .. } => {
                issue_escrip(self.scrips.as_ref(), &record.claim, calculation, Utc::now())
            }
            _ => Err(EngineError::ScripNotAllowed {
                claim_id: claim_id.to_string(),
                status: record.claim.status.to_string(),
            }),
        }
    }

    /// Returns the stored drawback record for `claim_id`.
    pub fn get_drawback_claim(&self, claim_id: &str) -> EngineResult<DrawbackRecord> {
        self.claims
            .get_drawback(claim_id)?
            .ok_or_else(|| EngineError::ClaimNotFound {
                claim_id: claim_id.to_string(),
            })
    }

    /// Lists stored drawback records, optionally filtered by status.
    pub fn list_drawback_claims(
        &self,
        status: Option<DrawbackStatus>,
    ) -> EngineResult<Vec<DrawbackRecord>> {
        self.claims.list_drawback(status)
    }

    /// Returns the stored RoDTEP record for `claim_id`.
    pub fn get_rodtep_claim(&self, claim_id: &str) -> EngineResult<RodtepRecord> {
        self.claims
            .get_rodtep(claim_id)?
            .ok_or_else(|| EngineError::ClaimNotFound {
                claim_id: claim_id.to_string(),
            })
    }

    /// Lists stored RoDTEP records, optionally filtered by status.
    pub fn list_rodtep_claims(
        &self,
        status: Option<RodtepStatus>,
    ) -> EngineResult<Vec<RodtepRecord>> {
        self.claims.list_rodtep(status)
    }
}

/// Turns a business error into a rejection reason and passes anything else
/// through as an error.
fn business_reason(error: EngineError) -> EngineResult<RejectionReason> {
    if error.is_business_rejection() {
        Ok(RejectionReason::from(&error))
    } else {
        Err(error)
    }
}
