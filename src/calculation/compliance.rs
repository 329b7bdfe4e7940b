//! Injectable business rules.
//!
//! Fixed scheme checks (exclusions, documents, rates) live in the
//! validators. A [`RuleSet`] holds the additional checks a deployment wants
//! to run on top of them; every violation it reports rejects the claim.

use std::collections::HashSet;
use std::fmt;

use crate::models::{DrawbackClaim, RejectionReason};

/// Rejection code reported for business rule violations.
pub const BUSINESS_RULE_CODE: &str = "BUSINESS_RULE";

/// A single violation reported by a [`BusinessRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// The identifier of the rule that fired.
    pub rule_id: String,
    /// What the rule found.
    pub message: String,
}

impl From<RuleViolation> for RejectionReason {
    fn from(violation: RuleViolation) -> Self {
        RejectionReason::new(
            BUSINESS_RULE_CODE,
            format!("[{}] {}", violation.rule_id, violation.message),
        )
    }
}

/// A check run against a claim of type `T`.
pub trait BusinessRule<T>: Send + Sync {
    /// Stable identifier of the rule (e.g. `DBK-DUP-ITEM`).
    fn id(&self) -> &'static str;

    /// Returns every violation found; empty when the claim passes.
    fn check(&self, claim: &T) -> Vec<RuleViolation>;
}

/// An ordered collection of business rules.
pub struct RuleSet<T> {
    rules: Vec<Box<dyn BusinessRule<T>>>,
}

impl<T> RuleSet<T> {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule, returning the extended set.
    pub fn with_rule(mut self, rule: impl BusinessRule<T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Runs every rule in insertion order and collects the violations.
    pub fn evaluate(&self, claim: &T) -> Vec<RuleViolation> {
        self.rules.iter().flat_map(|rule| rule.check(claim)).collect()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RuleSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.rules.iter().map(|rule| rule.id()).collect();
        f.debug_struct("RuleSet").field("rules", &ids).finish()
    }
}

/// Flags drawback claims that list the same item id more than once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateItemRule;

impl BusinessRule<DrawbackClaim> for DuplicateItemRule {
    fn id(&self) -> &'static str {
        "DBK-DUP-ITEM"
    }

    fn check(&self, claim: &DrawbackClaim) -> Vec<RuleViolation> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut violations = Vec::new();

        for item in &claim.items {
            if !seen.insert(item.id.as_str()) && reported.insert(item.id.as_str()) {
                violations.push(RuleViolation {
                    rule_id: self.id().to_string(),
                    message: format!("Item id '{}' appears more than once", item.id),
                });
            }
        }

        violations
    }
}

/// The rules applied to drawback claims unless a caller supplies its own.
pub fn default_drawback_rules() -> RuleSet<DrawbackClaim> {
    RuleSet::new().with_rule(DuplicateItemRule)
}
