//! Configuration types for benefit calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Metadata about the scheme configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeMetadata {
    /// The human-readable name of the configuration.
    pub name: String,
    /// The version or effective date of the configuration.
    pub version: String,
    /// URL to the official scheme documentation.
    pub source_url: String,
}

/// RoDTEP processing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RodtepSettings {
    /// Total benefit above which a claim needs manual review.
    pub auto_approval_threshold: Decimal,
    /// Days after the export date within which a claim may be filed.
    pub filing_window_days: u32,
}

/// Scheme configuration file structure (`scheme.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeConfig {
    /// Scheme metadata.
    pub scheme: SchemeMetadata,
    /// RoDTEP settings.
    pub rodtep: RodtepSettings,
}

/// A single entry in a rate schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntry {
    /// Description of the goods covered by the entry.
    #[serde(default)]
    pub description: Option<String>,
    /// The rate as a percentage of FOB value.
    pub rate: Decimal,
    /// Optional maximum benefit per unit.
    #[serde(default)]
    pub cap_per_unit: Option<Decimal>,
}

/// A rate schedule loaded from `rates/<scheme>.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSchedule {
    /// Which scheme the schedule belongs to (e.g. "drawback").
    pub scheme: String,
    /// The notification the rates were published under.
    pub notification: String,
    /// The date from which the rates apply.
    pub effective_date: NaiveDate,
    /// Map of tariff heading or HS code to rate.
    pub rates: HashMap<String, ScheduleEntry>,
}

/// A document every RoDTEP claim must carry.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredDocument {
    /// The exact document name claims must list.
    pub name: String,
    /// What the document is.
    #[serde(default)]
    pub description: Option<String>,
}

/// A dated RoDTEP rule set loaded from `rules/<date>.yaml`.
///
/// Regulatory changes are made by adding a new file with a later
/// effective date rather than by editing code.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSetConfig {
    /// The provision the rules come from.
    pub reference: String,
    /// The date from which the rule set applies.
    pub effective_date: NaiveDate,
    /// Product categories that cannot claim RoDTEP.
    pub excluded_categories: Vec<String>,
    /// Documents a claim must include, checked in order.
    pub required_documents: Vec<RequiredDocument>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scheme metadata and settings.
    scheme: SchemeConfig,
    /// The drawback rate schedule.
    drawback_rates: RateSchedule,
    /// The RoDTEP rate schedule.
    rodtep_rates: RateSchedule,
    /// RoDTEP rule sets by effective date (sorted oldest first).
    rule_sets: Vec<RuleSetConfig>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        scheme: SchemeConfig,
        drawback_rates: RateSchedule,
        rodtep_rates: RateSchedule,
        rule_sets: Vec<RuleSetConfig>,
    ) -> Self {
        let mut sorted_rule_sets = rule_sets;
        sorted_rule_sets.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            scheme,
            drawback_rates,
            rodtep_rates,
            rule_sets: sorted_rule_sets,
        }
    }

    /// Returns the scheme configuration.
    pub fn scheme(&self) -> &SchemeConfig {
        &self.scheme
    }

    /// Returns the drawback rate schedule.
    pub fn drawback_rates(&self) -> &RateSchedule {
        &self.drawback_rates
    }

    /// Returns the RoDTEP rate schedule.
    pub fn rodtep_rates(&self) -> &RateSchedule {
        &self.rodtep_rates
    }

    /// Returns all rule sets, oldest first.
    pub fn rule_sets(&self) -> &[RuleSetConfig] {
        &self.rule_sets
    }
}
