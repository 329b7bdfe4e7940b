//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the scheme
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};

use super::types::{
    EngineConfig, RateSchedule, RodtepSettings, RuleSetConfig, SchemeConfig, SchemeMetadata,
};

/// Loads and provides access to the scheme configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query rate schedules, rule sets and settings.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/
/// ├── scheme.yaml          # Scheme metadata and RoDTEP settings
/// ├── rates/
/// │   ├── drawback.yaml    # Drawback rates by tariff heading
/// │   └── rodtep.yaml      # RoDTEP rates by HS code
/// └── rules/
///     └── 2021-01-01.yaml  # RoDTEP rule set effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use benefit_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let rules = loader.rule_set_for(date).unwrap();
/// println!("Excluded categories: {}", rules.excluded_categories.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The rules directory holds no rule set
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let scheme = Self::load_yaml::<SchemeConfig>(&path.join("scheme.yaml"))?;

        let rates_dir = path.join("rates");
        let drawback_rates = Self::load_yaml::<RateSchedule>(&rates_dir.join("drawback.yaml"))?;
        let rodtep_rates = Self::load_yaml::<RateSchedule>(&rates_dir.join("rodtep.yaml"))?;

        let rule_sets = Self::load_rule_sets(&path.join("rules"))?;

        Ok(Self::from_config(EngineConfig::new(
            scheme,
            drawback_rates,
            rodtep_rates,
            rule_sets,
        )))
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rule set files from the rules directory.
    fn load_rule_sets(rules_dir: &Path) -> EngineResult<Vec<RuleSetConfig>> {
        let rules_dir_str = rules_dir.display().to_string();

        let entries = fs::read_dir(rules_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rules_dir_str.clone(),
        })?;

        let mut rule_sets = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rules_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rule_sets.push(Self::load_yaml::<RuleSetConfig>(&path)?);
            }
        }

        if rule_sets.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rule set files found)", rules_dir_str),
            });
        }

        Ok(rule_sets)
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the scheme metadata.
    pub fn scheme(&self) -> &SchemeMetadata {
        &self.config.scheme().scheme
    }

    /// Returns the RoDTEP processing settings.
    pub fn rodtep_settings(&self) -> &RodtepSettings {
        &self.config.scheme().rodtep
    }

    /// Returns the drawback rate schedule.
    pub fn drawback_rates(&self) -> &RateSchedule {
        self.config.drawback_rates()
    }

    /// Returns the RoDTEP rate schedule.
    pub fn rodtep_rates(&self) -> &RateSchedule {
        self.config.rodtep_rates()
    }

    /// Gets the RoDTEP rule set in force on a given date.
    ///
    /// The method finds the most recent rule set that is effective
    /// on or before the given date.
    pub fn rule_set_for(&self, date: NaiveDate) -> EngineResult<&RuleSetConfig> {
        self.config
            .rule_sets()
            .iter()
            .rfind(|rs| rs.effective_date <= date)
            .ok_or(EngineError::RuleSetNotFound { date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RequiredDocument, ScheduleEntry};
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rule_set(effective: NaiveDate, excluded: &[&str]) -> RuleSetConfig {
        RuleSetConfig {
            reference: format!("rules {}", effective),
            effective_date: effective,
            excluded_categories: excluded.iter().map(|s| s.to_string()).collect(),
            required_documents: vec![RequiredDocument {
                name: "BRC".to_string(),
                description: None,
            }],
        }
    }

    fn schedule(scheme: &str) -> RateSchedule {
        let mut rates = HashMap::new();
        rates.insert(
            "610901".to_string(),
            ScheduleEntry {
                description: None,
                rate: dec("2.0"),
                cap_per_unit: None,
            },
        );
        RateSchedule {
            scheme: scheme.to_string(),
            notification: "test".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            rates,
        }
    }

    fn scheme_config() -> SchemeConfig {
        SchemeConfig {
            scheme: SchemeMetadata {
                name: "Test".to_string(),
                version: "1".to_string(),
                source_url: "https://example.com".to_string(),
            },
            rodtep: RodtepSettings {
                auto_approval_threshold: dec("1000"),
                filing_window_days: 365,
            },
        }
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.scheme().name, "Duty Drawback and RoDTEP");
        assert_eq!(loader.scheme().version, "2025-04-01");
    }

    #[test]
    fn test_rodtep_settings_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let settings = loader.rodtep_settings();
        assert_eq!(settings.auto_approval_threshold, dec("500000.00"));
        assert_eq!(settings.filing_window_days, 365);
    }

    #[test]
    fn test_drawback_schedule_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let schedule = loader.drawback_rates();

        assert_eq!(schedule.scheme, "drawback");
        let entry = schedule.rates.get("540701").unwrap();
        assert_eq!(entry.rate, dec("10.0"));
        assert_eq!(entry.cap_per_unit, Some(dec("2.00")));
        assert!(schedule.rates.get("610901").unwrap().cap_per_unit.is_none());
    }

    #[test]
    fn test_rodtep_schedule_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let schedule = loader.rodtep_rates();

        assert_eq!(schedule.scheme, "rodtep");
        assert_eq!(schedule.rates.get("61091000").unwrap().rate, dec("4.3"));
    }

    #[test]
    fn test_rule_set_lists_exclusions_and_documents() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rules = loader.rule_set_for(date).unwrap();

        assert_eq!(rules.excluded_categories.len(), 5);
        assert!(rules
            .excluded_categories
            .contains(&"Exports through trans-shipment".to_string()));

        let names: Vec<&str> = rules
            .required_documents
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Shipping Bill", "Export Invoice", "BRC"]);
    }

    #[test]
    fn test_rule_set_not_found_before_first_effective_date() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();

        match loader.rule_set_for(date) {
            Err(EngineError::RuleSetNotFound { date: d }) => assert_eq!(d, date),
            other => panic!("Expected RuleSetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_latest_effective_rule_set_wins() {
        let first = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();

        // Given out of order to check sorting
        let config = EngineConfig::new(
            scheme_config(),
            schedule("drawback"),
            schedule("rodtep"),
            vec![rule_set(second, &["B"]), rule_set(first, &["A"])],
        );
        let loader = ConfigLoader::from_config(config);

        let before_change = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            loader.rule_set_for(before_change).unwrap().excluded_categories,
            vec!["A".to_string()]
        );
        assert_eq!(
            loader.rule_set_for(second).unwrap().excluded_categories,
            vec!["B".to_string()]
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("scheme.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
