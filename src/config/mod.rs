//! Configuration loading and management for the Export Benefit Engine.
//!
//! This module provides functionality to load the scheme configuration from
//! YAML files, including scheme settings, the drawback and RoDTEP rate
//! schedules, and the dated RoDTEP rule sets.
//!
//! # Example
//!
//! ```no_run
//! use benefit_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Loaded scheme: {}", config.scheme().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, RateSchedule, RequiredDocument, RodtepSettings, RuleSetConfig, ScheduleEntry,
    SchemeConfig, SchemeMetadata,
};
