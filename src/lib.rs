//! Export Benefit Engine for Indian export incentive schemes
//!
//! This crate validates and calculates duty drawback claims (All-Industry
//! rates with per-unit and 12.5% FOB caps) and RoDTEP claims (exclusions,
//! required documents, eligibility, benefit calculation), and issues
//! e-scrips for approved RoDTEP benefits.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod processor;
pub mod store;
