//! Application state for the Export Benefit Engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::processor::ClaimProcessor;

/// Shared application state.
///
/// Every handler works through the same [`ClaimProcessor`], so claims
/// stored by one request are visible to the next.
#[derive(Clone)]
pub struct AppState {
    processor: Arc<ClaimProcessor>,
}

impl AppState {
    /// Creates application state around an existing processor.
    pub fn new(processor: ClaimProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }

    /// Creates application state with in-memory stores.
    pub fn from_config(config: ConfigLoader) -> Self {
        Self::new(ClaimProcessor::in_memory(config))
    }

    /// Returns the claim processor.
    pub fn processor(&self) -> &ClaimProcessor {
        &self.processor
    }
}
