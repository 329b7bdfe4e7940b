//! HTTP API module for the Export Benefit Engine.
//!
//! This module provides the REST endpoints for submitting drawback and
//! RoDTEP claims, reading back their verdicts, and issuing e-scrips.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DrawbackClaimRequest, DrawbackListQuery, RodtepClaimRequest, RodtepListQuery};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
