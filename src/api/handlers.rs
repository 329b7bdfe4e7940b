//! HTTP request handlers for the Export Benefit Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{DrawbackClaim, RodtepClaim};

use super::request::{DrawbackClaimRequest, DrawbackListQuery, RodtepClaimRequest, RodtepListQuery};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/drawback/claims",
            post(submit_drawback_handler).get(list_drawback_handler),
        )
        .route("/drawback/claims/:claim_id", get(get_drawback_handler))
        .route(
            "/rodtep/claims",
            post(submit_rodtep_handler).get(list_rodtep_handler),
        )
        .route("/rodtep/claims/:claim_id", get(get_rodtep_handler))
        .route(
            "/rodtep/claims/:claim_id/generate-scrip",
            post(generate_scrip_handler),
        )
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    if err.is_retryable() {
        warn!(correlation_id = %correlation_id, error = %err, "Request failed, retryable");
    } else {
        warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    }
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a body rejection to a 400 response body.
fn json_rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the problem
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

fn query_rejection_error(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %rejection.body_text(),
        "Invalid query string"
    );
    json_response(
        StatusCode::BAD_REQUEST,
        ApiError::validation_error(rejection.body_text()),
    )
}

/// Handler for POST /drawback/claims.
///
/// Returns the verdict with status 200, whether approved or rejected.
async fn submit_drawback_handler(
    State(state): State<AppState>,
    payload: Result<Json<DrawbackClaimRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing drawback claim");

    let claim: DrawbackClaim = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => {
            let error = json_rejection_error(correlation_id, rejection);
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };
    let claim_id = claim.claim_id.clone();

    let start_time = Instant::now();
    match state.processor().process_drawback_claim(claim) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                claim_id = %claim_id,
                rejected = outcome.is_rejected(),
                duration_us = start_time.elapsed().as_micros(),
                "Drawback claim processed"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /drawback/claims.
async fn list_drawback_handler(
    State(state): State<AppState>,
    query: Result<Query<DrawbackListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_error(correlation_id, rejection),
    };

    match state.processor().list_drawback_claims(query.status) {
        Ok(records) => json_response(StatusCode::OK, records),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /drawback/claims/:claim_id.
async fn get_drawback_handler(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.processor().get_drawback_claim(&claim_id) {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /rodtep/claims.
///
/// The filing window is measured to `filing_date`, or to today when the
/// request omits it.
async fn submit_rodtep_handler(
    State(state): State<AppState>,
    payload: Result<Json<RodtepClaimRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing RoDTEP claim");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = json_rejection_error(correlation_id, rejection);
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };
    let as_of = request
        .filing_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let claim: RodtepClaim = request.into();
    let claim_id = claim.claim_id.clone();

    let start_time = Instant::now();
    match state.processor().process_rodtep_claim(claim, as_of) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                claim_id = %claim_id,
                total_benefit = ?outcome.calculation().map(|c| c.total_benefit),
                duration_us = start_time.elapsed().as_micros(),
                "RoDTEP claim processed"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /rodtep/claims.
async fn list_rodtep_handler(
    State(state): State<AppState>,
    query: Result<Query<RodtepListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_error(correlation_id, rejection),
    };

    match state.processor().list_rodtep_claims(query.status) {
        Ok(records) => json_response(StatusCode::OK, records),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /rodtep/claims/:claim_id.
async fn get_rodtep_handler(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.processor().get_rodtep_claim(&claim_id) {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /rodtep/claims/:claim_id/generate-scrip.
async fn generate_scrip_handler(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, claim_id = %claim_id, "Generating e-scrip");

    match state.processor().generate_rodtep_scrip(&claim_id) {
        Ok(scrip) => json_response(StatusCode::OK, scrip),
        Err(err) => error_response(correlation_id, err),
    }
}
