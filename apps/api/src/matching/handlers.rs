//! Axum route handlers for the Matching API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::matcher::DEFAULT_SUMMARY_TOP_N;
use crate::models::{MatchRequest, MatchResult, MatchSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// How many matched and missing entries to keep (clamped to 1..=20).
    pub top: Option<usize>,
}

/// POST /match
///
/// Full compatibility report for one CV against one job description.
pub async fn handle_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let request_id = Uuid::new_v4();

    let result = state
        .matcher
        .match_cv_to_job(&request.cv_data, &request.job_description)
        .instrument(info_span!("match", %request_id))
        .await?;

    Ok(Json(result))
}

/// POST /match/summary?top=N
///
/// Overall analysis plus the top N matched and missing requirements.
pub async fn handle_match_summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchSummary>, AppError> {
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let request_id = Uuid::new_v4();
    let top_n = params.top.unwrap_or(DEFAULT_SUMMARY_TOP_N);

    let summary = state
        .matcher
        .summarize(&request.cv_data, &request.job_description, top_n)
        .instrument(info_span!("match_summary", %request_id, top_n))
        .await?;

    Ok(Json(summary))
}
