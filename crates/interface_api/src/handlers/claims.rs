//! Claims handlers

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use domain_claims::{BatchOutcome, BatchReport, RawClaim};
use tokio::task::JoinSet;
use tracing::info;

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Evaluates a single claim record
pub async fn evaluate_claim(
    State(state): State<AppState>,
    payload: Result<Json<RawClaim>, JsonRejection>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let Json(raw) = payload?;
    let result = state.engine.evaluate_raw(&raw)?;
    Ok(Json(result.into()))
}

/// Evaluates a batch of claim records
///
/// Records are evaluated on the blocking pool in parallel; the response
/// lists them in request order with per-record errors in place.
pub async fn evaluate_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchEvaluationRequest>, JsonRejection>,
) -> Result<Json<BatchEvaluationResponse>, ApiError> {
    let Json(request) = payload?;
    info!(records = request.claims.len(), "Batch evaluation requested");

    let mut tasks = JoinSet::new();
    for (index, raw) in request.claims.into_iter().enumerate() {
        let engine = Arc::clone(&state.engine);
        tasks.spawn_blocking(move || BatchOutcome {
            index,
            result: engine.evaluate_raw(&raw),
        });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(|e| ApiError::Internal(format!("Evaluation task failed: {e}")))?;
        outcomes.push(outcome);
    }

    let report = BatchReport::from_outcomes(outcomes, state.config.currency);
    Ok(Json(report.into()))
}
