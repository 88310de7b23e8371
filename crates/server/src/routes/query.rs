//! Natural language query endpoint

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use cohort_core::{FilterCriteria, ParsedFilters, Patient};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Number of matching patients echoed back in full
const RESULTS_SAMPLE_SIZE: usize = 10;

/// Request body for a natural language query
#[derive(Deserialize)]
pub struct QueryRequest {
    query: String,
}

#[derive(Serialize)]
pub struct QuerySummary {
    total_patients_found: usize,
    confidence_score: f64,
}

/// Response body for a natural language query
#[derive(Serialize)]
pub struct QueryResponse {
    parsed_filters: ParsedFilters,
    applied_filters: FilterCriteria,
    summary: QuerySummary,
    results_sample: Vec<Patient>,
}

/// POST /query - Natural language patient query
///
/// Parses the query into structured filters, translates them into filter
/// strings, and returns the match count with a sample of matching records.
pub async fn query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    let Json(body) = body?;
    if body.query.is_empty() {
        return Err(AppError::Unprocessable(
            "query must be at least 1 character".to_string(),
        ));
    }

    let parsed = state.parser.parse(&body.query);
    metrics::counter!("nl_queries_total").increment(1);

    let applied = FilterCriteria::from_parsed(&parsed);
    tracing::info!(applied = ?applied, "Converted query to filters");

    let engine = state.engine.pinned();
    let outcome = state.filter(&engine, &applied);

    Ok(Json(QueryResponse {
        summary: QuerySummary {
            total_patients_found: outcome.patients.len(),
            confidence_score: parsed.confidence,
        },
        results_sample: outcome
            .patients
            .into_iter()
            .take(RESULTS_SAMPLE_SIZE)
            .cloned()
            .collect(),
        parsed_filters: parsed,
        applied_filters: applied,
    }))
}
