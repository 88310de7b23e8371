//! Patient table search endpoint

use axum::{Json, extract::Query, extract::State, extract::rejection::QueryRejection};
use cohort_core::{FilterCriteria, PatientRow, SearchPage};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

/// Query parameters for patient search
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub age_filter: Option<String>,
    pub gender_filter: Option<String>,
    pub diagnosis_filter: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchParams {
    /// Validated (page, limit)
    fn page_and_limit(&self) -> Result<(usize, usize), AppError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        let page = usize::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| AppError::Unprocessable("page must be greater than or equal to 1".into()))?;
        let limit = usize::try_from(limit)
            .ok()
            .filter(|l| (1..=MAX_LIMIT as usize).contains(l))
            .ok_or_else(|| {
                AppError::Unprocessable(format!("limit must be between 1 and {MAX_LIMIT}"))
            })?;

        Ok((page, limit))
    }
}

/// GET /patients/search - Filtered, paginated patient table
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchPage>, AppError> {
    let Query(params) = params?;
    let (page, limit) = params.page_and_limit()?;

    let criteria = FilterCriteria::from_query(
        params.age_filter.as_deref(),
        params.gender_filter.as_deref(),
        params.diagnosis_filter.as_deref(),
    );

    let engine = state.engine.pinned();
    let outcome = state.filter(&engine, &criteria);

    let rows: Vec<PatientRow> = outcome
        .patients
        .into_iter()
        .map(|p| PatientRow::new(p, engine.reference_date()))
        .collect();

    Ok(Json(SearchPage::paginate(rows, page, limit)))
}
