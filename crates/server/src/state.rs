//! Shared request state

use std::sync::Arc;

use chrono::NaiveDate;
use cohort_core::{CoreError, FilterCriteria, FilterEngine, FilterOutcome, Patient, QueryParser};

/// Read-only data shared by every request
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<[Patient]>,
    pub parser: Arc<QueryParser>,
    pub engine: FilterEngine,
}

impl AppState {
    /// Build state over `patients`, computing ages against `reference_date`
    /// (or the current date when `None`)
    pub fn new(patients: Vec<Patient>, reference_date: Option<NaiveDate>) -> Result<Self, CoreError> {
        let engine = match reference_date {
            Some(date) => FilterEngine::with_reference_date(date),
            None => FilterEngine::new(),
        };

        Ok(Self {
            patients: patients.into(),
            parser: Arc::new(QueryParser::new()?),
            engine,
        })
    }

    /// Build state over the bundled sample patients
    pub fn with_sample_data(reference_date: Option<NaiveDate>) -> Result<Self, CoreError> {
        Self::new(cohort_core::sample_patients()?, reference_date)
    }

    /// Apply `criteria` to the full patient set, counting skipped age filters
    pub fn filter<'a>(&'a self, engine: &FilterEngine, criteria: &FilterCriteria) -> FilterOutcome<'a> {
        let outcome = engine.apply(&self.patients, criteria);
        if outcome.age_filter_skipped {
            metrics::counter!("age_filter_skipped_total").increment(1);
        }
        outcome
    }
}
