//! cohort-core: natural language cohort queries over sample patient records
//!
//! This crate provides the patient model, the keyword tables, the rule-based
//! query parser, the filter engine and the response shaping used by the
//! HTTP server.

pub mod dataset;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod parser;
pub mod patient;
pub mod report;

pub use dataset::{QUERY_SUGGESTIONS, sample_patients, suggestions};
pub use error::CoreError;
pub use filter::{AgeFilter, FilterCriteria, FilterEngine, FilterOutcome, check_birth_dates};
pub use parser::{AgePredicate, ComparisonOp, ParsedFilters, QueryParser};
pub use patient::{Condition, Gender, Patient, PatientName, age_on};
pub use report::{ChartData, FilterOption, FilterOptions, Pagination, PatientRow, SearchPage};
