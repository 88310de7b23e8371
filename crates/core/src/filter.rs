//! Patient filter engine
//!
//! Applies gender, diagnosis and age filters (in that order) to a patient
//! collection. Age filters arrive as compact strings: `"30-50"`, `">=60"`,
//! `"60+"` or `"1000"`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::parser::{ComparisonOp, ParsedFilters};
use crate::patient::Patient;

/// Operator tokens, longest first so "<=" is never read as "<"
const OPERATOR_TOKENS: &[(&str, ComparisonOp)] = &[
    (">=", ComparisonOp::Ge),
    ("<=", ComparisonOp::Le),
    (">", ComparisonOp::Gt),
    ("<", ComparisonOp::Lt),
];

/// Decoded age filter string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeFilter {
    /// Inclusive; a reversed range matches nothing
    Range { low: i32, high: i32 },
    Compare { op: ComparisonOp, age: i32 },
    Exact(i32),
}

impl AgeFilter {
    /// Decode an age filter string. `None` means the string is not
    /// recognized and the filter should be skipped.
    ///
    /// Forms are tried in order: `low-high`, `[op]N[+]` with up to three
    /// digits (operator defaults to `>=`), `N+`, and finally bare `N`.
    pub fn parse(input: &str) -> Option<Self> {
        if input.matches('-').count() == 1 {
            if let Some((low, high)) = input.split_once('-') {
                if is_digits(low) {
                    return Some(AgeFilter::Range {
                        low: low.parse().ok()?,
                        high: parse_digits(high.trim())?,
                    });
                }
            }
        }

        if let Some(filter) = parse_operator_form(input.trim()) {
            return Some(filter);
        }

        if let Some(min_age) = input.strip_suffix('+').and_then(parse_digits) {
            return Some(AgeFilter::Compare {
                op: ComparisonOp::Ge,
                age: min_age,
            });
        }

        parse_digits(input).map(AgeFilter::Exact)
    }

    pub fn matches(&self, age: i32) -> bool {
        match *self {
            AgeFilter::Range { low, high } => low <= age && age <= high,
            AgeFilter::Compare { op, age: bound } => op.compare(age, bound),
            AgeFilter::Exact(value) => age == value,
        }
    }
}

/// `^(>=|<=|>|<)?\s*(\d{1,3})\+?$`
fn parse_operator_form(input: &str) -> Option<AgeFilter> {
    let (op, rest) = OPERATOR_TOKENS
        .iter()
        .find_map(|(token, op)| input.strip_prefix(token).map(|rest| (*op, rest)))
        .unwrap_or((ComparisonOp::Ge, input));

    let digits = rest.trim_start();
    let digits = digits.strip_suffix('+').unwrap_or(digits);
    if digits.len() > 3 {
        return None;
    }

    parse_digits(digits).map(|age| AgeFilter::Compare { op, age })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_digits(s: &str) -> Option<i32> {
    if is_digits(s) { s.parse().ok() } else { None }
}

/// Filters to apply, in their textual interchange form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub age_filter: Option<String>,
    pub gender_filter: Option<String>,
    pub diagnosis_filter: Option<Vec<String>>,
}

impl FilterCriteria {
    /// Translate parser output into filter strings, keeping the operator
    pub fn from_parsed(parsed: &ParsedFilters) -> Self {
        Self {
            age_filter: parsed.age.map(|age| age.to_filter_string()),
            gender_filter: parsed.gender.map(|g| g.as_str().to_string()),
            diagnosis_filter: (!parsed.diagnoses.is_empty()).then(|| parsed.diagnoses.clone()),
        }
    }

    /// Build criteria from raw query-string values.
    ///
    /// The diagnosis value may hold one code or a comma-separated list.
    pub fn from_query(
        age_filter: Option<&str>,
        gender_filter: Option<&str>,
        diagnosis_filter: Option<&str>,
    ) -> Self {
        let diagnoses: Vec<String> = diagnosis_filter
            .map(|codes| {
                codes
                    .split(',')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            age_filter: age_filter.map(String::from),
            gender_filter: gender_filter.map(String::from),
            diagnosis_filter: (!diagnoses.is_empty()).then_some(diagnoses),
        }
    }
}

/// Result of applying a set of filters
#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    pub patients: Vec<&'a Patient>,
    /// Set when the birth-date check failed and the age filter was ignored
    pub age_filter_skipped: bool,
}

/// Applies [`FilterCriteria`] relative to a reference date
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    reference_date: Option<NaiveDate>,
}

impl FilterEngine {
    /// Engine whose reference date is the current local date
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a fixed reference date
    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self {
            reference_date: Some(reference_date),
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Copy of this engine with the reference date fixed at its current
    /// value, so every age computed for one request agrees
    pub fn pinned(&self) -> Self {
        Self::with_reference_date(self.reference_date())
    }

    /// Narrow `patients` by gender, then diagnosis, then age.
    ///
    /// Absent or empty filters are no-ops, as is an unrecognized age string.
    /// If any remaining patient was born after the reference date the age
    /// filter is skipped and the gender/diagnosis subset is returned.
    pub fn apply<'a>(&self, patients: &'a [Patient], criteria: &FilterCriteria) -> FilterOutcome<'a> {
        let mut selected: Vec<&Patient> = patients.iter().collect();

        if let Some(gender) = non_empty(criteria.gender_filter.as_deref()) {
            selected.retain(|p| p.gender.as_str() == gender);
        }

        if let Some(codes) = criteria.diagnosis_filter.as_deref().filter(|c| !c.is_empty()) {
            selected.retain(|p| p.has_any_condition(codes));
        }

        let mut age_filter_skipped = false;
        if let Some(age_filter) = non_empty(criteria.age_filter.as_deref()) {
            let reference = self.reference_date();
            match check_birth_dates(&selected, reference) {
                Ok(()) => {
                    if let Some(filter) = AgeFilter::parse(age_filter) {
                        selected.retain(|p| filter.matches(p.age_on(reference)));
                    } else {
                        tracing::debug!(age_filter, "Unrecognized age filter, ignoring");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Birth date after reference date");
                    tracing::error!(
                        reference_date = %reference,
                        "System date out-of-sync with patient birth dates. Age filter skipped."
                    );
                    age_filter_skipped = true;
                }
            }
        }

        FilterOutcome {
            patients: selected,
            age_filter_skipped,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Reject a patient set containing anyone born after `reference`
pub fn check_birth_dates(patients: &[&Patient], reference: NaiveDate) -> Result<(), CoreError> {
    match patients.iter().find(|p| p.birth_date > reference) {
        Some(patient) => Err(CoreError::BirthDateAfterReference {
            patient_id: patient.id.clone(),
            birth_date: patient.birth_date,
            reference_date: reference,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_patients;
    use crate::parser::{AgePredicate, QueryParser};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn engine() -> FilterEngine {
        FilterEngine::with_reference_date(reference())
    }

    fn age_only(filter: &str) -> FilterCriteria {
        FilterCriteria {
            age_filter: Some(filter.to_string()),
            ..Default::default()
        }
    }

    fn ids(outcome: &FilterOutcome<'_>) -> Vec<String> {
        outcome.patients.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_pinned_engine_keeps_reference() {
        assert_eq!(engine().pinned().reference_date(), reference());
        let today = FilterEngine::new().pinned();
        assert_eq!(today.pinned().reference_date(), today.reference_date());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            AgeFilter::parse("30-50"),
            Some(AgeFilter::Range { low: 30, high: 50 })
        );
        // reversed ranges are kept as-is
        assert_eq!(
            AgeFilter::parse("50-30"),
            Some(AgeFilter::Range { low: 50, high: 30 })
        );
        assert_eq!(AgeFilter::parse("30-abc"), None);
        assert_eq!(AgeFilter::parse("-30"), None);
        assert_eq!(AgeFilter::parse("1-2-3"), None);
    }

    #[test]
    fn test_parse_operators() {
        let cmp = |op, age| Some(AgeFilter::Compare { op, age });
        assert_eq!(AgeFilter::parse(">60"), cmp(ComparisonOp::Gt, 60));
        assert_eq!(AgeFilter::parse(">=60"), cmp(ComparisonOp::Ge, 60));
        assert_eq!(AgeFilter::parse("<=70"), cmp(ComparisonOp::Le, 70));
        assert_eq!(AgeFilter::parse("<50"), cmp(ComparisonOp::Lt, 50));
        assert_eq!(AgeFilter::parse(" > 60 "), cmp(ComparisonOp::Gt, 60));
        // trailing "+" is ignored after an operator
        assert_eq!(AgeFilter::parse("<50+"), cmp(ComparisonOp::Lt, 50));
        // no operator defaults to >=
        assert_eq!(AgeFilter::parse("60+"), cmp(ComparisonOp::Ge, 60));
        assert_eq!(AgeFilter::parse("60"), cmp(ComparisonOp::Ge, 60));
    }

    #[test]
    fn test_parse_long_numbers() {
        assert_eq!(
            AgeFilter::parse("1000+"),
            Some(AgeFilter::Compare { op: ComparisonOp::Ge, age: 1000 })
        );
        assert_eq!(AgeFilter::parse("1000"), Some(AgeFilter::Exact(1000)));
        assert_eq!(AgeFilter::parse(">1000"), None);
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(AgeFilter::parse("old"), None);
        assert_eq!(AgeFilter::parse("=>60"), None);
        assert_eq!(AgeFilter::parse(""), None);
        assert_eq!(AgeFilter::parse("99999999999"), None);
    }

    #[test]
    fn test_range_filter_inclusive() {
        let patients = sample_patients().unwrap();
        let outcome = engine().apply(&patients, &age_only("30-50"));

        let expected: Vec<String> = patients
            .iter()
            .filter(|p| (30..=50).contains(&p.age_on(reference())))
            .map(|p| p.id.clone())
            .collect();

        assert!(!expected.is_empty());
        assert_eq!(ids(&outcome), expected);
        assert!(!outcome.age_filter_skipped);
    }

    #[test]
    fn test_ge_and_plus_equivalent() {
        let patients = sample_patients().unwrap();
        let ge = engine().apply(&patients, &age_only(">=60"));
        let plus = engine().apply(&patients, &age_only("60+"));

        assert_eq!(ids(&ge), ids(&plus));
        assert!(ge.patients.iter().all(|p| p.age_on(reference()) >= 60));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let patients = sample_patients().unwrap();
        assert!(engine().apply(&patients, &age_only("50-30")).patients.is_empty());
    }

    #[test]
    fn test_unrecognized_age_filter_is_noop() {
        let patients = sample_patients().unwrap();
        let outcome = engine().apply(&patients, &age_only("elderly"));
        assert_eq!(outcome.patients.len(), patients.len());
        assert!(!outcome.age_filter_skipped);
    }

    #[test]
    fn test_gender_and_diagnosis_filters() {
        let patients = sample_patients().unwrap();
        let criteria = FilterCriteria {
            gender_filter: Some("female".to_string()),
            diagnosis_filter: Some(vec!["E11".to_string()]),
            ..Default::default()
        };

        let outcome = engine().apply(&patients, &criteria);
        assert_eq!(ids(&outcome), vec!["patient-001", "patient-003", "patient-007"]);
    }

    #[test]
    fn test_unknown_gender_matches_nothing() {
        let patients = sample_patients().unwrap();
        let criteria = FilterCriteria {
            gender_filter: Some("Female".to_string()),
            ..Default::default()
        };
        assert!(engine().apply(&patients, &criteria).patients.is_empty());
    }

    #[test]
    fn test_empty_filters_are_noops() {
        let patients = sample_patients().unwrap();
        let criteria = FilterCriteria {
            age_filter: Some(String::new()),
            gender_filter: Some(String::new()),
            diagnosis_filter: Some(Vec::new()),
        };
        assert_eq!(engine().apply(&patients, &criteria).patients.len(), 15);
    }

    #[test]
    fn test_future_birth_date_skips_age_filter() {
        let mut patients = sample_patients().unwrap();
        patients[1].birth_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

        let criteria = FilterCriteria {
            age_filter: Some(">=60".to_string()),
            gender_filter: Some("male".to_string()),
            ..Default::default()
        };
        let outcome = engine().apply(&patients, &criteria);

        assert!(outcome.age_filter_skipped);
        assert_eq!(outcome.patients.len(), 7);
        assert!(outcome.patients.iter().all(|p| p.gender.as_str() == "male"));
    }

    #[test]
    fn test_guard_only_checks_narrowed_set() {
        let mut patients = sample_patients().unwrap();
        // patient-002 is male; a female-only query never sees it
        patients[1].birth_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

        let criteria = FilterCriteria {
            age_filter: Some(">=60".to_string()),
            gender_filter: Some("female".to_string()),
            ..Default::default()
        };
        let outcome = engine().apply(&patients, &criteria);

        assert!(!outcome.age_filter_skipped);
        assert!(outcome.patients.iter().all(|p| p.age_on(reference()) >= 60));
    }

    #[test]
    fn test_check_birth_dates_error() {
        let mut patients = sample_patients().unwrap();
        patients[4].birth_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let all: Vec<&Patient> = patients.iter().collect();

        let err = check_birth_dates(&all, reference()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::BirthDateAfterReference { ref patient_id, .. } if patient_id == "patient-005"
        ));
        assert!(check_birth_dates(&all[..4], reference()).is_ok());
    }

    #[test]
    fn test_criteria_from_parsed() {
        let parsed = QueryParser::new()
            .unwrap()
            .parse("female patients between 70 and 40 with asthma");
        assert_eq!(parsed.age, Some(AgePredicate::Between { low: 40, high: 70 }));

        let criteria = FilterCriteria::from_parsed(&parsed);
        assert_eq!(criteria.age_filter.as_deref(), Some("40-70"));
        assert_eq!(criteria.gender_filter.as_deref(), Some("female"));
        assert_eq!(criteria.diagnosis_filter, Some(vec!["J45".to_string()]));
    }

    #[test]
    fn test_criteria_from_empty_parse() {
        let parsed = QueryParser::new().unwrap().parse("");
        assert_eq!(FilterCriteria::from_parsed(&parsed), FilterCriteria::default());
    }

    #[test]
    fn test_criteria_from_query() {
        let criteria = FilterCriteria::from_query(Some("60+"), None, Some("E10, E11"));
        assert_eq!(
            criteria.diagnosis_filter,
            Some(vec!["E10".to_string(), "E11".to_string()])
        );
        assert_eq!(FilterCriteria::from_query(None, None, Some(" , ")).diagnosis_filter, None);
    }

    #[test]
    fn test_diabetic_over_50_end_to_end() {
        let patients = sample_patients().unwrap();
        let parsed = QueryParser::new()
            .unwrap()
            .parse("Show me all diabetic patients over 50");
        let outcome = engine().apply(&patients, &FilterCriteria::from_parsed(&parsed));

        // E11: 001 (1965, 60), 003 (1958, 66), 007 (1970, 55); E10: 005 (1948, 77)
        assert_eq!(
            ids(&outcome),
            vec!["patient-001", "patient-003", "patient-005", "patient-007"]
        );
    }
}
