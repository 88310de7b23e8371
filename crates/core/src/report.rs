//! Response shaping for filtered patients: table rows, pages, chart buckets

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::patient::{Gender, Patient};

/// One row of the patient table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRow {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub primary_condition: String,
    pub medications: String,
}

impl PatientRow {
    pub fn new(patient: &Patient, reference: NaiveDate) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.display(),
            age: patient.age_on(reference),
            gender: patient.gender.label().to_string(),
            primary_condition: patient
                .conditions
                .first()
                .map(|c| c.display.clone())
                .unwrap_or_else(|| "None".to_string()),
            medications: patient.medications.join(", "),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_results: usize,
    pub total_pages: usize,
}

/// A single page of table rows
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub data: Vec<PatientRow>,
    pub pagination: Pagination,
}

impl SearchPage {
    /// Slice `rows` into 1-based page `page` of size `limit`.
    ///
    /// Both `page` and `limit` must be at least 1; pages past the end are empty.
    pub fn paginate(rows: Vec<PatientRow>, page: usize, limit: usize) -> Self {
        let total_results = rows.len();
        let start = page.saturating_sub(1).saturating_mul(limit);
        let data = rows.into_iter().skip(start).take(limit).collect();

        Self {
            data,
            pagination: Pagination {
                page,
                limit,
                total_results,
                total_pages: total_results.div_ceil(limit.max(1)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeDistribution {
    pub age_group: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderDistribution {
    pub gender: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionDistribution {
    pub condition: String,
    pub count: usize,
}

/// Aggregated counts for charts (no identifying data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub age_distribution: Vec<AgeDistribution>,
    pub gender_distribution: Vec<GenderDistribution>,
    pub condition_distribution: Vec<ConditionDistribution>,
    pub total_patients: usize,
}

/// Age bucket labels with their inclusive upper bounds; the last is open-ended
const AGE_BUCKETS: &[(&str, Option<i32>)] = &[
    ("0-30", Some(30)),
    ("31-50", Some(50)),
    ("51-70", Some(70)),
    ("71+", None),
];

impl ChartData {
    pub fn from_patients(patients: &[&Patient], reference: NaiveDate) -> Self {
        let mut age_counts = [0usize; AGE_BUCKETS.len()];
        for patient in patients {
            let age = patient.age_on(reference);
            let bucket = AGE_BUCKETS
                .iter()
                .position(|(_, upper)| upper.is_none_or(|upper| age <= upper))
                .unwrap_or(AGE_BUCKETS.len() - 1);
            age_counts[bucket] += 1;
        }

        let gender_distribution = [Gender::Male, Gender::Female]
            .into_iter()
            .map(|gender| GenderDistribution {
                gender: gender.label().to_string(),
                count: patients.iter().filter(|p| p.gender == gender).count(),
            })
            .collect();

        Self {
            age_distribution: AGE_BUCKETS
                .iter()
                .zip(age_counts)
                .map(|((label, _), count)| AgeDistribution {
                    age_group: label.to_string(),
                    count,
                })
                .collect(),
            gender_distribution,
            condition_distribution: condition_counts(patients),
            total_patients: patients.len(),
        }
    }
}

/// Condition display counts, most frequent first; ties keep first-seen order
fn condition_counts(patients: &[&Patient]) -> Vec<ConditionDistribution> {
    let mut counts: Vec<ConditionDistribution> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for condition in patients.iter().flat_map(|p| &p.conditions) {
        match index.get(condition.display.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(condition.display.as_str(), counts.len());
                counts.push(ConditionDistribution {
                    condition: condition.display.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps insertion order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// A dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Options for the filter dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub age_ranges: Vec<FilterOption>,
    pub genders: Vec<FilterOption>,
    pub diagnoses: Vec<FilterOption>,
}

impl FilterOptions {
    /// Fixed age and gender options plus every diagnosis code in `patients`,
    /// sorted by display name
    pub fn from_patients(patients: &[Patient]) -> Self {
        // code -> display; the last display seen for a code wins
        let mut diagnoses: Vec<(&str, &str)> = Vec::new();
        for condition in patients.iter().flat_map(|p| &p.conditions) {
            match diagnoses.iter_mut().find(|(code, _)| *code == condition.code) {
                Some(entry) => entry.1 = condition.display.as_str(),
                None => diagnoses.push((condition.code.as_str(), condition.display.as_str())),
            }
        }
        diagnoses.sort_by(|a, b| a.1.cmp(b.1));

        Self {
            age_ranges: vec![
                FilterOption::new("Under 30", "<30"),
                FilterOption::new("30-50", "30-50"),
                FilterOption::new("50-70", "50-70"),
                FilterOption::new("70+", "70+"),
            ],
            genders: vec![
                FilterOption::new(Gender::Male.label(), Gender::Male.as_str()),
                FilterOption::new(Gender::Female.label(), Gender::Female.as_str()),
            ],
            diagnoses: diagnoses
                .into_iter()
                .map(|(code, display)| FilterOption::new(display, code))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_patients;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn rows(patients: &[Patient]) -> Vec<PatientRow> {
        patients.iter().map(|p| PatientRow::new(p, reference())).collect()
    }

    #[test]
    fn test_patient_row() {
        let patients = sample_patients().unwrap();
        let row = PatientRow::new(&patients[8], reference());

        assert_eq!(row.id, "patient-009");
        assert_eq!(row.name, "Isabel Rodriguez");
        assert_eq!(row.age, 69);
        assert_eq!(row.gender, "Female");
        assert_eq!(row.primary_condition, "Chronic ischemic heart disease");
        assert_eq!(row.medications, "Aspirin, Metoprolol, Rosuvastatin");
    }

    #[test]
    fn test_patient_row_without_conditions() {
        let mut patients = sample_patients().unwrap();
        patients[0].conditions.clear();
        patients[0].medications.clear();

        let row = PatientRow::new(&patients[0], reference());
        assert_eq!(row.primary_condition, "None");
        assert_eq!(row.medications, "");
    }

    #[test]
    fn test_paginate_second_page() {
        let page = SearchPage::paginate(rows(&sample_patients().unwrap()), 2, 10);

        assert_eq!(page.data.len(), 5);
        assert_eq!(page.data[0].id, "patient-011");
        assert_eq!(
            page.pagination,
            Pagination {
                page: 2,
                limit: 10,
                total_results: 15,
                total_pages: 2,
            }
        );
    }

    #[test]
    fn test_paginate_past_end_and_empty() {
        let page = SearchPage::paginate(rows(&sample_patients().unwrap()), 5, 4);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_pages, 4);

        let empty = SearchPage::paginate(Vec::new(), 1, 10);
        assert!(empty.data.is_empty());
        assert_eq!(empty.pagination.total_pages, 0);
    }

    #[test]
    fn test_chart_data() {
        let patients = sample_patients().unwrap();
        let all: Vec<&Patient> = patients.iter().collect();
        let chart = ChartData::from_patients(&all, reference());

        let ages: Vec<(&str, usize)> = chart
            .age_distribution
            .iter()
            .map(|a| (a.age_group.as_str(), a.count))
            .collect();
        assert_eq!(ages, vec![("0-30", 0), ("31-50", 7), ("51-70", 6), ("71+", 2)]);

        assert_eq!(chart.gender_distribution[0].gender, "Male");
        assert_eq!(chart.gender_distribution[0].count, 7);
        assert_eq!(chart.gender_distribution[1].gender, "Female");
        assert_eq!(chart.gender_distribution[1].count, 8);

        assert_eq!(chart.condition_distribution[0].condition, "Essential hypertension");
        assert_eq!(chart.condition_distribution[0].count, 4);
        assert_eq!(chart.condition_distribution[1].condition, "Type 2 diabetes mellitus");
        assert_eq!(chart.condition_distribution[1].count, 3);
        // Hyperlipidemia and anxiety both appear twice; hyperlipidemia is seen first
        assert_eq!(chart.condition_distribution[2].condition, "Hyperlipidemia");
        assert_eq!(
            chart.condition_distribution[3].condition,
            "Generalized anxiety disorder"
        );
        assert_eq!(chart.total_patients, 15);
    }

    #[test]
    fn test_chart_data_empty() {
        let chart = ChartData::from_patients(&[], reference());
        assert_eq!(chart.age_distribution.len(), 4);
        assert!(chart.age_distribution.iter().all(|a| a.count == 0));
        assert_eq!(chart.gender_distribution.len(), 2);
        assert!(chart.condition_distribution.is_empty());
        assert_eq!(chart.total_patients, 0);
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_patients(&sample_patients().unwrap());

        assert_eq!(options.age_ranges[0], FilterOption::new("Under 30", "<30"));
        assert_eq!(options.genders[1], FilterOption::new("Female", "female"));
        assert_eq!(options.diagnoses.len(), 18);
        assert_eq!(options.diagnoses[0], FilterOption::new("Alzheimer's disease", "G30"));
        assert!(
            options
                .diagnoses
                .windows(2)
                .all(|pair| pair[0].label <= pair[1].label)
        );
    }
}
