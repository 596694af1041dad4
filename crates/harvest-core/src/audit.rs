//! Data audit. The dashboard itself tolerates all of these (duplicates are
//! last-write-wins, unknown codes are never drawn); the audit makes them
//! visible and lets a strict caller refuse the data.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::{HarvestError, Result};
use crate::record::Dataset;
use crate::store::DataStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Same (dataset, year, code) seen more than once.
    Duplicate { dataset: Dataset, year: String, code: String, occurrences: usize },
    NegativeValue { dataset: Dataset, year: String, code: String, value: f64 },
    NonFiniteValue { dataset: Dataset, year: String, code: String },
    /// Year field that is not one of the configured years.
    YearOutsideRange { dataset: Dataset, year: String, records: usize },
    /// Code with records but no boundary in the geometry.
    MissingGeometry { dataset: Dataset, code: String },
}

pub fn audit(store: &DataStore, config: &DashboardConfig) -> Vec<Issue> {
    let years: Vec<String> = config.years().iter().map(u16::to_string).collect();
    let mut issues = Vec::new();

    for dataset in Dataset::ALL {
        let records = store.records(dataset);

        // Keys in first-seen order so reports are deterministic.
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        let mut order = Vec::new();
        let mut outside: HashMap<&str, usize> = HashMap::new();
        let mut outside_order = Vec::new();

        for r in records {
            let key = (r.year.as_str(), r.municipality_code.as_str());
            let n = counts.entry(key).or_insert(0);
            if *n == 0 {
                order.push(key);
            }
            *n += 1;

            if !r.value.is_finite() {
                issues.push(Issue::NonFiniteValue {
                    dataset,
                    year: r.year.clone(),
                    code: r.municipality_code.clone(),
                });
            } else if r.value < 0.0 {
                issues.push(Issue::NegativeValue {
                    dataset,
                    year: r.year.clone(),
                    code: r.municipality_code.clone(),
                    value: r.value,
                });
            }

            if !years.iter().any(|y| *y == r.year) {
                let n = outside.entry(r.year.as_str()).or_insert(0);
                if *n == 0 {
                    outside_order.push(r.year.as_str());
                }
                *n += 1;
            }
        }

        for (year, code) in order {
            let occurrences = counts[&(year, code)];
            if occurrences > 1 {
                issues.push(Issue::Duplicate {
                    dataset,
                    year: year.to_string(),
                    code: code.to_string(),
                    occurrences,
                });
            }
        }

        for year in outside_order {
            issues.push(Issue::YearOutsideRange { dataset, year: year.to_string(), records: outside[year] });
        }

        if let Some(geometry) = store.geometry() {
            let mut reported = std::collections::HashSet::new();
            for r in records {
                let code = r.municipality_code.as_str();
                if !geometry.contains_code(code) && reported.insert(code) {
                    issues.push(Issue::MissingGeometry { dataset, code: code.to_string() });
                }
            }
        }
    }

    issues
}

/// `audit`, failing when anything was found.
pub fn audit_strict(store: &DataStore, config: &DashboardConfig) -> Result<()> {
    match audit(store, config).len() {
        0 => Ok(()),
        count => Err(HarvestError::AuditFailed { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryCollection, MunicipalityGeometry};
    use crate::record::ProductionRecord;

    fn geo(codes: &[&str]) -> GeometryCollection {
        GeometryCollection {
            municipalities: codes
                .iter()
                .map(|c| MunicipalityGeometry { code: c.to_string(), name: None, polygons: Vec::new() })
                .collect(),
        }
    }

    #[test]
    fn clean_data_has_no_issues() {
        let store = DataStore::new(
            vec![ProductionRecord::new("2013", "A", "Alfa", 1.0)],
            vec![ProductionRecord::new("2014", "A", "Alfa", 0.0)],
            Some(geo(&["A"])),
        );
        assert!(audit(&store, &DashboardConfig::default()).is_empty());
        assert!(audit_strict(&store, &DashboardConfig::default()).is_ok());
    }

    #[test]
    fn reports_each_issue_kind() {
        let store = DataStore::new(
            vec![
                ProductionRecord::new("2013", "A", "Alfa", 1.0),
                ProductionRecord::new("2013", "A", "Alfa", 2.0),
                ProductionRecord::new("2010", "B", "Beta", -3.0),
            ],
            Vec::new(),
            Some(geo(&["A"])),
        );
        let issues = audit(&store, &DashboardConfig::default());
        assert_eq!(
            issues,
            vec![
                Issue::NegativeValue { dataset: Dataset::Timber, year: "2010".into(), code: "B".into(), value: -3.0 },
                Issue::Duplicate { dataset: Dataset::Timber, year: "2013".into(), code: "A".into(), occurrences: 2 },
                Issue::YearOutsideRange { dataset: Dataset::Timber, year: "2010".into(), records: 1 },
                Issue::MissingGeometry { dataset: Dataset::Timber, code: "B".into() },
            ]
        );
        let err = audit_strict(&store, &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, HarvestError::AuditFailed { count: 4 }));
    }

    #[test]
    fn geometry_check_skipped_without_geometry() {
        let store = DataStore::new(vec![ProductionRecord::new("2013", "Q", "Q", 1.0)], Vec::new(), None);
        assert!(audit(&store, &DashboardConfig::default()).is_empty());
    }
}
