//! Year filtering, per-municipality lookups, totals and co-occurrence counts.
//!
//! Everything here is a pure function of the raw record slices. Nothing is
//! cached: each year or mode change rebuilds its views from scratch.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::record::ProductionRecord;

// ── Value lookup ──────────────────────────────────────────────────────────────

/// Municipality code → value for one (dataset, year).
///
/// Duplicate codes resolve last-write-wins. Source files are expected to be
/// unique per (dataset, municipality, year); `audit` reports when they are not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueLookup {
    values: HashMap<String, f64>,
}

impl ValueLookup {
    /// Value for `code`, 0 when absent.
    pub fn get(&self, code: &str) -> f64 {
        self.values.get(code).copied().unwrap_or(0.0)
    }

    /// Largest value in the lookup, 0 for an empty lookup.
    pub fn max_value(&self) -> f64 {
        self.values.values().copied().fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

/// Records whose year field equals `year` (string equality), input order kept.
pub fn filter_by_year<'a>(records: &'a [ProductionRecord], year: &str) -> Vec<&'a ProductionRecord> {
    records.iter().filter(|r| r.year == year).collect()
}

pub fn to_lookup(records: &[&ProductionRecord]) -> ValueLookup {
    let mut values = HashMap::with_capacity(records.len());
    for r in records {
        values.insert(r.municipality_code.clone(), r.value);
    }
    ValueLookup { values }
}

/// Sum of `value`; 0 for an empty slice.
pub fn total_value(records: &[&ProductionRecord]) -> f64 {
    records.iter().map(|r| r.value).sum()
}

pub fn municipalities_with_positive_value(records: &[&ProductionRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| r.value > 0.0)
        .map(|r| r.municipality_code.clone())
        .collect()
}

pub fn municipalities_in_both(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.intersection(b).cloned().collect()
}

/// For each year of `years` (ascending), how many municipalities had positive
/// production in both datasets.
pub fn count_municipalities_in_both_by_year(
    timber: &[ProductionRecord],
    cattle: &[ProductionRecord],
    years: &[u16],
) -> Vec<usize> {
    years
        .iter()
        .map(|year| {
            let y = year.to_string();
            let a = municipalities_with_positive_value(&filter_by_year(timber, &y));
            let b = municipalities_with_positive_value(&filter_by_year(cattle, &y));
            municipalities_in_both(&a, &b).len()
        })
        .collect()
}

/// Year → total value. Years with no records are absent; read with
/// `.get(year).copied().unwrap_or(0.0)`.
pub fn sum_by_year(records: &[ProductionRecord]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(r.year.clone()).or_insert(0.0) += r.value;
    }
    totals
}

/// Codes present in either yearly view, in first-encounter order (all of
/// `a`, then the codes of `b` not already seen).
pub fn union_codes(a: &[&ProductionRecord], b: &[&ProductionRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    a.iter()
        .chain(b.iter())
        .filter(|r| seen.insert(r.municipality_code.as_str()))
        .map(|r| r.municipality_code.clone())
        .collect()
}

// ── Year summary ──────────────────────────────────────────────────────────────

/// Headline metrics for the selected year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: u16,
    pub timber_total: f64,
    pub cattle_total: f64,
    pub municipalities_in_both: usize,
}

pub fn summarize_year(timber: &[ProductionRecord], cattle: &[ProductionRecord], year: u16) -> YearSummary {
    let y = year.to_string();
    let t = filter_by_year(timber, &y);
    let c = filter_by_year(cattle, &y);
    let both = municipalities_in_both(
        &municipalities_with_positive_value(&t),
        &municipalities_with_positive_value(&c),
    );
    YearSummary {
        year,
        timber_total: total_value(&t),
        cattle_total: total_value(&c),
        municipalities_in_both: both.len(),
    }
}
