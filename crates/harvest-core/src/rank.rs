//! Top-N leaderboards: one per dataset plus the combined ranking.
//!
//! All sorts are stable, so equal scores keep their encounter order.

use serde::Serialize;

use crate::aggregate::{union_codes, ValueLookup};
use crate::color::normalize;
use crate::format::{format_currency_thousands, format_percent};
use crate::map::UNKNOWN_NAME;
use crate::record::{Dataset, ProductionRecord};
use crate::store::YearView;

// ── Single metric ─────────────────────────────────────────────────────────────

/// Records sorted by value, descending. Callers truncate to their top N.
pub fn rank_single_metric<'a>(records: &[&'a ProductionRecord]) -> Vec<&'a ProductionRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked
}

// ── Combined ──────────────────────────────────────────────────────────────────

/// One municipality of the combined ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub code: String,
    pub name: String,
    /// `timber_norm + cattle_norm`, in [0, 2].
    pub score: f64,
    pub timber_value: f64,
    pub cattle_value: f64,
    pub timber_norm: f64,
    pub cattle_norm: f64,
}

/// Inputs of one combined ranking pass.
pub struct CombinedInputs<'v> {
    pub codes: &'v [String],
    pub timber: &'v ValueLookup,
    pub cattle: &'v ValueLookup,
    pub timber_max: f64,
    pub cattle_max: f64,
}

/// Score every code, sort descending by score and keep the first `top_n`.
/// `name_of` resolves display names; `None` becomes [`UNKNOWN_NAME`].
pub fn rank_combined<'n>(
    inputs: &CombinedInputs<'_>,
    name_of: impl Fn(&str) -> Option<&'n str>,
    top_n: usize,
) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = inputs
        .codes
        .iter()
        .map(|code| {
            let timber_value = inputs.timber.get(code);
            let cattle_value = inputs.cattle.get(code);
            let timber_norm = normalize(timber_value, inputs.timber_max);
            let cattle_norm = normalize(cattle_value, inputs.cattle_max);
            RankingEntry {
                code: code.clone(),
                name: name_of(code).unwrap_or(UNKNOWN_NAME).to_string(),
                score: timber_norm + cattle_norm,
                timber_value,
                cattle_value,
                timber_norm,
                cattle_norm,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(top_n);
    entries
}

/// Combined ranking over the union of both yearly views.
pub fn rank_combined_for_year(view: &YearView<'_>, top_n: usize) -> Vec<RankingEntry> {
    let codes = union_codes(&view.timber, &view.cattle);
    let inputs = CombinedInputs {
        codes: &codes,
        timber: &view.timber_lookup,
        cattle: &view.cattle_lookup,
        timber_max: view.timber_max,
        cattle_max: view.cattle_max,
    };
    rank_combined(&inputs, |code| view.name_of(code), top_n)
}

// ── Leaderboard rows ──────────────────────────────────────────────────────────

/// A rendered leaderboard line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    /// 1-based.
    pub position: usize,
    pub code: String,
    pub name: String,
    pub value: String,
    /// 1, 2 or 3 for the podium, else `None`.
    pub podium: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboards {
    pub timber: Vec<LeaderboardRow>,
    pub cattle: Vec<LeaderboardRow>,
    pub combined: Vec<LeaderboardRow>,
}

fn podium(position: usize) -> Option<u8> {
    (1..=3).contains(&position).then_some(position as u8)
}

pub fn single_metric_rows(records: &[&ProductionRecord], top_n: usize) -> Vec<LeaderboardRow> {
    rank_single_metric(records)
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, r)| LeaderboardRow {
            position: i + 1,
            code: r.municipality_code.clone(),
            name: if r.municipality_name.is_empty() {
                UNKNOWN_NAME.to_string()
            } else {
                r.municipality_name.clone()
            },
            value: format_currency_thousands(r.value),
            podium: podium(i + 1),
        })
        .collect()
}

/// `🌲 A% + 🥩 B% = S`, with S the raw [0, 2] score times 100.
pub fn combined_value_text(entry: &RankingEntry) -> String {
    format!(
        "{} {}% + {} {}% = {}",
        Dataset::Timber.glyph(),
        format_percent(entry.timber_norm),
        Dataset::Cattle.glyph(),
        format_percent(entry.cattle_norm),
        format_percent(entry.score),
    )
}

pub fn combined_rows(entries: &[RankingEntry]) -> Vec<LeaderboardRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| LeaderboardRow {
            position: i + 1,
            code: e.code.clone(),
            name: e.name.clone(),
            value: combined_value_text(e),
            podium: podium(i + 1),
        })
        .collect()
}

pub fn build_leaderboards(view: &YearView<'_>, top_n: usize) -> Leaderboards {
    Leaderboards {
        timber: single_metric_rows(view.records(Dataset::Timber), top_n),
        cattle: single_metric_rows(view.records(Dataset::Cattle), top_n),
        combined: combined_rows(&rank_combined_for_year(view, top_n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::to_lookup;

    fn rec(code: &str, value: f64) -> ProductionRecord {
        ProductionRecord::new("2013", code, &format!("M{code}"), value)
    }

    #[test]
    fn single_metric_is_descending_and_stable() {
        let recs = vec![rec("A", 5.0), rec("B", 9.0), rec("C", 5.0), rec("D", 1.0)];
        let refs: Vec<&ProductionRecord> = recs.iter().collect();
        let codes: Vec<&str> = rank_single_metric(&refs)
            .iter()
            .map(|r| r.municipality_code.as_str())
            .collect();
        assert_eq!(codes, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn combined_scores_sum_normalised_values() {
        let t = vec![rec("A", 100.0), rec("B", 50.0)];
        let c = vec![rec("A", 30.0), rec("C", 60.0)];
        let view = YearView::build(&t, &c, 2013);
        let ranked = rank_combined_for_year(&view, 10);

        let codes: Vec<&str> = ranked.iter().map(|e| e.code.as_str()).collect();
        // A: 1 + 0.5, C: 0 + 1, B: 0.5 + 0
        assert_eq!(codes, vec!["A", "C", "B"]);
        assert!((ranked[0].score - 1.5).abs() < 1e-12);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn combined_score_can_reach_two() {
        let t = vec![rec("A", 10.0)];
        let c = vec![rec("A", 10.0)];
        let view = YearView::build(&t, &c, 2013);
        let ranked = rank_combined_for_year(&view, 10);
        assert_eq!(ranked[0].score, 2.0);
        assert_eq!(combined_value_text(&ranked[0]), "🌲 100% + 🥩 100% = 200");
    }

    #[test]
    fn combined_truncates_and_keeps_ties_in_encounter_order() {
        let t: Vec<ProductionRecord> = (0..15).map(|i| rec(&format!("T{i:02}"), 10.0)).collect();
        let c: Vec<ProductionRecord> = Vec::new();
        let view = YearView::build(&t, &c, 2013);
        let ranked = rank_combined_for_year(&view, 10);
        assert_eq!(ranked.len(), 10);
        let expected: Vec<String> = (0..10).map(|i| format!("T{i:02}")).collect();
        let got: Vec<String> = ranked.into_iter().map(|e| e.code).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn unresolved_name_uses_placeholder() {
        let t = vec![rec("A", 1.0)];
        let refs: Vec<&ProductionRecord> = t.iter().collect();
        let lookup = to_lookup(&refs);
        let empty = ValueLookup::default();
        let codes = vec!["A".to_string(), "Q".to_string()];
        let inputs = CombinedInputs {
            codes: &codes,
            timber: &lookup,
            cattle: &empty,
            timber_max: 1.0,
            cattle_max: 0.0,
        };
        let ranked = rank_combined(&inputs, |_| None, 10);
        assert_eq!(ranked[0].name, UNKNOWN_NAME);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn single_metric_rows_cut_at_top_n_keeping_ties_in_order() {
        // nine distinct leaders, then three tied at 5.0 straddling the cut
        let mut t: Vec<ProductionRecord> = (1..=9).map(|i| rec(&format!("L{i}"), 100.0 - i as f64)).collect();
        t.extend(["X", "Y", "Z"].iter().map(|c| rec(c, 5.0)));
        t.push(rec("W", 1.0));
        let refs: Vec<&ProductionRecord> = t.iter().collect();

        let rows = single_metric_rows(&refs, 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].code, "L1");
        assert_eq!(rows[8].code, "L9");
        assert_eq!(rows[9].code, "X");
        assert_eq!(rows[9].position, 10);
        assert!(rows.iter().all(|r| r.code != "Y" && r.code != "Z" && r.code != "W"));
    }

    #[test]
    fn leaderboard_rows_mark_podium() {
        let t: Vec<ProductionRecord> = (1..=5).map(|i| rec(&i.to_string(), i as f64 * 1000.0)).collect();
        let c: Vec<ProductionRecord> = Vec::new();
        let view = YearView::build(&t, &c, 2013);
        let boards = build_leaderboards(&view, 10);
        assert_eq!(boards.timber.len(), 5);
        assert!(boards.cattle.is_empty());
        assert_eq!(boards.timber[0].name, "M5");
        assert_eq!(boards.timber[0].value, "R$ 5.000 mil");
        assert_eq!(boards.timber[0].podium, Some(1));
        assert_eq!(boards.timber[3].podium, None);
        assert_eq!(boards.combined[0].value, "🌲 100% + 🥩 0% = 100");
    }
}
