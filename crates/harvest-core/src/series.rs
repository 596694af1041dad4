//! Chart series over the configured year range.

use serde::Serialize;

use crate::aggregate::{count_municipalities_in_both_by_year, sum_by_year};
use crate::config::DashboardConfig;
use crate::record::{Dataset, ProductionRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: String,
    pub color: String,
    pub values: Vec<f64>,
}

/// Yearly totals of both datasets, in raw value ÷ `value_divisor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesChart {
    pub labels: Vec<String>,
    pub timber: LineSeries,
    pub cattle: LineSeries,
}

/// Per-year count of municipalities producing both, on a fixed y axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BothProductionChart {
    pub labels: Vec<String>,
    pub label: String,
    pub color: String,
    pub counts: Vec<usize>,
    /// `counts` clipped to `axis_max`, as drawn.
    pub displayed_counts: Vec<usize>,
    pub axis_max: u32,
    pub axis_step: u32,
}

fn cap_counts(counts: &[usize], axis_max: u32) -> Vec<usize> {
    counts.iter().map(|&c| c.min(axis_max as usize)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub totals: TimeSeriesChart,
    pub both: BothProductionChart,
}

fn year_labels(config: &DashboardConfig) -> Vec<String> {
    config.years().iter().map(u16::to_string).collect()
}

pub fn build_time_series(
    timber: &[ProductionRecord],
    cattle: &[ProductionRecord],
    config: &DashboardConfig,
) -> TimeSeriesChart {
    let labels = year_labels(config);
    let line = |dataset: Dataset, records: &[ProductionRecord], color: &str| {
        let totals = sum_by_year(records);
        LineSeries {
            label: dataset.label().to_string(),
            color: color.to_string(),
            values: labels
                .iter()
                .map(|y| totals.get(y).copied().unwrap_or(0.0) / config.value_divisor)
                .collect(),
        }
    };
    TimeSeriesChart {
        timber: line(Dataset::Timber, timber, &config.timber_color),
        cattle: line(Dataset::Cattle, cattle, &config.cattle_color),
        labels,
    }
}

pub fn build_both_production_chart(
    timber: &[ProductionRecord],
    cattle: &[ProductionRecord],
    config: &DashboardConfig,
) -> BothProductionChart {
    let last = config.combined_palette.len().saturating_sub(1);
    let counts = count_municipalities_in_both_by_year(timber, cattle, &config.years());
    BothProductionChart {
        labels: year_labels(config),
        label: "Municípios com ambas produções".to_string(),
        color: config.palette_color(last.saturating_sub(1)).to_string(),
        displayed_counts: cap_counts(&counts, config.bar_axis_max),
        counts,
        axis_max: config.bar_axis_max,
        axis_step: config.bar_axis_step,
    }
}

pub fn build_charts(timber: &[ProductionRecord], cattle: &[ProductionRecord], config: &DashboardConfig) -> Charts {
    Charts {
        totals: build_time_series(timber, cattle, config),
        both: build_both_production_chart(timber, cattle, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rec(year: &str, code: &str, value: f64) -> ProductionRecord {
        ProductionRecord::new(year, code, code, value)
    }

    #[test]
    fn totals_cover_every_year_in_thousands() {
        let t = vec![rec("2013", "A", 1500.0), rec("2013", "B", 500.0), rec("2022", "A", 250.0)];
        let c = vec![rec("2015", "A", 3000.0), rec("1999", "A", 1e9)];
        let chart = build_time_series(&t, &c, &DashboardConfig::default());

        assert_eq!(chart.labels.len(), 10);
        assert_eq!(chart.labels[0], "2013");
        assert_relative_eq!(chart.timber.values[0], 2.0);
        assert_relative_eq!(chart.timber.values[9], 0.25);
        assert_eq!(chart.timber.values[1], 0.0);
        assert_relative_eq!(chart.cattle.values[2], 3.0);
        assert_eq!(chart.cattle.values.iter().filter(|&&v| v > 0.0).count(), 1);
        assert_eq!(chart.timber.color, "#2c7a3e");
        assert_eq!(chart.cattle.label, "Carne");
    }

    #[test]
    fn both_chart_counts_per_year_with_palette_colour() {
        let t = vec![rec("2013", "A", 1.0), rec("2014", "A", 1.0), rec("2014", "B", 1.0)];
        let c = vec![rec("2013", "A", 1.0), rec("2014", "A", 1.0), rec("2014", "B", 1.0)];
        let chart = build_both_production_chart(&t, &c, &DashboardConfig::default());
        assert_eq!(&chart.counts[..3], &[1, 2, 0]);
        assert_eq!(chart.color, "#225ea8");
        assert_eq!(chart.axis_max, 400);
        assert_eq!(chart.axis_step, 50);
    }

    #[test]
    fn displayed_counts_are_capped_at_axis_max() {
        assert_eq!(cap_counts(&[399, 512, 0], 400), vec![399, 400, 0]);

        let t: Vec<ProductionRecord> = (0..5).map(|i| rec("2013", &i.to_string(), 1.0)).collect();
        let config = DashboardConfig { bar_axis_max: 3, ..DashboardConfig::default() };
        let chart = build_both_production_chart(&t, &t, &config);
        assert_eq!(chart.counts[0], 5);
        assert_eq!(chart.displayed_counts[0], 3);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["displayed_counts"][0], 3);
    }
}
