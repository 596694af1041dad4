//! Dashboard configuration: year range, palettes, map and chart constants.
//! Defaults describe the Paraná timber/cattle dashboard.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Stroke drawn around every municipality polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub weight: f64,
    pub color: String,
    pub opacity: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { weight: 1.0, color: "#ffffff".to_string(), opacity: 1.0 }
    }
}

/// Everything tunable about the dashboard. Every field has a default so a
/// partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// First year of the slider range.
    pub base_year: u16,
    /// Number of consecutive years in the range.
    pub year_count: u16,
    /// Leaderboard length.
    pub top_n: usize,
    /// Raw values are divided by this for summary metrics and line series.
    pub value_divisor: f64,
    /// Fixed y-axis maximum of the "both productions" bar chart.
    pub bar_axis_max: u32,
    pub bar_axis_step: u32,
    /// Discrete palette for the combined index, low to high.
    pub combined_palette: Vec<String>,
    pub timber_color: String,
    pub cattle_color: String,
    pub stroke: StrokeStyle,
    /// Initial map view as (lat, lon).
    pub map_center: (f64, f64),
    pub map_zoom: u8,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_year: 2013,
            year_count: 10,
            top_n: 10,
            value_divisor: 1000.0,
            bar_axis_max: 400,
            bar_axis_step: 50,
            combined_palette: [
                "#ffffcc", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#0c2c84",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            timber_color: "#2c7a3e".to_string(),
            cattle_color: "#c44536".to_string(),
            stroke: StrokeStyle::default(),
            map_center: (-24.7, -51.5),
            map_zoom: 7,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file and validate it.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| HarvestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| HarvestError::Json {
            origin: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.year_count == 0 {
            return Err(invalid("year_count", "must be at least 1"));
        }
        if self.base_year.checked_add(self.year_count - 1).is_none() {
            return Err(invalid("year_count", "range overflows u16"));
        }
        if self.top_n == 0 {
            return Err(invalid("top_n", "must be at least 1"));
        }
        if !(self.value_divisor > 0.0) {
            return Err(invalid("value_divisor", "must be positive"));
        }
        if self.combined_palette.is_empty() {
            return Err(invalid("combined_palette", "needs at least one colour"));
        }
        Ok(())
    }

    /// The configured years, strictly ascending.
    pub fn years(&self) -> Vec<u16> {
        (0..self.year_count).map(|i| self.base_year + i).collect()
    }

    pub fn last_year(&self) -> u16 {
        self.base_year + self.year_count.saturating_sub(1)
    }

    pub fn contains_year(&self, year: u16) -> bool {
        year >= self.base_year && year <= self.last_year()
    }

    /// Palette entry at `idx`, clamped to the last colour.
    pub fn palette_color(&self, idx: usize) -> &str {
        let last = self.combined_palette.len().saturating_sub(1);
        self.combined_palette
            .get(idx.min(last))
            .map(String::as_str)
            .unwrap_or("#cccccc")
    }
}

fn invalid(field: &'static str, reason: &str) -> HarvestError {
    HarvestError::InvalidConfig { field, reason: reason.to_string() }
}
