//! Map modes and per-municipality feature styles.

use serde::{Deserialize, Serialize};

use crate::color::{color_for_combined_index, color_for_single_metric, combined_index, normalize, Color};
use crate::config::DashboardConfig;
use crate::record::Dataset;
use crate::store::YearView;

/// Fill opacity of municipalities drawn in the no-production gray.
pub const MISSING_DATA_OPACITY: f64 = 0.5;
/// Fill opacity of every other municipality.
pub const FILLED_OPACITY: f64 = 0.7;

/// What the choropleth colours by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapMode {
    /// Mean of both normalised values, bucketed into the ILPF palette.
    #[default]
    #[serde(rename = "ilpf", alias = "combined")]
    Combined,
    #[serde(rename = "madeira", alias = "timber")]
    TimberOnly,
    #[serde(rename = "carne", alias = "cattle")]
    CattleOnly,
}

impl MapMode {
    pub const ALL: [MapMode; 3] = [MapMode::Combined, MapMode::TimberOnly, MapMode::CattleOnly];

    /// The single dataset a mode colours by, `None` for combined.
    pub fn dataset(self) -> Option<Dataset> {
        match self {
            MapMode::Combined => None,
            MapMode::TimberOnly => Some(Dataset::Timber),
            MapMode::CattleOnly => Some(Dataset::Cattle),
        }
    }

    /// Name used on the wire and in the UI select.
    pub fn wire_name(self) -> &'static str {
        match self {
            MapMode::Combined => "ilpf",
            MapMode::TimberOnly => "madeira",
            MapMode::CattleOnly => "carne",
        }
    }
}

impl std::str::FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MapMode::ALL
            .into_iter()
            .find(|m| m.wire_name() == s)
            .ok_or_else(|| format!("unknown map mode {s:?}; expected ilpf, madeira or carne"))
    }
}

/// Style handed to the map renderer for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub fill_color: Color,
    pub weight: f64,
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

/// Resolve the style of municipality `code` for the given year view and mode.
pub fn resolve_feature_style(code: &str, mode: MapMode, view: &YearView<'_>, config: &DashboardConfig) -> FeatureStyle {
    let (fill_color, fill_opacity) = match mode.dataset() {
        None => {
            let a = normalize(view.timber_lookup.get(code), view.timber_max);
            let b = normalize(view.cattle_lookup.get(code), view.cattle_max);
            let index = combined_index(a, b);
            (color_for_combined_index(index, &config.combined_palette), FILLED_OPACITY)
        }
        Some(dataset) => {
            let value = view.lookup(dataset).get(code);
            let color = color_for_single_metric(value, view.max(dataset), dataset);
            let opacity = if value > 0.0 { FILLED_OPACITY } else { MISSING_DATA_OPACITY };
            (color, opacity)
        }
    };

    FeatureStyle {
        fill_color,
        weight: config.stroke.weight,
        stroke_color: config.stroke.color.clone(),
        stroke_opacity: config.stroke.opacity,
        fill_opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProductionRecord;

    fn data() -> (Vec<ProductionRecord>, Vec<ProductionRecord>) {
        (
            vec![
                ProductionRecord::new("2013", "A", "Alfa", 100.0),
                ProductionRecord::new("2013", "B", "Beta", 50.0),
            ],
            vec![ProductionRecord::new("2013", "A", "Alfa", 30.0)],
        )
    }

    #[test]
    fn combined_mode_uses_palette_and_fixed_opacity() {
        let (t, c) = data();
        let view = YearView::build(&t, &c, 2013);
        let config = DashboardConfig::default();

        // A: (1 + 1) / 2 = 1 → last bucket.
        let a = resolve_feature_style("A", MapMode::Combined, &view, &config);
        assert_eq!(a.fill_color, Color::hex("#0c2c84"));
        assert_eq!(a.fill_opacity, FILLED_OPACITY);

        // Unknown municipality: index 0 → first bucket, still drawn.
        let z = resolve_feature_style("Z", MapMode::Combined, &view, &config);
        assert_eq!(z.fill_color, Color::hex("#ffffcc"));
        assert_eq!(z.fill_opacity, FILLED_OPACITY);
        assert_eq!(z.weight, 1.0);
        assert_eq!(z.stroke_color, "#ffffff");
    }

    #[test]
    fn single_mode_grays_out_missing_data() {
        let (t, c) = data();
        let view = YearView::build(&t, &c, 2013);
        let config = DashboardConfig::default();

        let b = resolve_feature_style("B", MapMode::CattleOnly, &view, &config);
        assert_eq!(b.fill_color.to_string(), "#f0f0f0");
        assert_eq!(b.fill_opacity, MISSING_DATA_OPACITY);

        let b = resolve_feature_style("B", MapMode::TimberOnly, &view, &config);
        assert_eq!(b.fill_color, Color::Rgb(44, 188, 62));
        assert_eq!(b.fill_opacity, FILLED_OPACITY);
    }

    #[test]
    fn mode_wire_names() {
        let m: MapMode = serde_json::from_str("\"ilpf\"").unwrap();
        assert_eq!(m, MapMode::Combined);
        assert_eq!(serde_json::to_string(&MapMode::TimberOnly).unwrap(), "\"madeira\"");
        for mode in MapMode::ALL {
            assert_eq!(mode.wire_name().parse::<MapMode>(), Ok(mode));
        }
        assert!("soja".parse::<MapMode>().is_err());
    }

    #[test]
    fn style_serialises_camel_case() {
        let (t, c) = data();
        let view = YearView::build(&t, &c, 2013);
        let s = resolve_feature_style("A", MapMode::TimberOnly, &view, &DashboardConfig::default());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["fillColor"], "rgb(44, 122, 62)");
        assert_eq!(json["strokeOpacity"], 1.0);
    }
}
