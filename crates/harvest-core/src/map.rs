//! Map layer view-model: one styled feature with popup per municipality,
//! plus the legend for the active mode.

use serde::Serialize;
use tracing::{debug, warn};

use crate::color::Color;
use crate::config::DashboardConfig;
use crate::format::format_currency_thousands;
use crate::geometry::GeometryCollection;
use crate::record::Dataset;
use crate::store::YearView;
use crate::style::{resolve_feature_style, FeatureStyle, MapMode};

/// Placeholder for municipalities without a usable name.
pub const UNKNOWN_NAME: &str = "Unknown";

// ── Popup ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl Popup {
    pub fn build(name: &str, mode: MapMode, timber: f64, cattle: f64) -> Self {
        let lines = match mode {
            MapMode::Combined => vec![
                format!("{}: {}", Dataset::Timber.label(), format_currency_thousands(timber)),
                format!("{}: {}", Dataset::Cattle.label(), format_currency_thousands(cattle)),
            ],
            MapMode::TimberOnly => vec![format!("Valor: {}", format_currency_thousands(timber))],
            MapMode::CattleOnly => vec![format!("Valor: {}", format_currency_thousands(cattle))],
        };
        Self { title: name.to_string(), lines }
    }

    /// `<strong>title</strong><br>line<br>line`, names HTML-escaped.
    pub fn to_html(&self) -> String {
        let mut html = format!("<strong>{}</strong><br>", escape_html(&self.title));
        html.push_str(&self.lines.join("<br>"));
        html
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ── Legend ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub color: Color,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub items: Vec<LegendItem>,
}

impl Legend {
    pub fn for_mode(mode: MapMode, config: &DashboardConfig) -> Self {
        let item = |color: &str, label: &str| LegendItem { color: Color::hex(color), label: label.to_string() };
        match mode {
            MapMode::Combined => {
                let last = config.combined_palette.len().saturating_sub(1);
                Self {
                    title: "Índice ILPF".to_string(),
                    items: vec![
                        item(config.palette_color(0), "Baixo"),
                        item(config.palette_color(last / 2), "Médio"),
                        item(config.palette_color(last), "Alto"),
                    ],
                }
            }
            MapMode::TimberOnly => Self {
                title: "Valor - Madeira (R$ mil)".to_string(),
                items: vec![item("#a6d96a", "Baixo"), item(&config.timber_color, "Alto")],
            },
            MapMode::CattleOnly => Self {
                title: "Valor - Carne (R$ mil)".to_string(),
                items: vec![item("#fc8d59", "Baixo"), item(&config.cattle_color, "Alto")],
            },
        }
    }
}

// ── View ──────────────────────────────────────────────────────────────────────

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// (lat, lon)
    pub center: (f64, f64),
    pub zoom: u8,
}

impl MapView {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self { center: config.map_center, zoom: config.map_zoom }
    }
}

// ── Layer ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureView {
    pub code: String,
    pub name: String,
    pub style: FeatureStyle,
    pub popup: Popup,
    pub popup_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub year: u16,
    pub mode: MapMode,
    pub view: MapView,
    pub features: Vec<FeatureView>,
    pub legend: Legend,
}

/// Style and popup for every feature of `geometry`, in feature order.
pub fn build_map_layer(
    geometry: &GeometryCollection,
    view: &YearView<'_>,
    mode: MapMode,
    config: &DashboardConfig,
) -> MapLayer {
    let features = geometry
        .municipalities
        .iter()
        .map(|m| {
            let name = m.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(UNKNOWN_NAME);
            let popup = Popup::build(
                name,
                mode,
                view.timber_lookup.get(&m.code),
                view.cattle_lookup.get(&m.code),
            );
            FeatureView {
                code: m.code.clone(),
                name: name.to_string(),
                style: resolve_feature_style(&m.code, mode, view, config),
                popup_html: popup.to_html(),
                popup,
            }
        })
        .collect::<Vec<_>>();

    debug!(year = view.year, ?mode, features = features.len(), "map layer built");

    MapLayer {
        year: view.year,
        mode,
        view: MapView::from_config(config),
        features,
        legend: Legend::for_mode(mode, config),
    }
}

/// As [`build_map_layer`], but a missing geometry skips the map update with a
/// warning instead of failing the dashboard.
pub fn try_build_map_layer(
    geometry: Option<&GeometryCollection>,
    view: &YearView<'_>,
    mode: MapMode,
    config: &DashboardConfig,
) -> Option<MapLayer> {
    match geometry {
        Some(g) => Some(build_map_layer(g, view, mode, config)),
        None => {
            warn!(year = view.year, "no municipality geometry loaded; skipping map update");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MunicipalityGeometry;
    use crate::record::ProductionRecord;

    fn geometry() -> GeometryCollection {
        GeometryCollection {
            municipalities: vec![
                MunicipalityGeometry { code: "A".into(), name: Some("Alfa".into()), polygons: Vec::new() },
                MunicipalityGeometry { code: "Z".into(), name: None, polygons: Vec::new() },
            ],
        }
    }

    #[test]
    fn combined_popup_lists_both_values() {
        let p = Popup::build("Alfa", MapMode::Combined, 1500.5, 0.0);
        assert_eq!(p.lines, vec!["Madeira: R$ 1.500,5 mil", "Carne: R$ 0 mil"]);
        assert_eq!(
            p.to_html(),
            "<strong>Alfa</strong><br>Madeira: R$ 1.500,5 mil<br>Carne: R$ 0 mil"
        );
    }

    #[test]
    fn single_popup_has_one_value_line() {
        let p = Popup::build("Beta", MapMode::CattleOnly, 10.0, 20.0);
        assert_eq!(p.lines, vec!["Valor: R$ 20 mil"]);
    }

    #[test]
    fn popup_escapes_names() {
        let p = Popup::build("<b>&", MapMode::TimberOnly, 0.0, 0.0);
        assert!(p.to_html().starts_with("<strong>&lt;b&gt;&amp;</strong>"));
    }

    #[test]
    fn legend_for_combined_uses_palette_ends_and_middle() {
        let legend = Legend::for_mode(MapMode::Combined, &DashboardConfig::default());
        let colors: Vec<String> = legend.items.iter().map(|i| i.color.to_string()).collect();
        assert_eq!(colors, vec!["#ffffcc", "#41b6c4", "#0c2c84"]);
        assert_eq!(legend.title, "Índice ILPF");
    }

    #[test]
    fn layer_covers_every_feature_and_names_unknowns() {
        let t = vec![ProductionRecord::new("2013", "A", "Alfa", 10.0)];
        let c: Vec<ProductionRecord> = Vec::new();
        let view = YearView::build(&t, &c, 2013);
        let layer = build_map_layer(&geometry(), &view, MapMode::TimberOnly, &DashboardConfig::default());
        assert_eq!(layer.features.len(), 2);
        assert_eq!(layer.features[1].name, UNKNOWN_NAME);
        assert_eq!(layer.features[1].style.fill_opacity, crate::style::MISSING_DATA_OPACITY);
    }

    #[test]
    fn layer_carries_configured_viewport() {
        let t: Vec<ProductionRecord> = Vec::new();
        let view = YearView::build(&t, &t, 2013);
        let config = DashboardConfig { map_center: (-25.4, -49.3), map_zoom: 9, ..DashboardConfig::default() };
        let layer = build_map_layer(&geometry(), &view, MapMode::Combined, &config);
        assert_eq!(layer.view, MapView { center: (-25.4, -49.3), zoom: 9 });

        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["view"]["center"], serde_json::json!([-25.4, -49.3]));
        assert_eq!(json["view"]["zoom"], 9);
    }

    #[test]
    fn missing_geometry_skips_layer() {
        let t: Vec<ProductionRecord> = Vec::new();
        let view = YearView::build(&t, &t, 2013);
        assert!(try_build_map_layer(None, &view, MapMode::Combined, &DashboardConfig::default()).is_none());
    }
}
