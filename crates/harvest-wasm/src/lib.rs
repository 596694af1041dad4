//! Browser bindings for the dashboard core.
//!
//! The page hands user events in and gets plain view-model objects back; the
//! map, chart and leaderboard widgets draw them.

use anyhow::{anyhow, Context};
use futures_util::future::try_join3;
use gloo_net::http::Request;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use harvest_core::loader::store_from_json;
use harvest_core::map::MapView;
use harvest_core::{Dashboard, DashboardConfig, DashboardState, Event, Snapshot};

/// Shown to the user when startup loading fails.
const LOAD_FAILED_NOTICE: &str =
    "Erro ao carregar dados. Verifique se os arquivos JSON estão no diretório correto.";

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

fn to_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("serialization failed: {e}")))
}

fn parse_config(config_json: Option<String>) -> anyhow::Result<DashboardConfig> {
    let Some(json) = config_json else {
        return Ok(DashboardConfig::default());
    };
    let config: DashboardConfig = serde_json::from_str(&json).context("invalid dashboard config")?;
    config.validate()?;
    Ok(config)
}

fn warn_if_map_skipped(snapshot: &Snapshot, map_requested: bool) {
    if map_requested && snapshot.map.is_none() {
        web_sys::console::warn_1(&JsValue::from_str("municipality geometry missing; map not updated"));
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Loaded data plus the current UI state.
#[wasm_bindgen]
pub struct DashboardHandle {
    dashboard: Dashboard,
    state: DashboardState,
}

#[wasm_bindgen]
impl DashboardHandle {
    /// Build from already-fetched JSON documents.
    #[wasm_bindgen(constructor)]
    pub fn new(
        timber_json: &str,
        cattle_json: &str,
        geojson: &str,
        config_json: Option<String>,
    ) -> Result<DashboardHandle, JsValue> {
        let config = parse_config(config_json).map_err(to_js)?;
        let store = store_from_json(timber_json, cattle_json, geojson)
            .context(LOAD_FAILED_NOTICE)
            .map_err(to_js)?;
        Ok(Self::from_parts(Dashboard::new(store, config)))
    }

    fn from_parts(dashboard: Dashboard) -> Self {
        let state = dashboard.initial_state();
        Self { dashboard, state }
    }

    /// Current `{ year, mode, tab }`.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_value(&self.state)
    }

    /// The selectable years, ascending.
    pub fn years(&self) -> Vec<u16> {
        self.dashboard.config().years()
    }

    /// Initial `{ center: [lat, lon], zoom }` for opening the map.
    #[wasm_bindgen(js_name = mapView)]
    pub fn map_view(&self) -> Result<JsValue, JsValue> {
        to_value(&MapView::from_config(self.dashboard.config()))
    }

    /// Every panel for the current state.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.dashboard.snapshot(&self.state);
        warn_if_map_skipped(&snapshot, true);
        to_value(&snapshot)
    }

    /// Apply a `{ type, value }` event. On success the state advances and
    /// the rebuilt panels are returned; on error the state is unchanged.
    pub fn dispatch(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: Event = serde_wasm_bindgen::from_value(event)
            .map_err(|e| JsValue::from_str(&format!("invalid event: {e}")))?;
        let (next, snapshot) = self
            .dashboard
            .dispatch(&self.state, event)
            .map_err(|e| to_js(e.into()))?;
        self.state = next;
        warn_if_map_skipped(&snapshot, matches!(event, Event::SelectYear(_) | Event::SelectMode(_)));
        to_value(&snapshot)
    }
}

// ── Startup fetch ─────────────────────────────────────────────────────────────

/// `path` under `base`. An empty base stays page-relative.
fn source_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    format!("{}/{path}", base.trim_end_matches('/'))
}

async fn fetch_text(url: String) -> anyhow::Result<String> {
    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| anyhow!("request for {url} failed: {e}"))?;
    if !resp.ok() {
        return Err(anyhow!("{url} returned HTTP {}", resp.status()));
    }
    resp.text().await.map_err(|e| anyhow!("reading {url} failed: {e}"))
}

/// Fetch the three sources concurrently from `base_url` and build a handle.
/// Any failed fetch fails the whole load.
#[wasm_bindgen(js_name = loadDashboard)]
pub async fn load_dashboard(base_url: String, config_json: Option<String>) -> Result<DashboardHandle, JsValue> {
    let started = js_sys::Date::now();
    let config = parse_config(config_json).map_err(to_js)?;
    let (timber, cattle, geo) = try_join3(
        fetch_text(source_url(&base_url, "data/madeira.json")),
        fetch_text(source_url(&base_url, "data/carne.json")),
        fetch_text(source_url(&base_url, "mun_PR.json")),
    )
    .await
    .context(LOAD_FAILED_NOTICE)
    .map_err(to_js)?;

    let store = store_from_json(&timber, &cattle, &geo)
        .context(LOAD_FAILED_NOTICE)
        .map_err(to_js)?;

    web_sys::console::log_1(&JsValue::from_str(&format!(
        "dashboard data loaded in {:.0} ms ({} timber, {} cattle records)",
        js_sys::Date::now() - started,
        store.timber().len(),
        store.cattle().len(),
    )));

    Ok(DashboardHandle::from_parts(Dashboard::new(store, config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let c = parse_config(None).unwrap();
        assert_eq!(c, DashboardConfig::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(parse_config(Some("{\"top_n\": 0}".into())).is_err());
        assert!(parse_config(Some("not json".into())).is_err());
        let c = parse_config(Some("{\"top_n\": 3}".into())).unwrap();
        assert_eq!(c.top_n, 3);
    }

    #[test]
    fn empty_base_fetches_page_relative() {
        assert_eq!(source_url("", "data/madeira.json"), "data/madeira.json");
        assert_eq!(source_url("/", "mun_PR.json"), "/mun_PR.json");
        assert_eq!(source_url("dash/", "data/carne.json"), "dash/data/carne.json");
        assert_eq!(source_url("https://x.org/pr", "mun_PR.json"), "https://x.org/pr/mun_PR.json");
    }
}
