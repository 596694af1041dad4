//! The dashboard facade: immutable data plus configuration in, view-models out.
//!
//! A snapshot is rebuilt from scratch for every state. Panels are plain data
//! for the rendering side to draw; nothing here touches a renderer.

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{summarize_year, YearSummary};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::format::format_integer;
use crate::map::{try_build_map_layer, Legend, MapLayer};
use crate::rank::{build_leaderboards, Leaderboards};
use crate::series::{build_charts, Charts};
use crate::state::{DashboardState, Event, Invalidation, Tab};
use crate::store::DataStore;

/// Year summary with its display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPanel {
    #[serde(flatten)]
    pub summary: YearSummary,
    /// Totals ÷ value divisor, rounded and grouped.
    pub timber_display: String,
    pub cattle_display: String,
}

/// Every panel for one state. Absent panels were not requested or could
/// not be built (no geometry for the map).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: DashboardState,
    pub summary: Option<SummaryPanel>,
    pub map: Option<MapLayer>,
    pub legend: Option<Legend>,
    pub charts: Option<Charts>,
    pub rankings: Option<Leaderboards>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    store: DataStore,
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(store: DataStore, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn initial_state(&self) -> DashboardState {
        DashboardState::initial(&self.config)
    }

    pub fn summary(&self, year: u16) -> SummaryPanel {
        let summary = summarize_year(self.store.timber(), self.store.cattle(), year);
        SummaryPanel {
            timber_display: format_integer(summary.timber_total / self.config.value_divisor),
            cattle_display: format_integer(summary.cattle_total / self.config.value_divisor),
            summary,
        }
    }

    pub fn map(&self, state: &DashboardState) -> Option<MapLayer> {
        let view = self.store.year_view(state.year);
        try_build_map_layer(self.store.geometry(), &view, state.mode, &self.config)
    }

    pub fn legend(&self, state: &DashboardState) -> Legend {
        Legend::for_mode(state.mode, &self.config)
    }

    pub fn charts(&self) -> Charts {
        build_charts(self.store.timber(), self.store.cattle(), &self.config)
    }

    pub fn rankings(&self, year: u16) -> Leaderboards {
        build_leaderboards(&self.store.year_view(year), self.config.top_n)
    }

    /// Build the panels named by `which`. Charts are only built while the
    /// series tab is showing.
    pub fn build(&self, state: &DashboardState, which: Invalidation) -> Snapshot {
        debug!(?state, ?which, "building snapshot");
        Snapshot {
            state: *state,
            summary: which.summary.then(|| self.summary(state.year)),
            map: if which.map { self.map(state) } else { None },
            legend: which.map.then(|| self.legend(state)),
            charts: (which.charts && state.tab == Tab::Series).then(|| self.charts()),
            rankings: which.rankings.then(|| self.rankings(state.year)),
        }
    }

    /// Full snapshot for `state`.
    pub fn snapshot(&self, state: &DashboardState) -> Snapshot {
        self.build(state, Invalidation::ALL)
    }

    /// Reduce `event` and build only the panels it invalidated.
    pub fn dispatch(&self, state: &DashboardState, event: Event) -> Result<(DashboardState, Snapshot)> {
        let transition = state.reduce(event, &self.config)?;
        let snapshot = self.build(&transition.state, transition.invalidated);
        Ok((transition.state, snapshot))
    }
}
