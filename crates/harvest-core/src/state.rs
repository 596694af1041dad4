//! UI state as an immutable snapshot advanced by a pure reducer.
//!
//! `reduce` never mutates: it returns the next state together with the set
//! of panels that must be rebuilt from it.

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::error::{HarvestError, Result};
use crate::style::MapMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    #[serde(rename = "mapa", alias = "map")]
    Map,
    #[serde(rename = "series")]
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    pub year: u16,
    pub mode: MapMode,
    pub tab: Tab,
}

impl DashboardState {
    /// First year of the range, combined map, map tab.
    pub fn initial(config: &DashboardConfig) -> Self {
        Self { year: config.base_year, mode: MapMode::default(), tab: Tab::default() }
    }
}

/// A discrete user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Event {
    SelectYear(u16),
    SelectMode(MapMode),
    SwitchTab(Tab),
}

/// Which panels a transition invalidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Invalidation {
    pub summary: bool,
    pub map: bool,
    pub charts: bool,
    pub rankings: bool,
}

impl Invalidation {
    pub const ALL: Invalidation = Invalidation { summary: true, map: true, charts: true, rankings: true };

    pub fn is_empty(&self) -> bool {
        *self == Invalidation::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: DashboardState,
    pub invalidated: Invalidation,
}

impl DashboardState {
    /// Apply `event`. Years outside the configured range are rejected and the
    /// caller keeps the current state.
    pub fn reduce(&self, event: Event, config: &DashboardConfig) -> Result<Transition> {
        let mut next = *self;
        let mut invalidated = Invalidation::default();

        match event {
            Event::SelectYear(year) => {
                if !config.contains_year(year) {
                    return Err(HarvestError::YearOutOfRange {
                        year,
                        first: config.base_year,
                        last: config.last_year(),
                    });
                }
                next.year = year;
                invalidated = Invalidation {
                    summary: true,
                    map: true,
                    charts: self.tab == Tab::Series,
                    rankings: true,
                };
            }
            Event::SelectMode(mode) => {
                next.mode = mode;
                invalidated.map = mode != self.mode;
            }
            Event::SwitchTab(tab) => {
                next.tab = tab;
                invalidated.charts = tab == Tab::Series;
            }
        }

        Ok(Transition { state: next, invalidated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DashboardConfig {
        DashboardConfig::default()
    }

    #[test]
    fn initial_state() {
        let s = DashboardState::initial(&config());
        assert_eq!(s.year, 2013);
        assert_eq!(s.mode, MapMode::Combined);
        assert_eq!(s.tab, Tab::Map);
    }

    #[test]
    fn year_change_rebuilds_all_but_hidden_charts() {
        let s = DashboardState::initial(&config());
        let t = s.reduce(Event::SelectYear(2018), &config()).unwrap();
        assert_eq!(t.state.year, 2018);
        assert!(t.invalidated.summary && t.invalidated.map && t.invalidated.rankings);
        assert!(!t.invalidated.charts);
        // input state untouched
        assert_eq!(s.year, 2013);

        let on_series = DashboardState { tab: Tab::Series, ..s };
        let t = on_series.reduce(Event::SelectYear(2014), &config()).unwrap();
        assert_eq!(t.invalidated, Invalidation::ALL);
    }

    #[test]
    fn out_of_range_year_is_rejected() {
        let s = DashboardState::initial(&config());
        let err = s.reduce(Event::SelectYear(2030), &config()).unwrap_err();
        assert!(matches!(err, HarvestError::YearOutOfRange { year: 2030, first: 2013, last: 2022 }));
    }

    #[test]
    fn mode_change_only_touches_map() {
        let s = DashboardState::initial(&config());
        let t = s.reduce(Event::SelectMode(MapMode::CattleOnly), &config()).unwrap();
        assert_eq!(t.state.mode, MapMode::CattleOnly);
        assert_eq!(t.invalidated, Invalidation { map: true, ..Invalidation::default() });

        let same = t.state.reduce(Event::SelectMode(MapMode::CattleOnly), &config()).unwrap();
        assert!(same.invalidated.is_empty());
    }

    #[test]
    fn switching_to_series_builds_charts() {
        let s = DashboardState::initial(&config());
        let t = s.reduce(Event::SwitchTab(Tab::Series), &config()).unwrap();
        assert!(t.invalidated.charts);
        let back = t.state.reduce(Event::SwitchTab(Tab::Map), &config()).unwrap();
        assert!(back.invalidated.is_empty());
    }

    #[test]
    fn events_decode_from_tagged_json() {
        let e: Event = serde_json::from_str(r#"{"type":"select_year","value":2015}"#).unwrap();
        assert_eq!(e, Event::SelectYear(2015));
        let e: Event = serde_json::from_str(r#"{"type":"select_mode","value":"carne"}"#).unwrap();
        assert_eq!(e, Event::SelectMode(MapMode::CattleOnly));
        let e: Event = serde_json::from_str(r#"{"type":"switch_tab","value":"series"}"#).unwrap();
        assert_eq!(e, Event::SwitchTab(Tab::Series));
    }
}
