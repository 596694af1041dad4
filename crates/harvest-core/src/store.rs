//! The immutable data store and the per-year view derived from it.

use tracing::debug;

use crate::aggregate::{filter_by_year, to_lookup, ValueLookup};
use crate::geometry::GeometryCollection;
use crate::record::{Dataset, ProductionRecord};

/// Raw collections, written once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    timber: Vec<ProductionRecord>,
    cattle: Vec<ProductionRecord>,
    geometry: Option<GeometryCollection>,
}

impl DataStore {
    pub fn new(
        timber: Vec<ProductionRecord>,
        cattle: Vec<ProductionRecord>,
        geometry: Option<GeometryCollection>,
    ) -> Self {
        Self { timber, cattle, geometry }
    }

    pub fn records(&self, dataset: Dataset) -> &[ProductionRecord] {
        match dataset {
            Dataset::Timber => &self.timber,
            Dataset::Cattle => &self.cattle,
        }
    }

    pub fn timber(&self) -> &[ProductionRecord] {
        &self.timber
    }

    pub fn cattle(&self) -> &[ProductionRecord] {
        &self.cattle
    }

    pub fn geometry(&self) -> Option<&GeometryCollection> {
        self.geometry.as_ref()
    }

    /// Fresh year-filtered view. Nothing is shared with earlier views.
    pub fn year_view(&self, year: u16) -> YearView<'_> {
        YearView::build(&self.timber, &self.cattle, year)
    }
}

/// One year's slice of both datasets with lookups and maxima.
#[derive(Debug, Clone)]
pub struct YearView<'a> {
    pub year: u16,
    pub timber: Vec<&'a ProductionRecord>,
    pub cattle: Vec<&'a ProductionRecord>,
    pub timber_lookup: ValueLookup,
    pub cattle_lookup: ValueLookup,
    pub timber_max: f64,
    pub cattle_max: f64,
}

impl<'a> YearView<'a> {
    pub fn build(timber: &'a [ProductionRecord], cattle: &'a [ProductionRecord], year: u16) -> Self {
        let y = year.to_string();
        let timber = filter_by_year(timber, &y);
        let cattle = filter_by_year(cattle, &y);
        let timber_lookup = to_lookup(&timber);
        let cattle_lookup = to_lookup(&cattle);
        let timber_max = timber_lookup.max_value();
        let cattle_max = cattle_lookup.max_value();

        debug!(
            year,
            timber = timber.len(),
            cattle = cattle.len(),
            timber_max,
            cattle_max,
            "year view rebuilt"
        );

        Self { year, timber, cattle, timber_lookup, cattle_lookup, timber_max, cattle_max }
    }

    pub fn records(&self, dataset: Dataset) -> &[&'a ProductionRecord] {
        match dataset {
            Dataset::Timber => &self.timber,
            Dataset::Cattle => &self.cattle,
        }
    }

    pub fn lookup(&self, dataset: Dataset) -> &ValueLookup {
        match dataset {
            Dataset::Timber => &self.timber_lookup,
            Dataset::Cattle => &self.cattle_lookup,
        }
    }

    pub fn max(&self, dataset: Dataset) -> f64 {
        match dataset {
            Dataset::Timber => self.timber_max,
            Dataset::Cattle => self.cattle_max,
        }
    }

    /// Name recorded for `code` this year: timber first, then cattle.
    pub fn name_of(&self, code: &str) -> Option<&'a str> {
        self.timber
            .iter()
            .chain(self.cattle.iter())
            .find(|r| r.municipality_code == code && !r.municipality_name.is_empty())
            .map(|r| r.municipality_name.as_str())
    }
}
