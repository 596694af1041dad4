//! Startup loading of the three data sources.
//!
//! Loading is all-or-nothing: if any source fails the whole load fails and
//! no partial store is produced. With the `threading` feature the three
//! reads run concurrently on the rayon pool.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{HarvestError, Result};
use crate::geometry::GeometryCollection;
use crate::record::ProductionRecord;
use crate::store::DataStore;

/// Where the three sources live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub timber: PathBuf,
    pub cattle: PathBuf,
    pub geometry: PathBuf,
}

impl DataSources {
    /// The dashboard's default layout under `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            timber: root.join("data/madeira.json"),
            cattle: root.join("data/carne.json"),
            geometry: root.join("mun_PR.json"),
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| HarvestError::Io { path: path.to_path_buf(), source })
}

/// Decode a JSON array of production records.
pub fn parse_records(origin: &str, json: &str) -> Result<Vec<ProductionRecord>> {
    serde_json::from_str(json).map_err(|source| HarvestError::Json { origin: origin.to_string(), source })
}

pub fn load_records(path: &Path) -> Result<Vec<ProductionRecord>> {
    parse_records(&path.display().to_string(), &read_text(path)?)
}

pub fn load_geometry(path: &Path) -> Result<GeometryCollection> {
    GeometryCollection::from_geojson_str(&path.display().to_string(), &read_text(path)?)
}

/// Build a store from already-fetched JSON documents.
pub fn store_from_json(timber: &str, cattle: &str, geojson: &str) -> Result<DataStore> {
    let timber = parse_records("timber records", timber)?;
    let cattle = parse_records("cattle records", cattle)?;
    let geometry = GeometryCollection::from_geojson_str("municipality geometry", geojson)?;
    Ok(finish(timber, cattle, geometry))
}

/// Load all three sources from disk.
pub fn load_all(sources: &DataSources) -> Result<DataStore> {
    let (timber, (cattle, geometry)) = fan_out(
        || load_records(&sources.timber),
        || fan_out(|| load_records(&sources.cattle), || load_geometry(&sources.geometry)),
    );
    Ok(finish(timber?, cattle?, geometry?))
}

fn finish(timber: Vec<ProductionRecord>, cattle: Vec<ProductionRecord>, geometry: GeometryCollection) -> DataStore {
    info!(
        timber = timber.len(),
        cattle = cattle.len(),
        municipalities = geometry.len(),
        "data loaded"
    );
    DataStore::new(timber, cattle, Some(geometry))
}

#[cfg(feature = "threading")]
fn fan_out<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "threading"))]
fn fan_out<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}
