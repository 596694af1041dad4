//! Municipality boundary geometry decoded from a GeoJSON feature collection.
//! Loaded once and only used by the rendering side.

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};
use crate::record::string_or_number;

/// A GeoJSON position. Altitude and any further members are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(v: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match v.as_slice() {
            [lon, lat, ..] => Ok(Position { lon: *lon, lat: *lat }),
            _ => Err(format!("position needs at least 2 members, got {}", v.len())),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lon, p.lat]
    }
}

pub type Ring = Vec<Position>;

/// Outer ring first, holes after, as in GeoJSON.
pub type Polygon = Vec<Ring>;

// ── GeoJSON wire shape ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    #[serde(rename = "CodIbge", deserialize_with = "string_or_number")]
    code: String,
    #[serde(rename = "Municipio", default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Polygon },
    MultiPolygon { coordinates: Vec<Polygon> },
    #[serde(other)]
    Unsupported,
}

// ── Public model ─────────────────────────────────────────────────────────────

/// One municipality boundary keyed by its code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityGeometry {
    pub code: String,
    pub name: Option<String>,
    pub polygons: Vec<Polygon>,
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// All municipality boundaries of the state, in feature order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeometryCollection {
    pub municipalities: Vec<MunicipalityGeometry>,
}

impl GeometryCollection {
    /// Decode a GeoJSON `FeatureCollection`. Features with geometry types
    /// other than (Multi)Polygon keep their code and name with no polygons.
    pub fn from_geojson_str(origin: &str, json: &str) -> Result<Self> {
        let fc: FeatureCollection = serde_json::from_str(json).map_err(|source| {
            HarvestError::Json { origin: origin.to_string(), source }
        })?;

        let municipalities = fc
            .features
            .into_iter()
            .map(|f| {
                let polygons = match f.geometry {
                    Some(Geometry::Polygon { coordinates }) => vec![coordinates],
                    Some(Geometry::MultiPolygon { coordinates }) => coordinates,
                    Some(Geometry::Unsupported) | None => Vec::new(),
                };
                MunicipalityGeometry {
                    code: f.properties.code,
                    name: f.properties.name,
                    polygons,
                }
            })
            .collect();

        Ok(Self { municipalities })
    }

    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.municipalities.iter().any(|m| m.code == code)
    }

    /// Bounding box over every vertex. `None` when there are no vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self
            .municipalities
            .iter()
            .flat_map(|m| m.polygons.iter())
            .flat_map(|p| p.iter())
            .flat_map(|r| r.iter());

        let first = points.next()?;
        let init = Bounds {
            min_lon: first.lon,
            max_lon: first.lon,
            min_lat: first.lat,
            max_lat: first.lat,
        };
        Some(points.fold(init, |b, p| Bounds {
            min_lon: b.min_lon.min(p.lon),
            max_lon: b.max_lon.max(p.lon),
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
        }))
    }
}
