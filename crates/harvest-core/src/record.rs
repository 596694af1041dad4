//! Raw per-municipality, per-year production records.
//!
//! Both datasets share one record shape. Field names on the wire follow the
//! published data files (`ano`, `cod_ibge`, `municipio`, `valor`).

use serde::{Deserialize, Deserializer, Serialize};

// ── Dataset kinds ─────────────────────────────────────────────────────────────

/// Which of the two production datasets a record or colour ramp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    #[serde(rename = "madeira", alias = "timber")]
    Timber,
    #[serde(rename = "carne", alias = "cattle")]
    Cattle,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Timber, Dataset::Cattle];

    /// Display label used in popups, legends and chart series.
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Timber => "Madeira",
            Dataset::Cattle => "Carne",
        }
    }

    /// Leaderboard glyph for the combined ranking.
    pub fn glyph(self) -> &'static str {
        match self {
            Dataset::Timber => "🌲",
            Dataset::Cattle => "🥩",
        }
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One (dataset, municipality, year) observation. Values are in R$ thousands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    #[serde(rename = "ano", deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(rename = "cod_ibge", deserialize_with = "string_or_number")]
    pub municipality_code: String,
    #[serde(rename = "municipio", default)]
    pub municipality_name: String,
    #[serde(rename = "valor")]
    pub value: f64,
}

impl ProductionRecord {
    pub fn new(year: &str, code: &str, name: &str, value: f64) -> Self {
        Self {
            year: year.to_string(),
            municipality_code: code.to_string(),
            municipality_name: name.to_string(),
            value,
        }
    }
}

// ── Serde helpers ─────────────────────────────────────────────────────────────

/// Accepts `"2013"` and `2013` alike. Some exports write codes and years as
/// numbers, the join logic compares them as strings.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
        Raw::Float(f) => f.to_string(),
    })
}
