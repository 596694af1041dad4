//! Normalisation and the fixed colour ramps of the choropleth.
//!
//! Combined mode buckets the mean of the two normalised values into the
//! discrete palette. Single-metric modes interpolate a dataset-specific ramp:
//!
//!   timber: rgb(44, 122 + 133·(1 − i), 62)
//!   cattle: hsl(6°, 56%, 100 − 45·i %)
//!
//! with `i = min(value / max, 1)`. Zero production is drawn in neutral gray.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::record::Dataset;

/// Fill for municipalities with no recorded production in single-metric mode.
pub const NO_PRODUCTION_GRAY: &str = "#f0f0f0";

const TIMBER_RED: u8 = 44;
const TIMBER_BLUE: u8 = 62;
const TIMBER_GREEN_DARK: f64 = 122.0;

const CATTLE_HUE: u16 = 6;
const CATTLE_SATURATION: u8 = 56;

// ── Colour value ──────────────────────────────────────────────────────────────

/// A CSS colour as produced by the ramps. Serialises to its CSS string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Hex(String),
    Rgb(u8, u8, u8),
    /// Hue in degrees, saturation and lightness in percent.
    Hsl(u16, u8, u8),
}

impl Color {
    pub fn hex(s: &str) -> Self {
        Color::Hex(s.to_string())
    }

    /// 8-bit RGB triple. Malformed hex strings map to black.
    pub fn to_rgb(&self) -> [u8; 3] {
        match *self {
            Color::Hex(ref s) => parse_hex(s).unwrap_or([0, 0, 0]),
            Color::Rgb(r, g, b) => [r, g, b],
            Color::Hsl(h, s, l) => hsl_to_rgb(h, s, l),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Hex(s) => f.write_str(s),
            Color::Rgb(r, g, b) => write!(f, "rgb({r}, {g}, {b})"),
            Color::Hsl(h, s, l) => write!(f, "hsl({h}, {s}%, {l}%)"),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_hex(s: &str) -> Option<[u8; 3]> {
    let h = s.strip_prefix('#')?;
    let expanded: String = match h.len() {
        3 => h.chars().flat_map(|c| [c, c]).collect(),
        6 => h.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn hsl_to_rgb(h: u16, s: u8, l: u8) -> [u8; 3] {
    let h = (h % 360) as f64 / 360.0;
    let s = s.min(100) as f64 / 100.0;
    let l = l.min(100) as f64 / 100.0;

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [
        (hue(h + 1.0 / 3.0) * 255.0).round() as u8,
        (hue(h) * 255.0).round() as u8,
        (hue(h - 1.0 / 3.0) * 255.0).round() as u8,
    ]
}

// ── Indices ───────────────────────────────────────────────────────────────────

/// `value / max` when `max > 0`, else 0.
pub fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

/// Mean of two normalised values.
pub fn combined_index(norm_a: f64, norm_b: f64) -> f64 {
    (norm_a + norm_b) / 2.0
}

/// Palette bucket for a combined index: `floor(index · len)`, clamped so an
/// index of exactly 1 lands in the last bucket.
pub fn combined_bucket(index: f64, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let raw = (index.max(0.0) * palette_len as f64).floor() as usize;
    raw.min(palette_len - 1)
}

pub fn color_for_combined_index(index: f64, palette: &[String]) -> Color {
    match palette.get(combined_bucket(index, palette.len())) {
        Some(c) => Color::hex(c),
        None => Color::hex(NO_PRODUCTION_GRAY),
    }
}

/// Ramp colour for one dataset. `max` is the year's maximum for that dataset.
pub fn color_for_single_metric(value: f64, max: f64, dataset: Dataset) -> Color {
    if value <= 0.0 {
        return Color::hex(NO_PRODUCTION_GRAY);
    }
    let intensity = normalize(value, max).min(1.0);
    match dataset {
        Dataset::Timber => {
            let green = (TIMBER_GREEN_DARK + (255.0 - TIMBER_GREEN_DARK) * (1.0 - intensity)).floor();
            Color::Rgb(TIMBER_RED, green as u8, TIMBER_BLUE)
        }
        Dataset::Cattle => {
            let lightness = (100.0 - 45.0 * intensity).floor();
            Color::Hsl(CATTLE_HUE, CATTLE_SATURATION, lightness as u8)
        }
    }
}
