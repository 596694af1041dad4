//! Static choropleth renderer: draws one year/mode of the dashboard map to a
//! PNG using the same feature styles the interactive map receives.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::{Rgb, RgbImage};
use tracing::info;
use tracing_subscriber::EnvFilter;

use harvest_core::color::Color;
use harvest_core::geometry::{Bounds, Position, Ring};
use harvest_core::loader::{load_all, DataSources};
use harvest_core::style::resolve_feature_style;
use harvest_core::{DashboardConfig, DashboardState, Event, MapMode};

const BACKGROUND: [u8; 3] = [255, 255, 255];
/// Blank border around the state, in pixels.
const MARGIN: f64 = 8.0;

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Render the municipality choropleth for one year and mode to PNG")]
struct Args {
    /// Directory holding data/madeira.json, data/carne.json and mun_PR.json
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Dashboard config JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    year: Option<u16>,

    /// ilpf, madeira or carne
    #[arg(short, long, default_value = "ilpf")]
    mode: MapMode,

    /// Image width in pixels; height follows the state's aspect ratio
    #[arg(long, default_value = "1200")]
    width: u32,

    #[arg(short, long, default_value = "data/debug/choropleth.png")]
    output: PathBuf,
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Equirectangular projection with longitude scaled by cos(mid latitude).
struct Projection {
    bounds: Bounds,
    scale: f64,
    lon_factor: f64,
}

impl Projection {
    fn fit(bounds: Bounds, width: u32) -> (Self, u32) {
        let mid_lat = (bounds.min_lat + bounds.max_lat) / 2.0;
        let lon_factor = mid_lat.to_radians().cos();
        let span_x = ((bounds.max_lon - bounds.min_lon) * lon_factor).max(f64::EPSILON);
        let span_y = (bounds.max_lat - bounds.min_lat).max(f64::EPSILON);
        let scale = (width as f64 - 2.0 * MARGIN) / span_x;
        let height = (span_y * scale + 2.0 * MARGIN).ceil() as u32;
        (Self { bounds, scale, lon_factor }, height.max(1))
    }

    fn project(&self, p: Position) -> (f64, f64) {
        let x = MARGIN + (p.lon - self.bounds.min_lon) * self.lon_factor * self.scale;
        let y = MARGIN + (self.bounds.max_lat - p.lat) * self.scale;
        (x, y)
    }
}

// ── Raster helpers ────────────────────────────────────────────────────────────

fn blend(over: [u8; 3], under: [u8; 3], alpha: f64) -> [u8; 3] {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |o: u8, u: u8| (o as f64 * a + u as f64 * (1.0 - a)).round() as u8;
    [mix(over[0], under[0]), mix(over[1], under[1]), mix(over[2], under[2])]
}

/// Even-odd scanline fill over all rings of one municipality, so holes stay
/// unfilled. Calls `plot(x, y)` for every covered pixel centre.
fn fill_rings(rings: &[Vec<(f64, f64)>], width: u32, height: u32, mut plot: impl FnMut(u32, u32)) {
    let (lo, hi) = rings
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if !lo.is_finite() {
        return;
    }
    let first = lo.floor().max(0.0) as u32;
    let last = (hi.ceil() as i64).clamp(0, height as i64 - 1) as u32;

    let mut crossings = Vec::new();
    for row in first..=last {
        let y = row as f64 + 0.5;
        crossings.clear();
        for ring in rings {
            for (i, &(x0, y0)) in ring.iter().enumerate() {
                let (x1, y1) = ring[(i + 1) % ring.len()];
                if (y0 <= y) != (y1 <= y) {
                    crossings.push(x0 + (y - y0) / (y1 - y0) * (x1 - x0));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let start = (pair[0] - 0.5).ceil().max(0.0) as u32;
            let end = (pair[1] - 0.5).floor().min(width as f64 - 1.0);
            if end < 0.0 {
                continue;
            }
            for col in start..=end as u32 {
                plot(col, row);
            }
        }
    }
}

/// Bresenham line, clipped to the image.
fn draw_line(img: &mut RgbImage, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: [u8; 3], alpha: f64) {
    let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
    let (xe, ye) = (x1.round() as i64, y1.round() as i64);
    let dx = (xe - x).abs();
    let dy = -(ye - y).abs();
    let sx = if x < xe { 1 } else { -1 };
    let sy = if y < ye { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            let px = img.get_pixel_mut(x as u32, y as u32);
            *px = Rgb(blend(color, px.0, alpha));
        }
        if x == xe && y == ye {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn projected(proj: &Projection, ring: &Ring) -> Vec<(f64, f64)> {
    ring.iter().map(|&p| proj.project(p)).collect()
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = match &args.config {
        Some(p) => DashboardConfig::from_path(p)?,
        None => DashboardConfig::default(),
    };
    let store = load_all(&DataSources::under(&args.root)).context("loading dashboard data")?;
    let Some(geometry) = store.geometry() else {
        bail!("no municipality geometry loaded");
    };
    let Some(bounds) = geometry.bounds() else {
        bail!("municipality geometry has no vertices");
    };

    let mut state = DashboardState::initial(&config);
    if let Some(year) = args.year {
        state = state.reduce(Event::SelectYear(year), &config)?.state;
    }

    let (proj, height) = Projection::fit(bounds, args.width);
    let mut img = RgbImage::from_pixel(args.width, height, Rgb(BACKGROUND));
    let view = store.year_view(state.year);
    let stroke = Color::hex(&config.stroke.color).to_rgb();

    for municipality in &geometry.municipalities {
        let style = resolve_feature_style(&municipality.code, args.mode, &view, &config);
        let fill = style.fill_color.to_rgb();
        for polygon in &municipality.polygons {
            let rings: Vec<_> = polygon.iter().map(|r| projected(&proj, r)).collect();
            fill_rings(&rings, args.width, height, |x, y| {
                let px = img.get_pixel_mut(x, y);
                *px = Rgb(blend(fill, px.0, style.fill_opacity));
            });
            for ring in &rings {
                for (i, &a) in ring.iter().enumerate() {
                    draw_line(&mut img, a, ring[(i + 1) % ring.len()], stroke, style.stroke_opacity);
                }
            }
        }
    }

    if let Some(dir) = args.output.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    img.save(&args.output).with_context(|| format!("saving {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        municipalities = geometry.len(),
        year = state.year,
        mode = args.mode.wire_name(),
        "wrote choropleth"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend([0, 0, 0], [255, 255, 255], 1.0), [0, 0, 0]);
        assert_eq!(blend([0, 0, 0], [255, 255, 255], 0.0), [255, 255, 255]);
        assert_eq!(blend([0, 0, 0], [200, 100, 50], 0.5), [100, 50, 25]);
    }

    #[test]
    fn projection_keeps_north_up() {
        let b = Bounds { min_lon: -54.0, max_lon: -48.0, min_lat: -27.0, max_lat: -22.0 };
        let (proj, height) = Projection::fit(b, 400);
        let (_, y_north) = proj.project(Position { lon: -50.0, lat: -22.0 });
        let (_, y_south) = proj.project(Position { lon: -50.0, lat: -27.0 });
        assert!(y_north < y_south);
        assert!(y_south <= height as f64);
        let (x_west, _) = proj.project(Position { lon: -54.0, lat: -25.0 });
        assert_eq!(x_west, MARGIN);
    }

    #[test]
    fn even_odd_fill_leaves_hole() {
        let outer = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let hole = vec![(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)];
        let mut covered = std::collections::HashSet::new();
        fill_rings(&[outer, hole], 10, 10, |x, y| {
            covered.insert((x, y));
        });
        assert!(covered.contains(&(1, 1)));
        assert!(covered.contains(&(8, 5)));
        assert!(!covered.contains(&(5, 5)));
        assert_eq!(covered.len(), 100 - 16);
    }

    #[test]
    fn args_parse_mode() {
        let args = Args::try_parse_from(["visualize", "--mode", "carne", "--year", "2016"]).unwrap();
        assert_eq!(args.mode, MapMode::CattleOnly);
        assert!(Args::try_parse_from(["visualize", "--mode", "soja"]).is_err());
    }
}
