//! `harvest`: build dashboard panels from the data files and print them as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use harvest_core::loader::{load_all, DataSources};
use harvest_core::{Dashboard, DashboardConfig, DashboardState, Event, MapMode, Tab};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "harvest", about = "Timber and cattle production dashboard panels as JSON")]
struct Cli {
    /// Directory holding data/madeira.json, data/carne.json and mun_PR.json
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Override the timber records file
    #[arg(long)]
    timber: Option<PathBuf>,

    /// Override the cattle records file
    #[arg(long)]
    cattle: Option<PathBuf>,

    /// Override the municipality GeoJSON file
    #[arg(long)]
    geometry: Option<PathBuf>,

    /// Dashboard config JSON (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct Selection {
    /// Year to show (defaults to the first year of the range)
    #[arg(short, long)]
    year: Option<u16>,

    /// Map mode: ilpf, madeira or carne
    #[arg(short, long, value_parser = parse_wire::<MapMode>, default_value = "ilpf")]
    mode: MapMode,

    /// Active tab: mapa or series
    #[arg(short, long, value_parser = parse_wire::<Tab>, default_value = "mapa")]
    tab: Tab,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Year totals and the count of municipalities producing both
    Summary(Selection),
    /// Styled map features with popups
    Map(Selection),
    /// Legend for the selected mode
    Legend(Selection),
    /// Decade line series and the both-productions bar chart
    Series,
    /// Top timber, cattle and combined leaderboards
    Rankings(Selection),
    /// Every panel for one state
    Snapshot(Selection),
    /// Apply a JSON array of events to the initial state and print the final snapshot
    Replay {
        /// File with `[{"type":"select_year","value":2015}, ...]`
        events: PathBuf,
    },
}

/// Parse a value by its serde wire name, e.g. `"carne"` for `MapMode::CattleOnly`.
fn parse_wire<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|e| e.to_string())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn sources(cli: &Cli) -> DataSources {
    let mut sources = DataSources::under(&cli.root);
    if let Some(p) = &cli.timber {
        sources.timber = p.clone();
    }
    if let Some(p) = &cli.cattle {
        sources.cattle = p.clone();
    }
    if let Some(p) = &cli.geometry {
        sources.geometry = p.clone();
    }
    sources
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(p) => DashboardConfig::from_path(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(DashboardConfig::default()),
    }
}

/// Resolve a selection into a state by running it through the reducer, so an
/// out-of-range year is rejected the same way the UI rejects it.
fn resolve_state(dashboard: &Dashboard, sel: &Selection) -> Result<DashboardState> {
    let mut state = dashboard.initial_state();
    let mut events = vec![Event::SelectMode(sel.mode), Event::SwitchTab(sel.tab)];
    if let Some(year) = sel.year {
        events.insert(0, Event::SelectYear(year));
    }
    for event in events {
        state = state.reduce(event, dashboard.config())?.state;
    }
    Ok(state)
}

fn replay(dashboard: &Dashboard, path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let events: Vec<Event> =
        serde_json::from_str(&text).with_context(|| format!("decoding events from {}", path.display()))?;
    let mut state = dashboard.initial_state();
    for (i, event) in events.into_iter().enumerate() {
        let (next, _) = dashboard.dispatch(&state, event).with_context(|| format!("event #{i}"))?;
        state = next;
    }
    to_json(&dashboard.snapshot(&state))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).context("serializing output")
}

fn run(dashboard: &Dashboard, command: &Command) -> Result<serde_json::Value> {
    match command {
        Command::Summary(sel) => to_json(&dashboard.summary(resolve_state(dashboard, sel)?.year)),
        Command::Map(sel) => {
            let state = resolve_state(dashboard, sel)?;
            let layer = dashboard.map(&state).context("no municipality geometry loaded")?;
            to_json(&layer)
        }
        Command::Legend(sel) => to_json(&dashboard.legend(&resolve_state(dashboard, sel)?)),
        Command::Series => to_json(&dashboard.charts()),
        Command::Rankings(sel) => to_json(&dashboard.rankings(resolve_state(dashboard, sel)?.year)),
        Command::Snapshot(sel) => to_json(&dashboard.snapshot(&resolve_state(dashboard, sel)?)),
        Command::Replay { events } => replay(dashboard, events),
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let store = load_all(&sources(&cli)).context("Erro ao carregar dados")?;
    let dashboard = Dashboard::new(store, config);

    let value = run(&dashboard, &cli.command)?;
    let text = serde_json::to_string_pretty(&value)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}
