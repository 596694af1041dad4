/// Data audit tool: report duplicates, bad values, out-of-range years and
/// municipalities without a boundary, as a JSON array on stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use harvest_core::audit::{audit, audit_strict, Issue};
use harvest_core::loader::{load_all, DataSources};
use harvest_core::DashboardConfig;

#[derive(Parser, Debug)]
#[command(name = "validate_data", about = "Audit production records and municipality geometry")]
struct Args {
    /// Directory holding data/madeira.json, data/carne.json and mun_PR.json.
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Dashboard config JSON; its year range decides what counts as out of range.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit with an error when any issue is found.
    #[arg(long)]
    strict: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    Ok(match path {
        Some(p) => DashboardConfig::from_path(p)?,
        None => DashboardConfig::default(),
    })
}

/// Pretty JSON for stdout; the count goes to the log.
fn report(issues: &[Issue]) -> Result<String> {
    if issues.is_empty() {
        info!("no issues found");
    } else {
        warn!(count = issues.len(), "data issues found");
    }
    Ok(serde_json::to_string_pretty(issues)?)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let store = load_all(&DataSources::under(&args.root))
        .with_context(|| format!("loading data under {}", args.root.display()))?;

    let issues = audit(&store, &config);
    println!("{}", report(&issues)?);

    if args.strict {
        audit_strict(&store, &config)?;
    }
    Ok(())
}
