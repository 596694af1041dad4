//! Aggregation, scoring and ranking core of the Paraná timber and cattle
//! production dashboard.
//!
//! Raw per-municipality records go in; map styles, chart series and
//! leaderboards come out as serialisable view-models.

pub mod aggregate;
pub mod audit;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod geometry;
pub mod loader;
pub mod map;
pub mod rank;
pub mod record;
pub mod series;
pub mod state;
pub mod store;
pub mod style;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Snapshot};
pub use error::{HarvestError, Result};
pub use record::{Dataset, ProductionRecord};
pub use state::{DashboardState, Event, Tab};
pub use store::DataStore;
pub use style::MapMode;
