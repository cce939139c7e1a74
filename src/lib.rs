// Geo Metrics - Core Library
// Geographic metrics engine behind the institution-analytics dashboard.
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod entities;     // GeoEntity data model
pub mod names;        // Name normalization + composite keys
pub mod store;        // Lookup indices over the entity list
pub mod aggregation;  // State-level rollups
pub mod classifier;   // Intensity → visual bucket
pub mod map;          // Geometry name resolution + fill styles
pub mod selection;    // View mode / drill-down reducer
pub mod ranking;      // Top-N table + summary metrics
pub mod provider;     // CSV / JSON ingestion + validation
pub mod db;           // SQLite persistence
pub mod config;       // File + environment configuration
pub mod dashboard;    // Stateful seat around the reducer

// Re-export commonly used types
pub use error::MetricsError;
pub use entities::{Coordinates, EntityType, GeoEntity};
pub use names::{composite_key, normalize};
pub use store::{fingerprint, GeoEntityStore, StoreCache};
pub use aggregation::{
    aggregate_to_state_level, AggregationReport, Aggregator, Orphan, OrphanPolicy, OrphanReason,
};
pub use classifier::{classify, IntensityBucket};
pub use map::{
    resolve_geometry_name, FillStyle, GeometryProperties, GeometryStyle, MapStyler,
    PropertyValue, NAME_PROPERTY_KEYS,
};
pub use selection::{Selection, SelectionController, SelectionEvent, ViewMode, ViewModel};
pub use ranking::{table_rows, top_by_revenue, SummaryMetrics, TableRow, DEFAULT_TOP_N};
pub use provider::{load_csv, load_entities, load_json, parse_csv, validate, IngestIssue, IngestReport, Severity};
pub use db::{
    count_entities, get_all_entities, last_import, open_database, replace_entities,
    setup_database, ImportRun,
};
pub use config::DashboardConfig;
pub use dashboard::Dashboard;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the fmt subscriber on stderr; filter comes from RUST_LOG
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
