// ⚙️ Dashboard configuration
//
// Precedence: environment > JSON file > defaults.
//
//   GEO_METRICS_DB              path to the SQLite database
//   GEO_METRICS_ADDR            server listen address
//   GEO_METRICS_ORPHAN_POLICY   lenient | exclude | strict
//   GEO_METRICS_TOP_N           rows in the revenue table
//
// GEO_METRICS_CONFIG names the JSON file itself.

use crate::aggregation::OrphanPolicy;
use crate::ranking::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DB: &str = "GEO_METRICS_DB";
pub const ENV_ADDR: &str = "GEO_METRICS_ADDR";
pub const ENV_ORPHAN_POLICY: &str = "GEO_METRICS_ORPHAN_POLICY";
pub const ENV_TOP_N: &str = "GEO_METRICS_TOP_N";
pub const ENV_CONFIG: &str = "GEO_METRICS_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub database_path: PathBuf,
    pub listen_addr: String,
    pub orphan_policy: OrphanPolicy,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            database_path: PathBuf::from("geo_metrics.db"),
            listen_addr: "127.0.0.1:3000".to_string(),
            orphan_policy: OrphanPolicy::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl DashboardConfig {
    /// Load from JSON file; absent fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// File (if given) or defaults, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// File named by GEO_METRICS_CONFIG (if set), then environment overrides
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG).ok().map(PathBuf::from);
        DashboardConfig::load(path.as_deref())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key → value source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB) {
            self.database_path = PathBuf::from(path);
        }

        if let Some(addr) = lookup(ENV_ADDR) {
            self.listen_addr = addr;
        }

        if let Some(policy) = lookup(ENV_ORPHAN_POLICY) {
            self.orphan_policy = policy
                .parse::<OrphanPolicy>()
                .with_context(|| format!("Invalid {}", ENV_ORPHAN_POLICY))?;
        }

        if let Some(top_n) = lookup(ENV_TOP_N) {
            self.top_n = top_n
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {}: {:?}", ENV_TOP_N, top_n))?;
        }

        Ok(())
    }
}
