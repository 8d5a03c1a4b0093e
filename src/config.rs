use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::top::LatestPeriodPolicy;
use crate::data::view::ViewSettings;

/// Optional settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset opened at startup.
    pub data_path: PathBuf,
    /// File name prefix of exports, followed by `_YYYY-MM-DD`.
    pub export_prefix: String,
    /// Sheet name of the XLSX export.
    pub sheet_name: String,
    /// Length of the top categories table.
    pub top_n: usize,
    pub latest_period: LatestPeriodPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("NeluxTech Proprietary Retail Dataset.csv"),
            export_prefix: "neluxtech_filtered_data".to_string(),
            sheet_name: "FilteredData".to_string(),
            top_n: 3,
            latest_period: LatestPeriodPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Read `path` if it exists. A broken file is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No {} found, using default settings", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            top_n: self.top_n,
            latest_period: self.latest_period,
        }
    }
}
