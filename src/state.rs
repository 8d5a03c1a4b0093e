use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::LabelColors;
use crate::config::DashboardConfig;
use crate::data::export::{build_artifact, ExportArtifact, ExportFormat};
use crate::data::filter::FilterSelection;
use crate::data::loader::DatasetCache;
use crate::data::model::{Dimension, RecordSet};
use crate::data::view::{compute_view, ViewModel};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Datasets read during this session.
    cache: DatasetCache,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<RecordSet>>,

    /// Path the current dataset came from.
    pub source: Option<PathBuf>,

    /// Current filter selection.
    pub selection: FilterSelection,

    /// Pipeline output for `selection` (cached).
    pub view: Option<ViewModel>,

    /// One colour map per filter dimension.
    pub label_colors: BTreeMap<Dimension, LabelColors>,

    /// Fatal load failure; rendering stops at this message.
    pub load_error: Option<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            source: None,
            selection: FilterSelection::default(),
            view: None,
            label_colors: BTreeMap::new(),
            load_error: None,
            status_message: None,
        }
    }

    /// Load the dataset named in the configuration.
    pub fn open_configured(&mut self) {
        let path = self.config.data_path.clone();
        self.open_reporting(&path);
    }

    /// Load `path`, recording a failure as the fatal load error.
    pub fn open_reporting(&mut self, path: &Path) {
        if let Err(e) = self.open(path) {
            log::error!("Failed to load dataset: {e:#}");
            self.load_error = Some(format!("{e:#}"));
        }
    }

    /// Load `path` (through the session cache) and make it current.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let dataset = self
            .cache
            .load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        self.set_dataset(dataset, path);
        Ok(())
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<RecordSet>, path: &Path) {
        self.selection = FilterSelection::all(&dataset);
        self.label_colors = Dimension::ALL
            .iter()
            .map(|d| (*d, LabelColors::new(*d, dataset.distinct_values(*d))))
            .collect();

        self.status_message = match dataset.date_warnings.len() {
            0 => None,
            1 => Some("1 row has an unparsable date".to_string()),
            n => Some(format!("{n} rows have unparsable dates")),
        };
        self.dataset = Some(dataset);
        self.source = Some(path.to_path_buf());
        self.load_error = None;
        self.recompute();
    }

    /// Re-run the pipeline after a selection change.
    pub fn recompute(&mut self) {
        self.view = self.dataset.as_ref().map(|ds| {
            compute_view(ds, &self.selection, &self.config.view_settings())
        });
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        self.selection.toggle(dim, value);
        self.recompute();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            self.selection.select_all(dim, ds);
            self.recompute();
        }
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection.select_none(dim);
        self.recompute();
    }

    /// Serialize the current filtered view, stamped with `day`.
    pub fn export(&self, format: ExportFormat, day: NaiveDate) -> Result<ExportArtifact> {
        let (Some(dataset), Some(view)) = (&self.dataset, &self.view) else {
            anyhow::bail!("no dataset loaded");
        };
        let filtered = view.filtered(dataset);
        build_artifact(
            &filtered,
            format,
            &self.config.export_prefix,
            &self.config.sheet_name,
            day,
        )
        .with_context(|| format!("building {} export", format.extension()))
    }
}
