use std::path::PathBuf;

use chrono::TimeDelta;

use crate::color::SeriesColors;
use crate::data::catalog::{Catalog, DatasetKey, DatasetSpec};
use crate::data::model::PartitionFilter;
use crate::data::pipeline::{self, PipelineOutput};
use crate::data::resample::hourly;

/// Environment variable naming the directory that holds the CSV files.
pub const DATA_DIR_ENV: &str = "ENERGY_DASH_DATA_DIR";

pub fn default_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Data"))
}

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Hourly,
    Daily,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Hourly, Granularity::Daily];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Hourly => "Hourly",
            Granularity::Daily => "Daily",
        }
    }

    pub fn bucket_width(self) -> TimeDelta {
        match self {
            Granularity::Hourly => hourly(),
            Granularity::Daily => TimeDelta::days(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every selection change re-runs the pipeline from the file; `output` only
/// ever holds the result of the latest run.
pub struct AppState {
    pub data_dir: PathBuf,
    pub catalog: Catalog,

    /// Current page.
    pub page: DatasetKey,

    pub filter: PartitionFilter,
    pub granularity: Granularity,

    /// Detail-table columns picked by the user; `None` means the page default.
    pub table_columns: Option<Vec<String>>,

    /// Result of the last successful pipeline run for the current selection.
    pub output: Option<PipelineOutput>,

    /// Colours for the plotted series of `output`.
    pub colors: Option<SeriesColors>,

    /// Status / error message of the last pipeline run shown in the UI.
    pub status_message: Option<String>,

    /// Why `catalog.json` was rejected; kept until the catalog is reloaded.
    pub catalog_error: Option<String>,
}

impl AppState {
    pub fn new(data_dir: PathBuf) -> Self {
        let mut state = AppState {
            data_dir,
            catalog: Catalog::builtin(),
            page: DatasetKey::Demand,
            filter: PartitionFilter::All,
            granularity: Granularity::default(),
            table_columns: None,
            output: None,
            colors: None,
            status_message: None,
            catalog_error: None,
        };
        state.reload_catalog();
        state.refresh();
        state
    }

    pub fn current_spec(&self) -> Option<&DatasetSpec> {
        self.catalog.get(self.page)
    }

    /// Switch page; the year filter and table columns go back to defaults.
    pub fn select_page(&mut self, page: DatasetKey) {
        if page == self.page {
            return;
        }
        self.page = page;
        self.filter = PartitionFilter::All;
        self.table_columns = None;
        self.refresh();
    }

    pub fn select_filter(&mut self, filter: PartitionFilter) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.refresh();
    }

    pub fn select_granularity(&mut self, granularity: Granularity) {
        if granularity == self.granularity {
            return;
        }
        self.granularity = granularity;
        self.refresh();
    }

    /// Point at another data directory and start over on its first page.
    pub fn set_data_dir(&mut self, data_dir: PathBuf) {
        self.data_dir = data_dir;
        self.reload_catalog();
        self.page = self
            .catalog
            .keys()
            .first()
            .copied()
            .unwrap_or(DatasetKey::Demand);
        self.filter = PartitionFilter::All;
        self.table_columns = None;
        self.refresh();
    }

    fn reload_catalog(&mut self) {
        match Catalog::load(&self.data_dir) {
            Ok(catalog) => {
                self.catalog = catalog;
                self.catalog_error = None;
            }
            Err(e) => {
                log::error!("Failed to load catalog, using built-in datasets: {e:#}");
                self.catalog = Catalog::builtin();
                self.catalog_error = Some(format!("Error: {e:#} (using built-in datasets)"));
            }
        }
    }

    /// Re-run load → filter → resample for the current selection.
    pub fn refresh(&mut self) {
        self.output = None;
        self.colors = None;

        let Some(spec) = self.catalog.get(self.page) else {
            self.status_message = Some(format!("No dataset configured for {}", self.page));
            return;
        };

        match pipeline::run(
            spec,
            &self.data_dir,
            &self.filter,
            self.granularity.bucket_width(),
        ) {
            Ok(output) => {
                log::info!(
                    "{} / {}: {} of {} rows, {} buckets",
                    self.page,
                    self.filter,
                    output.filtered.len(),
                    output.total_rows,
                    output.resampled.len()
                );
                self.colors = Some(SeriesColors::new(&output.series));
                self.output = Some(output);
                self.status_message = None;
            }
            Err(e) => {
                let e = anyhow::Error::new(e)
                    .context(format!("loading {}", spec.path(&self.data_dir).display()));
                log::error!("Failed to build {} page: {e:#}", self.page);
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// "All years" followed by every partition key seen in the file.
    pub fn filter_options(&self) -> Vec<PartitionFilter> {
        let keys = self.output.iter().flat_map(|o| o.partitions.iter().copied());
        std::iter::once(PartitionFilter::All)
            .chain(keys.map(PartitionFilter::Only))
            .collect()
    }

    /// Detail-table columns in view order.
    pub fn visible_columns(&self) -> Vec<String> {
        let Some(out) = &self.output else {
            return Vec::new();
        };
        let default;
        let selected = match &self.table_columns {
            Some(cols) => cols,
            None => {
                default = std::iter::once(out.filtered.timestamp_column.clone())
                    .chain(out.series.iter().cloned())
                    .collect::<Vec<_>>();
                &default
            }
        };
        out.filtered
            .columns()
            .into_iter()
            .filter(|c| selected.iter().any(|s| s == c))
            .map(str::to_string)
            .collect()
    }

    /// Show or hide one detail-table column.
    pub fn toggle_table_column(&mut self, column: &str) {
        let mut cols = self
            .table_columns
            .take()
            .unwrap_or_else(|| self.visible_columns());
        if let Some(pos) = cols.iter().position(|c| c == column) {
            cols.remove(pos);
        } else {
            cols.push(column.to_string());
        }
        self.table_columns = Some(cols);
    }
}
