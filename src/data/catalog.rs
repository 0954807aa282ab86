use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::loader::DEFAULT_TIMESTAMP_COLUMN;
use super::model::{PartitionStrategy, TimestampFormat};

/// Name of the optional catalog override inside the data directory.
pub const CATALOG_FILE: &str = "catalog.json";

// ---------------------------------------------------------------------------
// DatasetKey – the dashboard pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKey {
    Demand,
    OpenAccess,
    Price,
    Solar,
    Wind,
}

impl DatasetKey {
    /// Navigation order.
    pub const ALL: [DatasetKey; 5] = [
        DatasetKey::Demand,
        DatasetKey::OpenAccess,
        DatasetKey::Price,
        DatasetKey::Solar,
        DatasetKey::Wind,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatasetKey::Demand => "Demand",
            DatasetKey::OpenAccess => "Open Access",
            DatasetKey::Price => "Price",
            DatasetKey::Solar => "Solar",
            DatasetKey::Wind => "Wind",
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// DatasetSpec – how to load and present one file
// ---------------------------------------------------------------------------

fn default_timestamp_column() -> String {
    DEFAULT_TIMESTAMP_COLUMN.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetSpec {
    pub key: DatasetKey,
    /// File name relative to the data directory.
    pub file: String,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    pub timestamp_format: TimestampFormat,
    pub partition: PartitionStrategy,
    pub title: String,
    pub chart_title: String,
    pub value_label: String,
    /// Columns drawn on the chart. Empty means every measurement column.
    #[serde(default)]
    pub series: Vec<String>,
}

impl DatasetSpec {
    pub fn path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.file)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<DatasetSpec>,
}

impl Catalog {
    /// The five known GUVNL files, each on its own page.
    pub fn builtin() -> Self {
        let spec = |key,
                    file: &str,
                    timestamp_format,
                    partition,
                    title: &str,
                    chart_title: &str,
                    value_label: &str,
                    series: &[&str]| DatasetSpec {
            key,
            file: file.to_string(),
            timestamp_column: default_timestamp_column(),
            timestamp_format,
            partition,
            title: title.to_string(),
            chart_title: chart_title.to_string(),
            value_label: value_label.to_string(),
            series: series.iter().map(|s| s.to_string()).collect(),
        };

        Catalog {
            datasets: vec![
                spec(
                    DatasetKey::Demand,
                    "Demand_(Forecast).csv",
                    TimestampFormat::DASHED_FULL_YEAR,
                    PartitionStrategy::CalendarYear,
                    "Demand Forecast Dashboard",
                    "Actual vs Predicted Demand (MW)",
                    "Demand",
                    &["Demand(Actual)", "Demand(Pred)"],
                ),
                spec(
                    DatasetKey::OpenAccess,
                    "Open_Access_(Forecast).csv",
                    TimestampFormat::DASHED_FULL_YEAR,
                    PartitionStrategy::CalendarYear,
                    "Open Access Forecast Dashboard",
                    "Actual vs Predicted Open Access Demand (MW)",
                    "Demand",
                    &["Actual", "Pred"],
                ),
                spec(
                    DatasetKey::Price,
                    "Price.csv",
                    TimestampFormat::SLASHED_SHORT_YEAR,
                    PartitionStrategy::APRIL_FISCAL_YEAR,
                    "Price Data",
                    "Actual vs Predicted Price",
                    "Price",
                    &[],
                ),
                spec(
                    DatasetKey::Solar,
                    "Solar_Generation.csv",
                    TimestampFormat::SLASHED_SHORT_YEAR,
                    PartitionStrategy::APRIL_FISCAL_YEAR,
                    "Solar Data",
                    "Actual vs Predicted Solar Generation (MW)",
                    "Generation",
                    &[],
                ),
                spec(
                    DatasetKey::Wind,
                    "Wind_Generation.csv",
                    TimestampFormat::SLASHED_SHORT_YEAR,
                    PartitionStrategy::APRIL_FISCAL_YEAR,
                    "Wind Data",
                    "Actual vs Predicted Wind Generation (MW)",
                    "Generation",
                    &[],
                ),
            ],
        }
    }

    /// Use `catalog.json` from the data directory when present, otherwise the
    /// built-in catalog.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CATALOG_FILE);
        if !path.exists() {
            log::debug!(
                "No {} in {}, using built-in catalog",
                CATALOG_FILE,
                data_dir.display()
            );
            return Ok(Self::builtin());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        catalog
            .validate()
            .with_context(|| format!("checking {}", path.display()))?;
        log::info!(
            "Loaded catalog with {} datasets from {}",
            catalog.datasets.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Each key may appear once and each file may back only one page.
    pub fn validate(&self) -> Result<()> {
        let mut keys = BTreeSet::new();
        let mut files = BTreeSet::new();
        for spec in &self.datasets {
            if !keys.insert(spec.key) {
                bail!("dataset '{}' is listed more than once", spec.key);
            }
            if !files.insert(spec.file.as_str()) {
                bail!(
                    "dataset '{}' reuses file '{}' already assigned to another dataset",
                    spec.key,
                    spec.file
                );
            }
        }
        Ok(())
    }

    pub fn get(&self, key: DatasetKey) -> Option<&DatasetSpec> {
        self.datasets.iter().find(|d| d.key == key)
    }

    /// Keys that have an entry, in navigation order.
    pub fn keys(&self) -> Vec<DatasetKey> {
        DatasetKey::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .collect()
    }
}
