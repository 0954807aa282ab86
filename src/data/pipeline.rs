use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use chrono::TimeDelta;

use super::catalog::DatasetSpec;
use super::error::{PipelineError, SchemaError};
use super::loader::load_dataset;
use super::model::{FilteredView, PartitionFilter, PartitionKey, ResampledSeries};
use super::resample::filter_and_resample;

/// Everything one page render needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Partition keys seen in the whole file, ascending.
    pub partitions: BTreeSet<PartitionKey>,
    /// Rows in the file before filtering.
    pub total_rows: usize,
    /// Columns to plot, in order.
    pub series: Vec<String>,
    pub resampled: ResampledSeries,
    pub filtered: FilteredView,
}

/// Load `spec`'s file from `data_dir`, then filter and resample it.
///
/// The file is read afresh on every call; nothing is cached between calls.
pub fn run(
    spec: &DatasetSpec,
    data_dir: &Path,
    filter: &PartitionFilter,
    bucket_width: TimeDelta,
) -> Result<PipelineOutput, PipelineError> {
    let started = Instant::now();
    let dataset = load_dataset(
        &spec.path(data_dir),
        &spec.timestamp_column,
        &spec.timestamp_format,
        spec.partition,
    )?;

    let series = if spec.series.is_empty() {
        dataset.fields.clone()
    } else {
        if let Some(missing) = spec
            .series
            .iter()
            .find(|s| dataset.field_index(s).is_none())
        {
            return Err(SchemaError::MissingSeries(missing.clone()).into());
        }
        spec.series.clone()
    };

    let (resampled, filtered) = filter_and_resample(&dataset, filter, bucket_width)?;
    log::debug!(
        "{} pipeline finished in {:?}",
        spec.key,
        started.elapsed()
    );

    Ok(PipelineOutput {
        partitions: dataset.partition_keys(),
        total_rows: dataset.len(),
        series,
        resampled,
        filtered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::{Catalog, DatasetKey};
    use crate::data::error::ParseError;
    use crate::data::resample::hourly;
    use std::fs;
    use tempfile::tempdir;

    const OPEN_ACCESS_CSV: &str = "\
TimeStamp,Actual,Pred
31-12-2023 23:15,10,11
31-12-2023 23:45,20,21
01-01-2024 00:05,30,
01-01-2024 02:55,40,44
";

    fn open_access() -> DatasetSpec {
        Catalog::builtin().get(DatasetKey::OpenAccess).unwrap().clone()
    }

    #[test]
    fn all_years_keeps_every_row() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Open_Access_(Forecast).csv"), OPEN_ACCESS_CSV).unwrap();

        let out = run(&open_access(), dir.path(), &PartitionFilter::All, hourly()).unwrap();

        assert_eq!(out.total_rows, 4);
        assert_eq!(out.filtered.len(), 4);
        assert_eq!(out.series, vec!["Actual", "Pred"]);
        assert_eq!(
            out.partitions.into_iter().collect::<Vec<_>>(),
            vec![PartitionKey::Calendar(2023), PartitionKey::Calendar(2024)]
        );
        // 23:00, 00:00, 01:00 (empty), 02:00
        assert_eq!(out.resampled.len(), 4);
        assert_eq!(out.resampled.buckets[0].values, vec![Some(15.0), Some(16.0)]);
        assert_eq!(out.resampled.buckets[1].values, vec![Some(30.0), None]);
        assert_eq!(out.resampled.buckets[2].values, vec![None, None]);
    }

    #[test]
    fn one_year_narrows_rows_but_keeps_partition_list() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Open_Access_(Forecast).csv"), OPEN_ACCESS_CSV).unwrap();

        let filter = PartitionFilter::Only(PartitionKey::Calendar(2024));
        let out = run(&open_access(), dir.path(), &filter, hourly()).unwrap();

        assert_eq!(out.total_rows, 4);
        assert_eq!(out.filtered.len(), 2);
        assert_eq!(out.partitions.len(), 2);
        assert_eq!(out.resampled.len(), 3);
        assert!(!out.filtered.columns().contains(&"Year"));
    }

    #[test]
    fn empty_series_list_plots_every_field() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("Price.csv"),
            "TimeStamp,Price(Actual),Price(Pred)\n01/04/24 00:00,3.5,3.6\n",
        )
        .unwrap();
        let price = Catalog::builtin().get(DatasetKey::Price).unwrap().clone();

        let out = run(&price, dir.path(), &PartitionFilter::All, hourly()).unwrap();
        assert_eq!(out.series, vec!["Price(Actual)", "Price(Pred)"]);
        assert_eq!(
            out.partitions.into_iter().next(),
            Some(PartitionKey::Fiscal {
                start_year: 2024,
                start_month: 4
            })
        );
    }

    #[test]
    fn configured_series_must_exist() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("Demand_(Forecast).csv"),
            "TimeStamp,Actual,Pred\n01-01-2024 00:00,1,2\n",
        )
        .unwrap();
        let demand = Catalog::builtin().get(DatasetKey::Demand).unwrap().clone();

        let err = run(&demand, dir.path(), &PartitionFilter::All, hourly()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Schema(SchemaError::MissingSeries(ref c)) if c == "Demand(Actual)"
        ));
    }

    #[test]
    fn missing_file_fails_the_run() {
        let dir = tempdir().unwrap();
        let err = run(&open_access(), dir.path(), &PartitionFilter::All, hourly()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::Io { .. })));
    }
}
