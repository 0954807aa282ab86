use std::fs::File;
use std::path::Path;

use super::error::{ParseError, PipelineError};
use super::model::{Dataset, PartitionStrategy, TimestampFormat};

/// Column holding the reading time in every known source file.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "TimeStamp";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a file with a `TimeStamp` column, partitioned by calendar year.
pub fn load(path: &Path, format: &TimestampFormat) -> Result<Dataset, PipelineError> {
    load_dataset(
        path,
        DEFAULT_TIMESTAMP_COLUMN,
        format,
        PartitionStrategy::CalendarYear,
    )
}

/// Load a comma-separated time-series file.
///
/// CSV layout: a header row, one timestamp column named `timestamp_column`
/// and any number of numeric measurement columns. Blank measurement cells
/// become missing values; anything else that is not a number fails the load,
/// as does any timestamp that does not match `format`. There is no partial
/// result.
pub fn load_dataset(
    path: &Path,
    timestamp_column: &str,
    format: &TimestampFormat,
    strategy: PartitionStrategy,
) -> Result<Dataset, PipelineError> {
    format.validate()?;
    strategy.validate()?;

    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_error = |source| ParseError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(ParseError::Empty {
            path: path.to_path_buf(),
        }
        .into());
    }

    let ts_idx = headers
        .iter()
        .position(|h| h == timestamp_column)
        .ok_or_else(|| ParseError::MissingTimestampColumn {
            path: path.to_path_buf(),
            column: timestamp_column.to_string(),
        })?;

    let fields: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ts_idx)
        .map(|(_, h)| h.clone())
        .collect();
    if fields.is_empty() {
        return Err(ParseError::NoMeasurementColumns {
            path: path.to_path_buf(),
            column: timestamp_column.to_string(),
        }
        .into());
    }

    let mut rows = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;

        let raw_ts = record.get(ts_idx).unwrap_or("");
        let timestamp = format
            .parse(raw_ts)
            .map_err(|source| ParseError::Timestamp {
                row,
                value: raw_ts.to_string(),
                pattern: format.pattern().to_string(),
                source,
            })?;

        let values = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ts_idx)
            .map(|(i, cell)| parse_measurement(cell, row, &headers[i]))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push((timestamp, values));
    }

    let dataset = Dataset::from_rows(timestamp_column, fields, strategy, rows)?;
    log::info!(
        "Loaded {} rows from {} with fields {:?}, partitions {:?}",
        dataset.len(),
        path.display(),
        dataset.fields,
        dataset
            .partition_keys()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Blank and `NaN` cells are missing; everything else must be a float.
fn parse_measurement(cell: &str, row: usize, column: &str) -> Result<Option<f64>, ParseError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(ParseError::Value {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::SchemaError;
    use crate::data::model::PartitionKey;
    use chrono::{NaiveDate, Timelike};
    use std::fs;
    use tempfile::tempdir;

    const DEMAND_CSV: &str = "\
TimeStamp,Demand(Actual),Demand(Pred)
31-12-2023 23:45,100.5,98.0
01-01-2024 00:00,101.0,
01-01-2024 00:15,102.5,103.0
";

    fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn april_fy(start_year: i32) -> PartitionKey {
        PartitionKey::Fiscal {
            start_year,
            start_month: 4,
        }
    }

    #[test]
    fn loads_dashed_timestamps_with_calendar_years() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "demand.csv", DEMAND_CSV);

        let ds = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.timestamp_column, "TimeStamp");
        assert_eq!(ds.fields, vec!["Demand(Actual)", "Demand(Pred)"]);
        assert_eq!(
            ds.records[0].timestamp,
            NaiveDate::from_ymd_opt(2023, 12, 31)
                .unwrap()
                .and_hms_opt(23, 45, 0)
                .unwrap()
        );
        assert_eq!(ds.records[0].partition, PartitionKey::Calendar(2023));
        assert_eq!(ds.records[1].partition, PartitionKey::Calendar(2024));
        assert_eq!(ds.records[1].values, vec![Some(101.0), None]);
        assert_eq!(
            ds.partition_keys().into_iter().collect::<Vec<_>>(),
            vec![PartitionKey::Calendar(2023), PartitionKey::Calendar(2024)]
        );
    }

    #[test]
    fn loads_slashed_timestamps_with_fiscal_years() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "price.csv",
            "TimeStamp,Price(Actual),Price(Pred)\n31/03/24 23:00,4.1,4.0\n01/04/24 00:00,4.2,4.3\n",
        );

        let ds = load_dataset(
            &path,
            "TimeStamp",
            &TimestampFormat::SLASHED_SHORT_YEAR,
            PartitionStrategy::APRIL_FISCAL_YEAR,
        )
        .unwrap();

        assert_eq!(ds.records[0].timestamp.hour(), 23);
        assert_eq!(ds.records[0].partition, april_fy(2023));
        assert_eq!(ds.records[1].partition, april_fy(2024));
    }

    #[test]
    fn day_comes_before_month() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "d.csv", "TimeStamp,A\n03-04-2024 10:00,1\n");
        let ds = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap();
        assert_eq!(
            ds.records[0].timestamp.date(),
            NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()
        );
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let err = load(&dir.path().join("nope.csv"), &TimestampFormat::DASHED_FULL_YEAR)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::Io { .. })));
    }

    #[test]
    fn empty_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", "");
        let err = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::Empty { .. })));
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "h.csv", "TimeStamp,A\n");
        let ds = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.fields, vec!["A"]);
    }

    #[test]
    fn one_bad_timestamp_aborts_the_whole_load() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "bad.csv",
            "TimeStamp,A\n01-01-2024 00:00,1\n2024-01-01 00:15,2\n01-01-2024 00:30,3\n",
        );
        let err = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap_err();
        match err {
            PipelineError::Parse(ParseError::Timestamp { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "2024-01-01 00:15");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_format_variant_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "d.csv", "TimeStamp,A\n01/01/24 00:00,1\n");
        assert!(load(&path, &TimestampFormat::DASHED_FULL_YEAR).is_err());
    }

    #[test]
    fn ragged_rows_are_a_csv_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "r.csv", "TimeStamp,A,B\n01-01-2024 00:00,1\n");
        let err = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::Csv { .. })));
    }

    #[test]
    fn wrong_delimiter_loses_the_timestamp_column() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "s.csv", "TimeStamp;A\n01-01-2024 00:00;1\n");
        let err = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Parse(ParseError::MissingTimestampColumn { .. })
        ));
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "n.csv", "TimeStamp,A\n01-01-2024 00:00,lots\n");
        let err = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap_err();
        match err {
            PipelineError::Parse(ParseError::Value { column, value, .. }) => {
                assert_eq!(column, "A");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn timestamp_only_file_has_no_measurements() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "t.csv", "TimeStamp\n01-01-2024 00:00\n");
        let err = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Parse(ParseError::NoMeasurementColumns { .. })
        ));
    }

    #[test]
    fn bad_fiscal_month_is_a_schema_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "d.csv", DEMAND_CSV);
        let err = load_dataset(
            &path,
            "TimeStamp",
            &TimestampFormat::DASHED_FULL_YEAR,
            PartitionStrategy::FiscalYear { start_month: 0 },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Schema(SchemaError::FiscalStartMonth(0))
        ));
    }

    #[test]
    fn loading_twice_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "demand.csv", DEMAND_CSV);
        let first = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap();
        let second = load(&path, &TimestampFormat::DASHED_FULL_YEAR).unwrap();
        assert_eq!(first, second);
    }
}
