use super::error::SchemaError;
use super::model::{Dataset, FilteredView, PartitionFilter, ViewRow};

// ---------------------------------------------------------------------------
// Partition filter
// ---------------------------------------------------------------------------

/// Return indices of records whose partition key passes `filter`, in file order.
///
/// A filter key of the wrong shape for the dataset (a calendar year against a
/// fiscal-year dataset, or a fiscal year with a different start month) is a
/// [`SchemaError`]. A well-formed key that matches nothing is not: the result
/// is simply empty.
pub fn filtered_indices(
    dataset: &Dataset,
    filter: &PartitionFilter,
) -> Result<Vec<usize>, SchemaError> {
    if let PartitionFilter::Only(key) = filter {
        if !dataset.strategy.admits(key) {
            return Err(SchemaError::IncomparablePartition {
                key: *key,
                strategy: dataset.strategy,
            });
        }
    }

    Ok(dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filter.matches(&rec.partition))
        .map(|(i, _)| i)
        .collect())
}

/// Materialise the selected records as a [`FilteredView`], dropping the
/// partition key.
pub fn filtered_view(
    dataset: &Dataset,
    filter: &PartitionFilter,
) -> Result<FilteredView, SchemaError> {
    let rows = filtered_indices(dataset, filter)?
        .into_iter()
        .map(|i| {
            let rec = &dataset.records[i];
            ViewRow {
                timestamp: rec.timestamp,
                values: rec.values.clone(),
            }
        })
        .collect();

    Ok(FilteredView {
        timestamp_column: dataset.timestamp_column.clone(),
        fields: dataset.fields.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{PartitionKey, PartitionStrategy};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn dataset(strategy: PartitionStrategy) -> Dataset {
        Dataset::from_rows(
            "TimeStamp",
            vec!["Actual".into()],
            strategy,
            vec![
                (at(2024, 5, 1), vec![Some(3.0)]),
                (at(2023, 1, 1), vec![Some(1.0)]),
                (at(2024, 2, 1), vec![Some(2.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn all_keeps_every_row_in_file_order() {
        let ds = dataset(PartitionStrategy::CalendarYear);
        let view = filtered_view(&ds, &PartitionFilter::All).unwrap();
        assert_eq!(view.len(), ds.len());
        let values: Vec<_> = view.rows.iter().map(|r| r.values[0]).collect();
        assert_eq!(values, vec![Some(3.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn selects_one_calendar_year() {
        let ds = dataset(PartitionStrategy::CalendarYear);
        let filter = PartitionFilter::Only(PartitionKey::Calendar(2024));
        let idx = filtered_indices(&ds, &filter).unwrap();
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn selects_one_fiscal_year() {
        let ds = dataset(PartitionStrategy::APRIL_FISCAL_YEAR);
        let fy2023 = PartitionKey::Fiscal {
            start_year: 2023,
            start_month: 4,
        };
        let idx = filtered_indices(&ds, &PartitionFilter::Only(fy2023)).unwrap();
        assert_eq!(idx, vec![2]);
    }

    #[test]
    fn absent_key_yields_empty_view() {
        let ds = dataset(PartitionStrategy::CalendarYear);
        let filter = PartitionFilter::Only(PartitionKey::Calendar(1990));
        let view = filtered_view(&ds, &filter).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.fields, ds.fields);
    }

    #[test]
    fn mismatched_key_kind_is_a_schema_error() {
        let ds = dataset(PartitionStrategy::APRIL_FISCAL_YEAR);
        let filter = PartitionFilter::Only(PartitionKey::Calendar(2024));
        let err = filtered_indices(&ds, &filter).unwrap_err();
        assert!(matches!(err, SchemaError::IncomparablePartition { .. }));
    }
}
