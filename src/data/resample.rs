use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use super::error::SchemaError;
use super::filter::filtered_view;
use super::model::{Bucket, Dataset, FilteredView, PartitionFilter, ResampledSeries};

/// One hour, the granularity every dashboard page starts at.
pub fn hourly() -> TimeDelta {
    TimeDelta::hours(1)
}

// ---------------------------------------------------------------------------
// Filter + resample
// ---------------------------------------------------------------------------

/// Select the records passing `filter` and average them into `bucket_width`
/// buckets.
///
/// Returns the bucketed series for the chart and the unaggregated rows for the
/// detail table. A filter that matches nothing produces an empty view and a
/// series with zero buckets.
pub fn filter_and_resample(
    dataset: &Dataset,
    filter: &PartitionFilter,
    bucket_width: TimeDelta,
) -> Result<(ResampledSeries, FilteredView), SchemaError> {
    let view = filtered_view(dataset, filter)?;
    let series = resample(&view, bucket_width)?;
    log::debug!(
        "{filter}: {} of {} rows -> {} buckets of {bucket_width}",
        view.len(),
        dataset.len(),
        series.len()
    );
    Ok((series, view))
}

/// Average rows into contiguous buckets of `bucket_width`.
///
/// Buckets are aligned to whole multiples of the width since the Unix epoch,
/// so hourly buckets start on the hour and daily buckets at midnight. Rows
/// may arrive in any order. Every bucket between the first and last occupied
/// one is emitted; a field with no values in a bucket is `None`.
pub fn resample(
    view: &FilteredView,
    bucket_width: TimeDelta,
) -> Result<ResampledSeries, SchemaError> {
    let width = bucket_seconds(bucket_width)?;
    let n_fields = view.fields.len();

    // Keyed by bucket start, so out-of-order input still yields ordered buckets.
    let mut stats: BTreeMap<NaiveDateTime, Vec<BucketStats>> = BTreeMap::new();
    for row in &view.rows {
        let entry = stats
            .entry(floor_bucket(row.timestamp, width))
            .or_insert_with(|| vec![BucketStats::default(); n_fields]);
        for (field, value) in entry.iter_mut().zip(&row.values) {
            if let Some(v) = value {
                field.count += 1;
                field.sum += v;
            }
        }
    }

    let mut buckets = Vec::new();
    if let (Some(&first), Some(&last)) = (stats.keys().next(), stats.keys().next_back()) {
        buckets.reserve(((last - first).num_seconds() / width + 1) as usize);
        let mut start = first;
        while start <= last {
            let values = match stats.get(&start) {
                Some(fields) => fields.iter().map(BucketStats::mean).collect(),
                None => vec![None; n_fields],
            };
            buckets.push(Bucket { start, values });
            start += bucket_width;
        }
    }

    Ok(ResampledSeries {
        fields: view.fields.clone(),
        bucket_width,
        buckets,
    })
}

// ---------------------------------------------------------------------------
// Bucket arithmetic
// ---------------------------------------------------------------------------

fn bucket_seconds(bucket_width: TimeDelta) -> Result<i64, SchemaError> {
    if bucket_width <= TimeDelta::zero() || bucket_width.subsec_nanos() != 0 {
        return Err(SchemaError::BucketWidth(bucket_width));
    }
    Ok(bucket_width.num_seconds())
}

fn floor_bucket(ts: NaiveDateTime, period: i64) -> NaiveDateTime {
    let secs = ts.and_utc().timestamp();
    ts - TimeDelta::seconds(secs.rem_euclid(period))
        - TimeDelta::nanoseconds(i64::from(ts.nanosecond()))
}

#[derive(Debug, Clone, Copy, Default)]
struct BucketStats {
    count: usize,
    sum: f64,
}

impl BucketStats {
    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
