use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use serde::Deserialize;

use super::error::{ParseError, SchemaError};

// ---------------------------------------------------------------------------
// TimestampFormat – per-dataset textual timestamp pattern
// ---------------------------------------------------------------------------

/// A `chrono` strftime pattern for the timestamp column.
///
/// Patterns are never guessed from the data: the day field must be explicit
/// and come before the month, and hour and minute must both be present, so
/// `03-04-2024 10:00` is always the 3rd of April.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TimestampFormat(Cow<'static, str>);

impl TimestampFormat {
    /// `DD-MM-YYYY HH:MM`
    pub const DASHED_FULL_YEAR: TimestampFormat =
        TimestampFormat(Cow::Borrowed("%d-%m-%Y %H:%M"));
    /// `DD/MM/YY HH:MM`
    pub const SLASHED_SHORT_YEAR: TimestampFormat =
        TimestampFormat(Cow::Borrowed("%d/%m/%y %H:%M"));

    pub fn new(pattern: impl Into<String>) -> Self {
        TimestampFormat(Cow::Owned(pattern.into()))
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// Reject patterns that leave day/month order or time of day implicit.
    pub fn validate(&self) -> Result<(), ParseError> {
        let pattern = self.pattern();
        let reject = |reason| {
            Err(ParseError::Pattern {
                pattern: pattern.to_string(),
                reason,
            })
        };
        let (Some(day), Some(month)) = (pattern.find("%d"), pattern.find("%m")) else {
            return reject("day (%d) and month (%m) must both be present");
        };
        if day > month {
            return reject("day (%d) must come before month (%m)");
        }
        if !pattern.contains("%Y") && !pattern.contains("%y") {
            return reject("year (%Y or %y) is missing");
        }
        if !pattern.contains("%H") || !pattern.contains("%M") {
            return reject("hour (%H) and minute (%M) must both be present");
        }
        Ok(())
    }

    pub fn parse(&self, text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text.trim(), self.pattern())
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

// ---------------------------------------------------------------------------
// Partitioning – calendar year or fiscal year
// ---------------------------------------------------------------------------

/// How a record's [`PartitionKey`] is derived from its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartitionStrategy {
    CalendarYear,
    /// Fiscal year named after the calendar year it starts in.
    FiscalYear { start_month: u32 },
}

impl PartitionStrategy {
    /// April-start fiscal year.
    pub const APRIL_FISCAL_YEAR: PartitionStrategy =
        PartitionStrategy::FiscalYear { start_month: 4 };

    pub fn validate(&self) -> Result<(), SchemaError> {
        match *self {
            PartitionStrategy::FiscalYear { start_month } if !(1..=12).contains(&start_month) => {
                Err(SchemaError::FiscalStartMonth(start_month))
            }
            _ => Ok(()),
        }
    }

    pub fn key_for(&self, timestamp: &NaiveDateTime) -> PartitionKey {
        match *self {
            PartitionStrategy::CalendarYear => PartitionKey::Calendar(timestamp.year()),
            PartitionStrategy::FiscalYear { start_month } => {
                let start_year = if timestamp.month() >= start_month {
                    timestamp.year()
                } else {
                    timestamp.year() - 1
                };
                PartitionKey::Fiscal {
                    start_year,
                    start_month,
                }
            }
        }
    }

    /// Whether keys of this shape can appear in a dataset partitioned this way.
    pub fn admits(&self, key: &PartitionKey) -> bool {
        match (self, key) {
            (PartitionStrategy::CalendarYear, PartitionKey::Calendar(_)) => true,
            (
                PartitionStrategy::FiscalYear { start_month },
                PartitionKey::Fiscal {
                    start_month: key_month,
                    ..
                },
            ) => start_month == key_month,
            _ => false,
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionStrategy::CalendarYear => write!(f, "calendar-year"),
            PartitionStrategy::FiscalYear { start_month } => {
                write!(f, "fiscal-year (starting month {start_month})")
            }
        }
    }
}

/// The derived year value records are filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartitionKey {
    Calendar(i32),
    Fiscal { start_year: i32, start_month: u32 },
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PartitionKey::Calendar(year) => write!(f, "{year}"),
            PartitionKey::Fiscal {
                start_year,
                start_month: 1,
            } => write!(f, "FY{start_year}"),
            PartitionKey::Fiscal { start_year, .. } => {
                write!(f, "FY{start_year}-{:02}", (start_year + 1).rem_euclid(100))
            }
        }
    }
}

/// Which partition the user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionFilter {
    #[default]
    All,
    Only(PartitionKey),
}

impl PartitionFilter {
    pub fn matches(&self, key: &PartitionKey) -> bool {
        match self {
            PartitionFilter::All => true,
            PartitionFilter::Only(selected) => selected == key,
        }
    }
}

impl fmt::Display for PartitionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionFilter::All => write!(f, "All years"),
            PartitionFilter::Only(key) => write!(f, "{key}"),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeSeriesRecord / Dataset – the loaded file
// ---------------------------------------------------------------------------

/// One row of the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub timestamp: NaiveDateTime,
    /// One slot per dataset field; `None` where the cell was blank.
    pub values: Vec<Option<f64>>,
    pub partition: PartitionKey,
}

/// A fully parsed file. Every record has exactly `fields.len()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub timestamp_column: String,
    /// Measurement column names, in file order.
    pub fields: Vec<String>,
    pub strategy: PartitionStrategy,
    /// Records in file order.
    pub records: Vec<TimeSeriesRecord>,
}

impl Dataset {
    /// Build a dataset from parsed rows, deriving each record's partition key.
    pub fn from_rows(
        timestamp_column: impl Into<String>,
        fields: Vec<String>,
        strategy: PartitionStrategy,
        rows: Vec<(NaiveDateTime, Vec<Option<f64>>)>,
    ) -> Result<Self, SchemaError> {
        strategy.validate()?;
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, (timestamp, values))| {
                if values.len() != fields.len() {
                    return Err(SchemaError::RecordWidth {
                        row,
                        expected: fields.len(),
                        found: values.len(),
                    });
                }
                Ok(TimeSeriesRecord {
                    partition: strategy.key_for(&timestamp),
                    timestamp,
                    values,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dataset {
            timestamp_column: timestamp_column.into(),
            fields,
            strategy,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Distinct partition keys present in the data, ascending.
    pub fn partition_keys(&self) -> BTreeSet<PartitionKey> {
        self.records.iter().map(|r| r.partition).collect()
    }
}

// ---------------------------------------------------------------------------
// FilteredView – rows handed to the detail table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// The selected subset of a dataset in original row order. It has no
/// partition column: the key only exists to drive the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub timestamp_column: String,
    pub fields: Vec<String>,
    pub rows: Vec<ViewRow>,
}

impl FilteredView {
    /// Every displayable column: the timestamp followed by the fields.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.timestamp_column.as_str())
            .chain(self.fields.iter().map(String::as_str))
            .collect()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ResampledSeries – uniform buckets for the chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub start: NaiveDateTime,
    /// Mean per field, `None` when nothing in the bucket had a value.
    pub values: Vec<Option<f64>>,
}

/// Contiguous, aligned buckets `bucket_width` apart, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSeries {
    pub fields: Vec<String>,
    pub bucket_width: TimeDelta,
    pub buckets: Vec<Bucket>,
}

impl ResampledSeries {
    /// `(bucket start, mean)` pairs for one field, or `None` for an unknown field.
    pub fn series(&self, field: &str) -> Option<Vec<(NaiveDateTime, Option<f64>)>> {
        let idx = self.fields.iter().position(|f| f == field)?;
        Some(
            self.buckets
                .iter()
                .map(|b| (b.start, b.values[idx]))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
