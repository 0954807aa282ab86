use std::path::PathBuf;

use thiserror::Error;

use super::model::{PartitionKey, PartitionStrategy};

/// The input file (or its configured timestamp pattern) could not be turned
/// into a [`Dataset`](super::model::Dataset). Loading aborts on the first one.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no header row", path.display())]
    Empty { path: PathBuf },

    #[error("{} has no '{column}' column", path.display())]
    MissingTimestampColumn { path: PathBuf, column: String },

    #[error("{} has no measurement columns besides '{column}'", path.display())]
    NoMeasurementColumns { path: PathBuf, column: String },

    #[error("row {row}: timestamp '{value}' does not match '{pattern}'")]
    Timestamp {
        row: usize,
        value: String,
        pattern: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    Value {
        row: usize,
        column: String,
        value: String,
    },

    #[error("timestamp pattern '{pattern}' is ambiguous: {reason}")]
    Pattern {
        pattern: String,
        reason: &'static str,
    },
}

/// An internal invariant was violated. Seeing one of these means a caller bug
/// or a catalog that disagrees with its file, never bad user input.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("bucket width must be a positive whole number of seconds, got {0}")]
    BucketWidth(chrono::TimeDelta),

    #[error("partition filter {key} cannot be compared with a {strategy} dataset")]
    IncomparablePartition {
        key: PartitionKey,
        strategy: PartitionStrategy,
    },

    #[error("record {row} has {found} values but the dataset has {expected} fields")]
    RecordWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("series column '{0}' is not in the dataset")]
    MissingSeries(String),

    #[error("fiscal year start month must be 1..=12, got {0}")]
    FiscalStartMonth(u32),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
