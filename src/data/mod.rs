/// Data layer: catalog, loading, filtering and resampling.
///
/// Architecture:
/// ```text
///   catalog ── DatasetSpec (file, timestamp pattern, partition strategy)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → Dataset (records + partition keys)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  partition filter → FilteredView (no partition column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ resample  │  mean per aligned bucket → ResampledSeries
///   └──────────┘
/// ```
///
/// `pipeline::run` chains all of it for one page render.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod resample;
