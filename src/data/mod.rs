/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RecordSet (cached per session)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ RecordSet │  Vec<TransactionRecord>, distinct values per dimension
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  FilterSelection → FilteredView (row indices)
///   └──────────┘
///        │
///        ├──► metrics   totals / mean / units
///        ├──► summary   grouped sums for the charts
///        ├──► top       best categories of the latest month
///        └──► export    CSV / XLSX bytes
/// ```
///
/// `view::compute_view` runs the whole chain for one selection.

pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod summary;
pub mod top;
pub mod view;
