/// Data layer: core types, loading, metrics and derived views.
///
/// Architecture:
/// ```text
///   wide .csv (states, id, 2010, 2011, ...)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + melt → NormalizedDataset
///   └──────────┘
///        │  (memoised by cache, shared as Arc)
///        ▼
///   ┌───────────────────┐
///   │ NormalizedDataset  │  Vec<PopulationRecord>, year/state axes
///   └───────────────────┘
///        │                         │
///        ▼                         ▼
///   ┌──────────┐             ┌──────────┐
///   │ metrics   │  year →    │  views    │  pivot matrix,
///   │           │  KPIs/topN │           │  export table
///   └──────────┘             └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod views;

pub use error::DataError;
pub use model::{NormalizedDataset, PopulationRecord};
