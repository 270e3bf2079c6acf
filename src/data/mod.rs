/// Data layer: core types, loading, synthetic fallback and filtering.
///
/// Architecture:
/// ```text
///  {country}_clean.csv / .json / .parquet
///        │            (any file missing)
///        ▼                    │
///   ┌──────────┐        ┌───────────┐
///   │  loader   │──────▶│ synthetic  │  hourly normal draws, clamped ≥ 0
///   └──────────┘        └───────────┘
///        │                    │
///        ▼                    ▼
///   ┌─────────────────┐
///   │ CombinedDataset  │  Vec<Measurement>, origin marker
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country selection → visible rows
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod synthetic;
