//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - bundle metadata (`RawBundleMeta` as stored, `ModelMeta` once validated)
//! - conventions derived from it (`WeekRule`, `ValueKind`, `SeasonalityMode`)
//! - the frames passed between stages (`FutureFrame`, `RawPrediction`,
//!   `ForecastSeries`, `WeeklyAggregate`)

pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
