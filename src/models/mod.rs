//! Forecast model evaluation.
//!
//! `ForecastModel` is the seam between the pipeline and a trained model;
//! `AdditiveModel` is the serialized trend + seasonality implementation stored in bundles.

pub mod model;

pub use model::*;
