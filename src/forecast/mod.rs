//! Forecast generation and post-processing.
//!
//! Responsibilities:
//!
//! - build the future timeline and call the model (`generator`)
//! - inverse-transform and clip model output (`postprocess`)
//! - aggregate daily forecasts into weeks (`weekly`)

pub mod generator;
pub mod postprocess;
pub mod weekly;

pub use generator::*;
pub use postprocess::*;
pub use weekly::*;
