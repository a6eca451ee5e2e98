//! Input/output helpers.
//!
//! - model bundle read/write (`bundle`)
//! - model directory scan (`index`)
//! - daily CSV ingest for re-aggregation (`ingest`)
//! - writing download files (`export`)

pub mod bundle;
pub mod export;
pub mod index;
pub mod ingest;

pub use bundle::*;
pub use export::*;
pub use index::*;
pub use ingest::*;
