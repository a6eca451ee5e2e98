//! `forecast-dash` library crate.
//!
//! The binary (`fcast`) is a thin wrapper around this library so that:
//!
//! - the forecast pipeline is testable without spawning processes
//! - the index/generator/post-processor/formatter stages can be reused by other front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
