//! Synthetic inputs.

pub mod demo;

pub use demo::*;
