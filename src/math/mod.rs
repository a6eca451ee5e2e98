//! Mathematical utilities: seasonal/trend basis functions and rounding.

pub mod basis;
pub mod rounding;

pub use basis::*;
pub use rounding::*;
