//! Filter operations
//!
//! Linear filtering with clamped borders, used to build response maps.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;
