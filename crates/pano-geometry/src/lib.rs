#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the geometry module.
pub mod error;

/// Homography solving, point projection and inlier scoring.
pub mod homography;

/// Small fixed-size 3x3 matrix utilities.
pub mod linalg;

/// Robust homography estimation with RANSAC.
pub mod ransac;

pub use crate::error::HomographyError;
pub use crate::homography::{compute_homography, model_inliers, point_distance, project_point};
pub use crate::linalg::Mat33;
pub use crate::ransac::{ransac_homography, RansacParams, RansacResult};
