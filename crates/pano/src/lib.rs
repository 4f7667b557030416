#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use pano_image as image;

#[doc(inline)]
pub use pano_imgproc as imgproc;

#[doc(inline)]
pub use pano_geometry as geometry;

#[doc(inline)]
pub use pano_io as io;

/// Serializable parameters of the whole pipeline.
pub mod config;

/// Error type of the pipeline.
pub mod error;

/// End-to-end registration and stitching of two images.
pub mod pipeline;

pub use crate::config::PanoramaConfig;
pub use crate::error::PanoramaError;
pub use crate::pipeline::{
    detect_keypoints, estimate_homography, find_matches, panorama_image, register,
    MatchedKeypoints, Registration,
};
