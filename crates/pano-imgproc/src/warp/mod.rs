//! Homography driven compositing of two images onto a common canvas.
//!
//! The second image is inverse-warped into the frame of the first one with
//! bilinear resampling, blended where both overlap and the result is trimmed
//! to its non-empty extent.
//!
//! # Examples
//!
//! Stitching an image onto itself with the identity homography:
//!
//! ```
//! use pano_geometry::linalg::IDENTITY;
//! use pano_image::Image;
//! use pano_imgproc::warp::{combine_images, CompositeConfig};
//!
//! let a = Image::<f32, 1>::new([2, 1].into(), vec![0.2, 0.4]).unwrap();
//! let out = combine_images(&a, &a, &IDENTITY, &CompositeConfig::default()).unwrap();
//! assert_eq!(out, a);
//! ```

mod composite;

pub use composite::{combine_images, trim_image, CompositeConfig, PLACEHOLDER_SIZE};
