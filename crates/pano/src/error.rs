use pano_geometry::HomographyError;
use pano_image::ImageError;
use pano_imgproc::features::FeatureError;

/// An error type for the panorama pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PanoramaError {
    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Keypoint detection or matching failed.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Homography estimation failed.
    #[error(transparent)]
    Homography(#[from] HomographyError),

    /// Error to read a configuration file.
    #[error("Failed to read the configuration. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to parse a configuration file.
    #[error("Failed to parse the configuration. {0}")]
    ConfigError(#[from] serde_json::Error),
}
