use std::path::Path;

use pano_geometry::RansacParams;
use pano_imgproc::{features::DetectorConfig, warp::CompositeConfig};
use serde::{Deserialize, Serialize};

use crate::error::PanoramaError;

/// Parameters of every stage of the pipeline.
///
/// Missing fields take their default value when deserialized, so a
/// configuration file only needs to list what it changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaConfig {
    /// Keypoint detection and description.
    pub detector: DetectorConfig,
    /// Robust homography estimation.
    pub ransac: RansacParams,
    /// Canvas limits and blending.
    pub composite: CompositeConfig,
}

impl PanoramaConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PanoramaError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
