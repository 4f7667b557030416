mod descriptor;
mod detector;
mod matcher;
mod nms;
mod response;
mod scale_space;

pub use descriptor::{describe_index, detect_corners, Descriptor, Threshold};
pub use detector::{detect_keypoints, response_map, DetectorConfig};
pub use matcher::{
    l1_distance, match_descriptors, match_descriptors_a2b, matched_points, Match,
    PointPairs,
};
pub use nms::{nms_image, non_max_suppression, SUPPRESSED};
pub use response::{cornerness, structure_matrix, CornerMeasure, Response, ResponseFunction};
pub use scale_space::{detect_scale_space_keypoints, ScaleSpaceConfig};

use pano_image::ImageError;

/// An error type for keypoint detection and matching.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FeatureError {
    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Two descriptors that should be compared have different lengths.
    #[error("Descriptor lengths do not match ({0} != {1})")]
    DescriptorLengthMismatch(usize, usize),

    /// A match refers to a descriptor that does not exist.
    #[error("Match index {0} out of bounds for {1} descriptors")]
    MatchIndexOutOfBounds(usize, usize),
}
