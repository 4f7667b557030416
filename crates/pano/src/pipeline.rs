use pano_geometry::{ransac_homography, RansacParams, RansacResult};
use pano_image::Image;
use pano_imgproc::features::{match_descriptors, matched_points, Descriptor, DetectorConfig, Match};
use pano_imgproc::warp::combine_images;

use crate::{config::PanoramaConfig, error::PanoramaError};

pub use pano_imgproc::features::detect_keypoints;

/// Everything found while registering two images.
#[derive(Clone, Debug)]
pub struct Registration {
    /// Keypoints of the first image.
    pub keypoints_a: Vec<Descriptor>,
    /// Keypoints of the second image.
    pub keypoints_b: Vec<Descriptor>,
    /// Mutual nearest neighbour matches between the two keypoint sets.
    pub matches: Vec<Match>,
    /// Homography from the first image to the second one, with its inliers.
    pub homography: RansacResult,
}

/// Keypoints of two images and the matches between them.
pub type MatchedKeypoints = (Vec<Descriptor>, Vec<Descriptor>, Vec<Match>);

/// Detect keypoints on both images and match them.
///
/// Detection runs on both images concurrently and matching starts once both
/// are done.
///
/// # Returns
///
/// The keypoints of `a`, the keypoints of `b` and their matches.
pub fn find_matches<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    config: &DetectorConfig,
) -> Result<MatchedKeypoints, PanoramaError> {
    let (da, db) = rayon::join(
        || detect_keypoints(a, config),
        || detect_keypoints(b, config),
    );
    let (da, db) = (da?, db?);

    let matches = match_descriptors(&da, &db)?;
    log::info!(
        "{} keypoints in a, {} keypoints in b, {} matches",
        da.len(),
        db.len(),
        matches.len()
    );

    Ok((da, db, matches))
}

/// Estimate the homography mapping the keypoints of `a` onto those of `b`.
///
/// Inlier indices of the result refer to `matches`.
pub fn estimate_homography(
    da: &[Descriptor],
    db: &[Descriptor],
    matches: &[Match],
    params: &RansacParams,
) -> Result<RansacResult, PanoramaError> {
    let (x1, x2) = matched_points(da, db, matches)?;
    let result = ransac_homography(&x1, &x2, params)?;
    log::info!(
        "homography with {} inliers after {} iterations",
        result.inlier_count(),
        result.iterations
    );
    Ok(result)
}

/// Detect, match and estimate the homography between two images.
pub fn register<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    config: &PanoramaConfig,
) -> Result<Registration, PanoramaError> {
    let (keypoints_a, keypoints_b, matches) = find_matches(a, b, &config.detector)?;
    let homography = estimate_homography(&keypoints_a, &keypoints_b, &matches, &config.ransac)?;
    Ok(Registration {
        keypoints_a,
        keypoints_b,
        matches,
        homography,
    })
}

/// Stitch two images into a panorama.
///
/// # Arguments
///
/// * `a` - The reference image, kept unwarped.
/// * `b` - The image warped onto `a`.
/// * `config` - The parameters of every stage.
///
/// # Returns
///
/// The trimmed composite. When the estimated homography would need a canvas
/// beyond the configured limits, a zero image of
/// [`PLACEHOLDER_SIZE`](pano_imgproc::warp::PLACEHOLDER_SIZE) is returned.
pub fn panorama_image<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    config: &PanoramaConfig,
) -> Result<Image<f32, C>, PanoramaError> {
    let registration = register(a, b, config)?;
    let panorama = combine_images(a, b, &registration.homography.model, &config.composite)?;
    log::info!("panorama of size {}", panorama.size());
    Ok(panorama)
}
