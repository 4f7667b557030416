use pano_image::{Image, ImageError};
use serde::{Deserialize, Serialize};

use super::{
    detect_corners, detect_scale_space_keypoints, nms_image, Descriptor, FeatureError, Response,
    ResponseFunction, ScaleSpaceConfig, Threshold,
};
use crate::color::gray_from_any;

/// Parameters of the keypoint detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// The response function scoring each pixel.
    pub response: Response,
    /// Scale handed to the response function.
    pub sigma: f32,
    /// How the response threshold is chosen.
    pub threshold: Threshold,
    /// Odd side length of the descriptor patch.
    pub window: usize,
    /// Radius of the non-maximum suppression window.
    pub nms_radius: usize,
    /// Search a pyramid of octaves and scales instead of the input resolution only.
    pub scale_space: Option<ScaleSpaceConfig>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            response: Response::default(),
            sigma: 2.0,
            threshold: Threshold::default(),
            window: 5,
            nms_radius: 3,
            scale_space: None,
        }
    }
}

/// Compute the response map of an image with any number of channels.
///
/// The image is reduced to grayscale first and then scored by the configured
/// response function.
pub fn response_map<const C: usize>(
    image: &Image<f32, C>,
    config: &DetectorConfig,
) -> Result<Image<f32, 1>, ImageError> {
    let gray = gray_from_any(image)?;
    config.response.compute(&gray, config.sigma)
}

/// Detect and describe keypoints on an image.
///
/// The response map is thresholded after non-maximum suppression and every
/// surviving pixel is described on the input image, so descriptors carry all
/// of its channels. When `config.scale_space` is set the search runs over a
/// pyramid with [`detect_scale_space_keypoints`] instead.
///
/// # Arguments
///
/// * `image` - The input image with shape (H, W, C).
/// * `config` - The detector parameters.
///
/// # Returns
///
/// The descriptors in row-major order of their keypoints, or ordered by octave
/// and scale first for a scale space search.
pub fn detect_keypoints<const C: usize>(
    image: &Image<f32, C>,
    config: &DetectorConfig,
) -> Result<Vec<Descriptor>, FeatureError> {
    if let Some(pyramid) = config.scale_space {
        return detect_scale_space_keypoints(
            image,
            config,
            pyramid.octaves,
            pyramid.scales_per_octave,
        );
    }

    let response = response_map(image, config)?;
    let threshold = config.threshold.resolve(&response);
    let suppressed = nms_image(&response, config.nms_radius)?;
    let descriptors = detect_corners(image, &suppressed, threshold, config.window)?;

    log::debug!(
        "{} keypoints on a {} image (threshold {threshold})",
        descriptors.len(),
        image.size()
    );

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::CornerMeasure;
    use pano_image::ImageSize;

    fn checker_corner() -> Result<Image<f32, 3>, ImageError> {
        let size = ImageSize {
            width: 32,
            height: 32,
        };
        let mut img = Image::<f32, 3>::from_size_val(size, 0.0)?;
        for y in 0..16 {
            for x in 0..16 {
                for c in 0..3 {
                    img.set_pixel(x, y, c, 1.0);
                    img.set_pixel(x + 16, y + 16, c, 1.0);
                }
            }
        }
        Ok(img)
    }

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(
            config.response,
            Response::StructureMatrix(CornerMeasure::HarmonicMean)
        );
        assert_eq!(config.threshold, Threshold::Absolute(0.0005));
        assert_eq!(config.window, 5);
        assert_eq!(config.nms_radius, 3);
        assert_eq!(config.scale_space, None);
    }

    #[test]
    fn test_detect_keypoints_finds_center() -> Result<(), FeatureError> {
        let img = checker_corner()?;
        let config = DetectorConfig {
            sigma: 1.0,
            threshold: Threshold::Absolute(0.01),
            ..Default::default()
        };
        let keypoints = detect_keypoints(&img, &config)?;
        assert!(!keypoints.is_empty());
        assert!(keypoints
            .iter()
            .any(|d| (d.point[0] - 15.5).abs() <= 2.0 && (d.point[1] - 15.5).abs() <= 2.0));
        for d in &keypoints {
            assert_eq!(d.data.len(), 5 * 5 * 3);
        }
        Ok(())
    }

    #[test]
    fn test_detect_keypoints_flat_image() -> Result<(), FeatureError> {
        let img = Image::<f32, 3>::from_size_val([16, 16].into(), 0.5)?;
        let keypoints = detect_keypoints(&img, &DetectorConfig::default())?;
        assert!(keypoints.is_empty());
        Ok(())
    }

    #[test]
    fn test_detect_keypoints_even_window() -> Result<(), FeatureError> {
        let img = checker_corner()?;
        let config = DetectorConfig {
            window: 4,
            ..Default::default()
        };
        assert_eq!(
            detect_keypoints(&img, &config),
            Err(FeatureError::Image(ImageError::InvalidKernelSize(4)))
        );
        Ok(())
    }

    #[test]
    fn test_detect_keypoints_scale_space() -> Result<(), FeatureError> {
        let img = checker_corner()?;
        let pyramid = ScaleSpaceConfig {
            octaves: 2,
            scales_per_octave: 2,
        };
        let config = DetectorConfig {
            sigma: 1.0,
            threshold: Threshold::Absolute(0.01),
            scale_space: Some(pyramid),
            ..Default::default()
        };
        let keypoints = detect_keypoints(&img, &config)?;
        let expected = detect_scale_space_keypoints(&img, &config, 2, 2)?;
        assert!(!keypoints.is_empty());
        assert_eq!(keypoints, expected);
        Ok(())
    }

    #[test]
    fn test_config_from_json() -> Result<(), serde_json::Error> {
        let config: DetectorConfig = serde_json::from_str(
            r#"{"response": {"difference_of_gaussians": {"k": 1.6}}, "threshold": {"adaptive": {"k": 2.0}}}"#,
        )?;
        assert_eq!(config.response, Response::DifferenceOfGaussians { k: 1.6 });
        assert_eq!(config.threshold, Threshold::Adaptive { k: 2.0 });
        assert_eq!(config.sigma, 2.0);
        assert_eq!(config.scale_space, None);

        let config: DetectorConfig =
            serde_json::from_str(r#"{"scale_space": {"octaves": 2}}"#)?;
        let pyramid = ScaleSpaceConfig {
            octaves: 2,
            scales_per_octave: 3,
        };
        assert_eq!(config.scale_space, Some(pyramid));
        Ok(())
    }
}
