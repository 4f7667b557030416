use pano_image::Image;
use serde::{Deserialize, Serialize};

use super::{describe_index, nms_image, Descriptor, DetectorConfig, FeatureError, ResponseFunction};
use crate::color::gray_from_any;
use crate::filter;
use crate::pyramid::{half_size, pyrdown_bilinear};

/// Shape of the pyramid searched by [`detect_scale_space_keypoints`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSpaceConfig {
    /// The number of pyramid levels.
    pub octaves: usize,
    /// The number of scales per level.
    pub scales_per_octave: usize,
}

impl Default for ScaleSpaceConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            scales_per_octave: 3,
        }
    }
}

// one scale of an octave
struct ScaleLevel<const C: usize> {
    smoothed: Image<f32, C>,
    response: Image<f32, 1>,
}

fn build_octave<const C: usize>(
    level: &Image<f32, C>,
    config: &DetectorConfig,
    scales_per_octave: usize,
) -> Result<Vec<ScaleLevel<C>>, FeatureError> {
    let step = 2f32.powf(1.0 / scales_per_octave as f32);
    let mut sigma = config.sigma;
    let mut scales = Vec::with_capacity(scales_per_octave);

    for _ in 0..scales_per_octave {
        let smoothed = filter::smooth(level, sigma)?;
        let gray = gray_from_any(&smoothed)?;
        let response = config.response.compute(&gray, sigma)?;
        scales.push(ScaleLevel { smoothed, response });
        sigma *= step;
    }

    Ok(scales)
}

/// Detect keypoints over a pyramid of octaves and scales.
///
/// Each octave halves the previous one with bilinear resampling. Within an
/// octave the sigma starts at `config.sigma` and grows by `2^(1/scales_per_octave)`
/// per scale. A pixel becomes a keypoint when it survives non-maximum
/// suppression at its scale, is above the threshold and is strictly greater
/// than the response of the neighbouring scales of the same octave at the same
/// pixel. Descriptors are taken on the smoothed level and the keypoint
/// position is mapped back to the input resolution.
///
/// # Arguments
///
/// * `image` - The input image with shape (H, W, C).
/// * `config` - The detector parameters used at every scale.
/// * `octaves` - The number of pyramid levels.
/// * `scales_per_octave` - The number of scales per level.
///
/// # Returns
///
/// The descriptors ordered by octave, then scale, then row-major position.
pub fn detect_scale_space_keypoints<const C: usize>(
    image: &Image<f32, C>,
    config: &DetectorConfig,
    octaves: usize,
    scales_per_octave: usize,
) -> Result<Vec<Descriptor>, FeatureError> {
    let mut descriptors = Vec::new();
    if scales_per_octave == 0 {
        return Ok(descriptors);
    }

    let mut level = image.clone();

    for octave in 0..octaves {
        if octave > 0 {
            if level.width() < 2 || level.height() < 2 {
                log::debug!("stopping scale space at octave {octave}, level is {}", level.size());
                break;
            }
            let mut down = Image::<f32, C>::from_size_val(half_size(level.size()), 0.0)?;
            pyrdown_bilinear(&level, &mut down)?;
            level = down;
        }

        let scales = build_octave(&level, config, scales_per_octave)?;
        let factor = (1usize << octave) as f64;
        let cols = level.cols();

        for (s, scale) in scales.iter().enumerate() {
            let threshold = config.threshold.resolve(&scale.response);
            let suppressed = nms_image(&scale.response, config.nms_radius)?;
            let response = scale.response.as_slice();

            let neighbours = [s.checked_sub(1), Some(s + 1)]
                .into_iter()
                .flatten()
                .filter_map(|n| scales.get(n))
                .collect::<Vec<_>>();

            for (i, &v) in suppressed.as_slice().iter().enumerate() {
                if v <= threshold {
                    continue;
                }
                let is_extremum = neighbours
                    .iter()
                    .all(|n| response[i] > n.response.as_slice()[i]);
                if !is_extremum {
                    continue;
                }
                let mut d = describe_index(&scale.smoothed, i % cols, i / cols, config.window)?;
                d.point = [d.point[0] * factor, d.point[1] * factor];
                descriptors.push(d);
            }
        }
    }

    log::debug!(
        "{} scale space keypoints over {octaves} octaves of {scales_per_octave} scales",
        descriptors.len()
    );

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Threshold;
    use pano_image::{ImageError, ImageSize};

    fn blob_image() -> Result<Image<f32, 1>, ImageError> {
        let size = ImageSize {
            width: 40,
            height: 40,
        };
        let mut img = Image::<f32, 1>::from_size_val(size, 0.0)?;
        for y in 0..20 {
            for x in 0..20 {
                img.set_pixel(x, y, 0, 1.0);
                img.set_pixel(x + 20, y + 20, 0, 1.0);
            }
        }
        Ok(img)
    }

    #[test]
    fn test_scale_space_zero_scales() -> Result<(), FeatureError> {
        let img = blob_image()?;
        let kps = detect_scale_space_keypoints(&img, &DetectorConfig::default(), 3, 0)?;
        assert!(kps.is_empty());
        Ok(())
    }

    #[test]
    fn test_scale_space_keypoints_in_bounds() -> Result<(), FeatureError> {
        let img = blob_image()?;
        let config = DetectorConfig {
            sigma: 1.0,
            threshold: Threshold::Absolute(1e-3),
            window: 3,
            ..Default::default()
        };
        let kps = detect_scale_space_keypoints(&img, &config, 2, 2)?;
        assert!(!kps.is_empty());
        for d in &kps {
            assert!(d.point[0] >= 0.0 && d.point[0] < 40.0);
            assert!(d.point[1] >= 0.0 && d.point[1] < 40.0);
            assert_eq!(d.data.len(), 9);
        }
        // the junction in the middle is found
        assert!(kps
            .iter()
            .any(|d| (d.point[0] - 19.5).abs() <= 3.0 && (d.point[1] - 19.5).abs() <= 3.0));
        Ok(())
    }

    #[test]
    fn test_scale_space_tiny_image() -> Result<(), FeatureError> {
        let img = Image::<f32, 1>::from_size_val([1, 1].into(), 1.0)?;
        let kps = detect_scale_space_keypoints(&img, &DetectorConfig::default(), 4, 2)?;
        assert!(kps.is_empty());
        Ok(())
    }
}
