use pano_image::{Image, ImageError};
use serde::{Deserialize, Serialize};

/// A keypoint location together with its patch descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    /// Keypoint position `[x, y]` in pixels.
    pub point: [f64; 2],
    /// Patch samples minus the center sample, channel by channel.
    pub data: Vec<f32>,
}

/// How the response threshold is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Keep responses strictly above this value.
    Absolute(f32),
    /// Keep responses strictly above `mean + k * std` of the response map.
    Adaptive {
        /// Number of standard deviations above the mean.
        k: f32,
    },
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Absolute(0.0005)
    }
}

impl Threshold {
    /// Resolve the threshold value for a given response map.
    ///
    /// Adaptive thresholds use the population statistics of the map, taken
    /// before non-maximum suppression.
    pub fn resolve(&self, response: &Image<f32, 1>) -> f32 {
        match *self {
            Threshold::Absolute(t) => t,
            Threshold::Adaptive { k } => {
                let values = response.as_slice();
                if values.is_empty() {
                    return 0.0;
                }
                let n = values.len() as f64;
                let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
                let var = values
                    .iter()
                    .map(|&v| (v as f64 - mean).powi(2))
                    .sum::<f64>()
                    / n;
                (mean + k as f64 * var.sqrt()) as f32
            }
        }
    }
}

/// Describe the patch around a pixel.
///
/// For every channel the `window x window` patch centred at `(x, y)` is read
/// with clamped addressing and the center sample is subtracted, which makes
/// the descriptor invariant to a constant brightness offset. Samples are laid
/// out channel by channel, then column by column, then row by row.
///
/// # Arguments
///
/// * `image` - The image to sample from.
/// * `x` - The column of the keypoint.
/// * `y` - The row of the keypoint.
/// * `window` - The odd side length of the patch.
///
/// # Returns
///
/// A descriptor of length `window * window * C`.
pub fn describe_index<const C: usize>(
    image: &Image<f32, C>,
    x: usize,
    y: usize,
    window: usize,
) -> Result<Descriptor, ImageError> {
    if window % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(window));
    }
    if x >= image.width() || y >= image.height() {
        return Err(ImageError::PixelIndexOutOfBounds(
            x,
            y,
            image.width(),
            image.height(),
        ));
    }

    let half = (window / 2) as i64;
    let (xi, yi) = (x as i64, y as i64);
    let mut data = Vec::with_capacity(window * window * C);

    for c in 0..C {
        let center = image.clamped_pixel(xi, yi, c);
        for dx in -half..=half {
            for dy in -half..=half {
                data.push(image.clamped_pixel(xi + dx, yi + dy, c) - center);
            }
        }
    }

    Ok(Descriptor {
        point: [x as f64, y as f64],
        data,
    })
}

/// Describe every pixel whose suppressed response is strictly above `threshold`.
///
/// # Arguments
///
/// * `image` - The image the descriptors are sampled from.
/// * `nms` - The suppressed response map, same size as `image`.
/// * `threshold` - Responses must be strictly greater than this.
/// * `window` - The odd descriptor patch size.
///
/// # Returns
///
/// The descriptors in row-major order of their keypoints. An empty vector is
/// a valid result.
pub fn detect_corners<const C: usize>(
    image: &Image<f32, C>,
    nms: &Image<f32, 1>,
    threshold: f32,
    window: usize,
) -> Result<Vec<Descriptor>, ImageError> {
    if image.size() != nms.size() {
        return Err(ImageError::InvalidImageSize(
            image.cols(),
            image.rows(),
            nms.cols(),
            nms.rows(),
        ));
    }
    if window % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(window));
    }

    let cols = nms.cols();
    nms.as_slice()
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > threshold)
        .map(|(i, _)| describe_index(image, i % cols, i / cols, window))
        .collect()
}
