use pano_geometry::{linalg::inverse_mat33, project_point, Mat33};
use pano_image::{Image, ImageError, ImageSize};
use serde::{Deserialize, Serialize};

use crate::{interpolation::bilinear_interpolation, parallel};

/// Size of the image returned when the canvas would exceed the configured limits.
pub const PLACEHOLDER_SIZE: ImageSize = ImageSize {
    width: 100,
    height: 100,
};

/// Parameters of the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Weight of the first image where both images overlap, in `[0, 1]`.
    pub blend: f32,
    /// Largest canvas width that will be allocated.
    pub max_width: usize,
    /// Largest canvas height that will be allocated.
    pub max_height: usize,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            blend: 0.5,
            max_width: 15000,
            max_height: 4000,
        }
    }
}

// canvas offset and size holding `a` and `b` warped into the frame of `a`
fn canvas_bounds(a: ImageSize, b: ImageSize, h_ab: &Mat33) -> (i64, i64, i64, i64) {
    let (bw, bh) = (b.width as f64, b.height as f64);
    let corners = [[0.0, 0.0], [bw - 1.0, 0.0], [0.0, bh - 1.0], [bw - 1.0, bh - 1.0]]
        .map(|c| project_point(h_ab, &c));

    let fold = |f: fn(f64, f64) -> f64, k: usize| {
        corners[1..].iter().fold(corners[0][k], |acc, c| f(acc, c[k]))
    };
    let (min_x, min_y) = (fold(f64::min, 0), fold(f64::min, 1));
    let (max_x, max_y) = (fold(f64::max, 0), fold(f64::max, 1));

    let dx = (min_x as i64).min(0);
    let dy = (min_y as i64).min(0);
    let w = (a.width as i64).max(max_x as i64).saturating_sub(dx);
    let h = (a.height as i64).max(max_y as i64).saturating_sub(dy);

    (dx, dy, w, h)
}

/// Stitch two images together with a homography.
///
/// `h_ba` maps points of `a` onto points of `b`. The canvas is large enough
/// to hold `a` and the warped corners of `b`; `a` is pasted at its offset and
/// every canvas pixel that projects inside `b` is sampled bilinearly from it.
/// `b` is sampled over the whole overlap, not only where `a` left the canvas
/// empty. Channels already written by `a` are blended as
/// `blend * a + (1 - blend) * b`, the others take the sample of `b`.
/// The result is trimmed to the bounding box of its non-zero pixels.
///
/// # Arguments
///
/// * `a` - The reference image.
/// * `b` - The image warped onto `a`.
/// * `h_ba` - The homography from `a` to `b` coordinates.
/// * `config` - The blending weight and canvas limits.
///
/// # Returns
///
/// The composite, or a zero image of [`PLACEHOLDER_SIZE`] when the canvas
/// would be larger than `config` allows.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] if `h_ba` is singular.
pub fn combine_images<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    h_ba: &Mat33,
    config: &CompositeConfig,
) -> Result<Image<f32, C>, ImageError> {
    let h_ab = inverse_mat33(h_ba).map_err(|_| ImageError::CannotComputeDeterminant)?;

    let (dx, dy, w, h) = canvas_bounds(a.size(), b.size(), &h_ab);

    if w > config.max_width as i64 || h > config.max_height as i64 {
        log::warn!("cannot make a {w}x{h} panorama, the homography is probably wrong");
        return Image::from_size_val(PLACEHOLDER_SIZE, 0.0);
    }

    let canvas_size = ImageSize {
        width: w.max(0) as usize,
        height: h.max(0) as usize,
    };
    let mut canvas = Image::<f32, C>::from_size_val(canvas_size, 0.0)?;

    // paste a at (-dx, -dy)
    let (ox, oy) = ((-dx) as usize, (-dy) as usize);
    let a_row = a.width() * C;
    if a_row > 0 {
        let canvas_row = canvas.width() * C;
        for (y, row) in a.as_slice().chunks_exact(a_row).enumerate() {
            let start = (y + oy) * canvas_row + ox * C;
            canvas.as_slice_mut()[start..start + a_row].copy_from_slice(row);
        }
    }

    if b.width() > 0 && b.height() > 0 {
        let (bw, bh) = (b.width() as f64, b.height() as f64);
        let alpha = config.blend;

        parallel::par_iter_rows_indexed(&mut canvas, |x, y, pixel| {
            let p = [(x as i64 + dx) as f64, (y as i64 + dy) as f64];
            let [u, v] = project_point(h_ba, &p);
            if !(u >= 0.0 && v >= 0.0 && u < bw && v < bh) {
                return;
            }
            let sample = bilinear_interpolation(b, u as f32, v as f32);
            for (prev, s) in pixel.iter_mut().zip(sample) {
                *prev = if *prev > 0.0 {
                    alpha * *prev + (1.0 - alpha) * s
                } else {
                    s
                };
            }
        });
    }

    log::debug!("composite canvas {canvas_size} with offset ({dx}, {dy})");

    trim_image(&canvas)
}

/// Crop an image to the bounding box of its non-zero pixels.
///
/// A pixel counts as non-zero if any of its channels is. An image without
/// any non-zero pixel is returned unchanged.
pub fn trim_image<const C: usize>(image: &Image<f32, C>) -> Result<Image<f32, C>, ImageError> {
    let cols = image.cols();
    let mut bbox: Option<(usize, usize, usize, usize)> = None;

    for (i, pixel) in image.as_slice().chunks_exact(C).enumerate() {
        if pixel.iter().all(|&v| v == 0.0) {
            continue;
        }
        let (x, y) = (i % cols, i / cols);
        bbox = Some(match bbox {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    let Some((x0, y0, x1, y1)) = bbox else {
        return Ok(image.clone());
    };

    let size = ImageSize {
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    };
    let row_len = size.width * C;
    let mut data = Vec::with_capacity(size.width * size.height * C);
    for y in y0..=y1 {
        let start = (y * cols + x0) * C;
        data.extend_from_slice(&image.as_slice()[start..start + row_len]);
    }

    Image::new(size, data)
}
