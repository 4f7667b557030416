use pano_image::{Image, ImageError};

use crate::parallel;

/// Value written to suppressed pixels; lower than any threshold in use.
pub const SUPPRESSED: f32 = f32::MIN;

/// Suppress every response that is not a local maximum.
///
/// A pixel keeps its value unless some pixel in the closed
/// `(2 * radius + 1)` square window around it is strictly greater, in which
/// case it becomes [`SUPPRESSED`]. Ties therefore survive. The window is read
/// with clamped addressing at the borders.
///
/// # Arguments
///
/// * `src` - The response map with shape (H, W, 1).
/// * `dst` - The suppressed map with shape (H, W, 1).
/// * `radius` - The half size of the window.
///
/// # Example
///
/// ```
/// use pano_image::Image;
/// use pano_imgproc::features::{non_max_suppression, SUPPRESSED};
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 3.0, 2.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
/// non_max_suppression(&src, &mut dst, 1).unwrap();
/// assert_eq!(dst.as_slice(), &[SUPPRESSED, 3.0, SUPPRESSED]);
/// ```
pub fn non_max_suppression(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    radius: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let r = radius as i64;
    let src_data = src.as_slice();
    let cols = src.cols();

    parallel::par_iter_rows_indexed(dst, |x, y, pixel| {
        let center = src_data[y * cols + x];
        let (xi, yi) = (x as i64, y as i64);

        let dominated = (yi - r..=yi + r)
            .any(|ny| (xi - r..=xi + r).any(|nx| src.clamped_pixel(nx, ny, 0) > center));

        pixel[0] = if dominated { SUPPRESSED } else { center };
    });

    Ok(())
}

/// Convenience wrapper around [`non_max_suppression`] returning a new image.
pub fn nms_image(src: &Image<f32, 1>, radius: usize) -> Result<Image<f32, 1>, ImageError> {
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), SUPPRESSED)?;
    non_max_suppression(src, &mut dst, radius)?;
    Ok(dst)
}
