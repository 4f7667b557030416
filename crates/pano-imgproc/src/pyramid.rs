use crate::interpolation::bilinear_interpolation;
use crate::parallel;
use pano_image::{Image, ImageError, ImageSize};

/// Size of the next pyramid level, halving each side and keeping at least one pixel.
pub fn half_size(size: ImageSize) -> ImageSize {
    ImageSize {
        width: (size.width / 2).max(1),
        height: (size.height / 2).max(1),
    }
}

/// Downsample an image by resampling it bilinearly onto a smaller grid.
///
/// Pixel centers are aligned, so destination pixel `x` samples the source at
/// `(x + 0.5) * sx - 0.5` where `sx` is the width ratio.
///
/// # Arguments
///
/// * `src` - The source image to be downsampled.
/// * `dst` - The destination image, usually of size [`half_size`].
///
/// # Returns
///
/// * `Result<(), ImageError>` - Ok if successful, Err otherwise.
///
/// # Example
///
/// ```
/// use pano_image::{Image, ImageSize};
/// use pano_imgproc::pyramid::{half_size, pyrdown_bilinear};
///
/// let image = Image::<f32, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 1.0).unwrap();
///
/// let mut downsampled = Image::<f32, 1>::from_size_val(half_size(image.size()), 0.0).unwrap();
///
/// pyrdown_bilinear(&image, &mut downsampled).unwrap();
/// assert_eq!(downsampled.as_slice(), &[1.0; 4]);
/// ```
pub fn pyrdown_bilinear<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    if src.width() == 0 || src.height() == 0 || dst.width() == 0 || dst.height() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let sx = src.width() as f32 / dst.width() as f32;
    let sy = src.height() as f32 / dst.height() as f32;

    parallel::par_iter_rows_indexed(dst, |x, y, pixel| {
        let u = ((x as f32 + 0.5) * sx - 0.5).max(0.0);
        let v = ((y as f32 + 0.5) * sy - 0.5).max(0.0);
        pixel.copy_from_slice(&bilinear_interpolation(src, u, v));
    });

    Ok(())
}
