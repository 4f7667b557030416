use pano_image::{Image, ImageError};
use rayon::prelude::*;

use super::kernels;
use crate::parallel;

fn check_same_size<const C1: usize, const C2: usize>(
    src: &Image<f32, C1>,
    dst: &Image<f32, C2>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

fn check_odd_kernel(kernel: &Image<f32, 1>) -> Result<(), ImageError> {
    if kernel.width() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel.width()));
    }
    if kernel.height() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel.height()));
    }
    Ok(())
}

#[inline]
fn convolve_at<const C: usize>(
    src: &Image<f32, C>,
    kernel: &Image<f32, 1>,
    x: usize,
    y: usize,
    ch: usize,
) -> f32 {
    let (kw, kh) = (kernel.width(), kernel.height());
    let sx = x as i64 - (kw / 2) as i64;
    let sy = y as i64 - (kh / 2) as i64;
    let taps = kernel.as_slice();

    let mut sum = 0.0;
    for fy in 0..kh {
        for fx in 0..kw {
            sum += taps[fy * kw + fx] * src.clamped_pixel(sx + fx as i64, sy + fy as i64, ch);
        }
    }
    sum
}

/// Convolve every channel of an image with a single-channel kernel.
///
/// Pixels outside the image are read with clamped addressing, so the border
/// pixel is repeated.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The kernel with odd width and height.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn convolve<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel: &Image<f32, 1>,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;
    check_odd_kernel(kernel)?;

    parallel::par_iter_rows_indexed(dst, |x, y, pixel| {
        for (ch, out) in pixel.iter_mut().enumerate() {
            *out = convolve_at(src, kernel, x, y, ch);
        }
    });

    Ok(())
}

/// Convolve every channel with a kernel and sum the channels into one.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `kernel` - The kernel with odd width and height.
pub fn convolve_sum_channels<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, 1>,
    kernel: &Image<f32, 1>,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;
    check_odd_kernel(kernel)?;

    parallel::par_iter_rows_indexed(dst, |x, y, pixel| {
        pixel[0] = (0..C).map(|ch| convolve_at(src, kernel, x, y, ch)).sum();
    });

    Ok(())
}

/// Apply a separable filter, first along rows then along columns.
///
/// Borders are handled with clamped addressing.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, of odd length.
/// * `kernel_y` - The vertical kernel, of odd length.
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;
    for len in [kernel_x.len(), kernel_y.len()] {
        if len % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(len));
        }
    }

    let (cols, rows) = (src.cols() as i64, src.rows() as i64);
    if cols == 0 || rows == 0 {
        return Ok(());
    }

    let half_x = (kernel_x.len() / 2) as i64;
    let half_y = (kernel_y.len() / 2) as i64;
    let row_stride = C * cols as usize;

    // horizontal pass
    let src_data = src.as_slice();
    let mut temp = vec![0.0f32; src_data.len()];
    temp.par_chunks_exact_mut(row_stride)
        .zip(src_data.par_chunks_exact(row_stride))
        .for_each(|(temp_row, src_row)| {
            for x in 0..cols {
                for ch in 0..C {
                    let mut acc = 0.0;
                    for (i, &k) in kernel_x.iter().enumerate() {
                        let xx = (x + i as i64 - half_x).clamp(0, cols - 1) as usize;
                        acc += k * src_row[xx * C + ch];
                    }
                    temp_row[x as usize * C + ch] = acc;
                }
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(row_stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (col, out) in dst_row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (i, &k) in kernel_y.iter().enumerate() {
                    let yy = (y as i64 + i as i64 - half_y).clamp(0, rows - 1) as usize;
                    acc += k * temp[yy * row_stride + col];
                }
                *out = acc;
            }
        });

    Ok(())
}

/// Blur an image using a gaussian blur filter
///
/// The kernel size is derived from sigma with [`kernels::kernel_size_from_sigma`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
) -> Result<(), ImageError> {
    let kernel = kernels::gaussian_kernel_1d(kernels::kernel_size_from_sigma(sigma), sigma);
    separable_filter(src, dst, &kernel, &kernel)
}

/// Smooth an image with a gaussian and return the result as a new image.
pub fn smooth<const C: usize>(src: &Image<f32, C>, sigma: f32) -> Result<Image<f32, C>, ImageError> {
    let mut dst = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    gaussian_blur(src, &mut dst, sigma)?;
    Ok(dst)
}

/// Subtract two images, `dst = src1 - src2`.
pub fn sub<const C: usize>(
    src1: &Image<f32, C>,
    src2: &Image<f32, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    check_same_size(src1, src2)?;
    check_same_size(src1, dst)?;

    parallel::par_iter_rows_val_two(src1, src2, dst, |a, b, out| *out = a - b);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pano_image::ImageSize;

    #[test]
    fn test_convolve_identity() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let src = Image::<f32, 2>::new(size, (0..24).map(|v| v as f32).collect())?;
        let kernel = Image::<f32, 1>::new([3, 3].into(), {
            let mut k = vec![0.0; 9];
            k[4] = 1.0;
            k
        })?;
        let mut dst = Image::<f32, 2>::from_size_val(size, 0.0)?;
        convolve(&src, &mut dst, &kernel)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_convolve_clamped_border() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            [3, 1].into(),
            vec![1.0, 2.0, 4.0],
        )?;
        // kernel picking the left neighbour
        let kernel = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 0.0, 0.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        convolve(&src, &mut dst, &kernel)?;
        assert_eq!(dst.as_slice(), &[1.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_convolve_even_kernel() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        let kernel = Image::<f32, 1>::from_size_val([2, 3].into(), 0.0)?;
        let mut dst = src.clone();
        assert_eq!(
            convolve(&src, &mut dst, &kernel),
            Err(ImageError::InvalidKernelSize(2))
        );
        Ok(())
    }

    #[test]
    fn test_convolve_sum_channels() -> Result<(), ImageError> {
        let src = Image::<f32, 3>::new([1, 1].into(), vec![1.0, 2.0, 3.0])?;
        let kernel = Image::<f32, 1>::new([1, 1].into(), vec![2.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        convolve_sum_channels(&src, &mut dst, &kernel)?;
        assert_eq!(dst.as_slice(), &[12.0]);
        Ok(())
    }

    #[test]
    fn test_separable_matches_2d() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 9,
            height: 7,
        };
        let src = Image::<f32, 1>::new(
            size,
            (0..63).map(|v| ((v * 17) % 11) as f32 / 10.0).collect(),
        )?;

        let sigma = 1.0;
        let mut separable = Image::<f32, 1>::from_size_val(size, 0.0)?;
        gaussian_blur(&src, &mut separable, sigma)?;

        let mut full = Image::<f32, 1>::from_size_val(size, 0.0)?;
        convolve(&src, &mut full, &kernels::gaussian_kernel_2d(sigma)?)?;

        for (a, b) in separable.as_slice().iter().zip(full.as_slice()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_smooth_constant_image() -> Result<(), ImageError> {
        let src = Image::<f32, 3>::from_size_val([5, 5].into(), 0.5)?;
        let dst = smooth(&src, 2.0)?;
        for v in dst.as_slice() {
            assert_relative_eq!(*v, 0.5, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_sub() -> Result<(), ImageError> {
        let a = Image::<f32, 1>::new([2, 1].into(), vec![3.0, 1.0])?;
        let b = Image::<f32, 1>::new([2, 1].into(), vec![1.0, 1.5])?;
        let mut out = Image::<f32, 1>::from_size_val([2, 1].into(), 0.0)?;
        sub(&a, &b, &mut out)?;
        assert_eq!(out.as_slice(), &[2.0, -0.5]);
        Ok(())
    }
}
