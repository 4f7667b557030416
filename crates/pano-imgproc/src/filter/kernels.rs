use pano_image::{Image, ImageError, ImageSize};

/// Compute the odd kernel size that covers a gaussian of the given sigma.
///
/// The size is `ceil(6 * sigma)` bumped to the next odd number, so the kernel
/// spans three standard deviations on each side of its center.
///
/// # Example
///
/// ```
/// use pano_imgproc::filter::kernels::kernel_size_from_sigma;
///
/// assert_eq!(kernel_size_from_sigma(1.0), 7);
/// assert_eq!(kernel_size_from_sigma(2.0), 13);
/// assert_eq!(kernel_size_from_sigma(0.5), 3);
/// ```
pub fn kernel_size_from_sigma(sigma: f32) -> usize {
    let size = (6.0 * sigma).ceil().max(0.0) as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

fn square_kernel(
    kernel_size: usize,
    f: impl Fn(f32, f32) -> f32,
) -> Result<Image<f32, 1>, ImageError> {
    if kernel_size % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_size));
    }

    let half = (kernel_size / 2) as f32;
    let mut data = Vec::with_capacity(kernel_size * kernel_size);
    for y in 0..kernel_size {
        for x in 0..kernel_size {
            data.push(f(x as f32 - half, y as f32 - half));
        }
    }

    Image::new(
        ImageSize {
            width: kernel_size,
            height: kernel_size,
        },
        data,
    )
}

/// Create a normalized 2d gaussian kernel sized from `sigma`.
pub fn gaussian_kernel_2d(sigma: f32) -> Result<Image<f32, 1>, ImageError> {
    let var = sigma * sigma;
    let mut kernel = square_kernel(kernel_size_from_sigma(sigma), |rx, ry| {
        (-(rx * rx + ry * ry) / (2.0 * var)).exp()
    })?;

    let norm = kernel.as_slice().iter().sum::<f32>();
    kernel.as_slice_mut().iter_mut().for_each(|k| *k /= norm);
    Ok(kernel)
}

/// Create the 3x3 sobel kernels.
///
/// # Returns
///
/// The `(gx, gy)` kernels, responding to horizontal and vertical gradients.
#[rustfmt::skip]
pub fn sobel_kernels_2d() -> Result<(Image<f32, 1>, Image<f32, 1>), ImageError> {
    let size = ImageSize { width: 3, height: 3 };
    let gx = Image::new(size, vec![
        -1.0, 0.0, 1.0,
        -2.0, 0.0, 2.0,
        -1.0, 0.0, 1.0,
    ])?;
    let gy = Image::new(size, vec![
        -1.0, -2.0, -1.0,
         0.0,  0.0,  0.0,
         1.0,  2.0,  1.0,
    ])?;
    Ok((gx, gy))
}

/// Create a Laplacian of Gaussian kernel sized from `sigma`.
///
/// Each tap is `-(1 - r²/2σ²) * exp(-r²/2σ²) / (πσ⁴)`.
pub fn laplacian_of_gaussian_kernel(sigma: f32) -> Result<Image<f32, 1>, ImageError> {
    let var = sigma * sigma;
    let scale = std::f32::consts::PI * var * var;
    square_kernel(kernel_size_from_sigma(sigma), |rx, ry| {
        let r2 = rx * rx + ry * ry;
        let q = r2 / (2.0 * var);
        -(1.0 - q) * (-q).exp() / scale
    })
}

/// Create an oriented second derivative of gaussian kernel.
///
/// The kernel takes the second derivative along the direction `theta` (in
/// radians) and smooths across it.
pub fn steerable_kernel(sigma: f32, theta: f32) -> Result<Image<f32, 1>, ImageError> {
    let var = sigma * sigma;
    let (dy, dx) = theta.sin_cos();
    square_kernel(kernel_size_from_sigma(sigma), |rx, ry| {
        let proj = rx * dx + ry * dy;
        let perp = -rx * dy + ry * dx;
        (-(perp * perp) / (2.0 * var)).exp()
            * (1.0 - (proj * proj) / var)
            * (-(proj * proj) / (2.0 * var)).exp()
    })
}
