use pano_image::{Image, ImageError};
use serde::{Deserialize, Serialize};

use crate::filter::{self, kernels};
use crate::parallel;

/// Computes a per-pixel interest score from a grayscale image.
///
/// Higher values mark stronger keypoint candidates. Implementations must not
/// change the image size.
pub trait ResponseFunction {
    /// Compute the response map of `gray` at scale `sigma`.
    fn compute(&self, gray: &Image<f32, 1>, sigma: f32) -> Result<Image<f32, 1>, ImageError>;
}

/// How a structure matrix is reduced to a single cornerness score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerMeasure {
    /// `det / trace`, the harmonic mean of the eigenvalues. Zero where the trace is zero.
    HarmonicMean,
    /// The smaller eigenvalue (Shi-Tomasi).
    MinEigenvalue,
    /// `det - k * trace²`.
    Harris {
        /// Sensitivity, usually around 0.04.
        k: f32,
    },
    /// Mean of the Förstner and Harris measures, each normalized by its largest
    /// magnitude over the image.
    ForstnerHarris,
}

/// The available response functions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Gaussian weighted structure matrix scored with a [`CornerMeasure`].
    StructureMatrix(CornerMeasure),
    /// Convolution with a Laplacian of Gaussian kernel.
    LaplacianOfGaussian,
    /// `blur(sigma * k) - blur(sigma)`.
    DifferenceOfGaussians {
        /// Ratio between the two blur scales.
        k: f32,
    },
    /// Largest absolute response over a bank of oriented second derivative filters.
    Steerable {
        /// Number of filter orientations evenly spread over 180 degrees.
        orientations: usize,
    },
}

impl Default for Response {
    fn default() -> Self {
        Response::StructureMatrix(CornerMeasure::HarmonicMean)
    }
}

const HARRIS_K: f32 = 0.04;
const FORSTNER_EPS: f32 = 1e-6;

/// Compute the structure matrix of a grayscale image.
///
/// The output channels are `Ix²`, `Iy²` and `Ix*Iy`, where the gradients come
/// from 3x3 sobel filters, each smoothed with a gaussian of the given sigma.
///
/// # Arguments
///
/// * `gray` - The grayscale image with shape (H, W, 1).
/// * `sigma` - The sigma of the gaussian window.
///
/// # Returns
///
/// The structure matrix image with shape (H, W, 3).
pub fn structure_matrix(gray: &Image<f32, 1>, sigma: f32) -> Result<Image<f32, 3>, ImageError> {
    let (sobel_x, sobel_y) = kernels::sobel_kernels_2d()?;

    let mut ix = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
    let mut iy = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
    filter::convolve(gray, &mut ix, &sobel_x)?;
    filter::convolve(gray, &mut iy, &sobel_y)?;

    let mut products = Image::<f32, 3>::from_size_val(gray.size(), 0.0)?;
    parallel::par_iter_rows_indexed(&mut products, |x, y, pixel| {
        let offset = y * gray.cols() + x;
        let gx = ix.as_slice()[offset];
        let gy = iy.as_slice()[offset];
        pixel[0] = gx * gx;
        pixel[1] = gy * gy;
        pixel[2] = gx * gy;
    });

    filter::smooth(&products, sigma)
}

// score every pixel from the determinant and trace of its structure matrix
fn pointwise(s: &Image<f32, 3>, r: &mut Image<f32, 1>, f: impl Fn(f32, f32) -> f32 + Send + Sync) {
    parallel::par_iter_rows(s, r, |sp, rp| {
        let det = sp[0] * sp[1] - sp[2] * sp[2];
        let tr = sp[0] + sp[1];
        rp[0] = f(det, tr);
    });
}

/// Reduce a structure matrix to a cornerness map.
///
/// # Arguments
///
/// * `s` - The structure matrix with shape (H, W, 3) from [`structure_matrix`].
/// * `measure` - The cornerness measure.
pub fn cornerness(s: &Image<f32, 3>, measure: CornerMeasure) -> Result<Image<f32, 1>, ImageError> {
    let mut r = Image::<f32, 1>::from_size_val(s.size(), 0.0)?;

    match measure {
        CornerMeasure::HarmonicMean => {
            pointwise(s, &mut r, |det, tr| if tr == 0.0 { 0.0 } else { det / tr })
        }
        CornerMeasure::MinEigenvalue => pointwise(s, &mut r, |det, tr| {
            (tr - (tr * tr - 4.0 * det).max(0.0).sqrt()) / 2.0
        }),
        CornerMeasure::Harris { k } => pointwise(s, &mut r, |det, tr| det - k * tr * tr),
        CornerMeasure::ForstnerHarris => {
            let mut forstner = Image::<f32, 1>::from_size_val(s.size(), 0.0)?;
            pointwise(s, &mut forstner, |det, tr| det / (tr + FORSTNER_EPS));
            pointwise(s, &mut r, |det, tr| det - HARRIS_K * tr * tr);

            let max_abs = |img: &Image<f32, 1>| {
                img.as_slice().iter().fold(0.0f32, |m, v| m.max(v.abs()))
            };
            let norm_f = max_abs(&forstner);
            let norm_h = max_abs(&r);
            let scale = |v: f32, norm: f32| if norm > 0.0 { v / norm } else { v };

            r.as_slice_mut()
                .iter_mut()
                .zip(forstner.as_slice())
                .for_each(|(h, &f)| *h = (scale(f, norm_f) + scale(*h, norm_h)) / 2.0);
        }
    }

    Ok(r)
}

impl ResponseFunction for CornerMeasure {
    fn compute(&self, gray: &Image<f32, 1>, sigma: f32) -> Result<Image<f32, 1>, ImageError> {
        let s = structure_matrix(gray, sigma)?;
        cornerness(&s, *self)
    }
}

impl ResponseFunction for Response {
    fn compute(&self, gray: &Image<f32, 1>, sigma: f32) -> Result<Image<f32, 1>, ImageError> {
        match *self {
            Response::StructureMatrix(measure) => measure.compute(gray, sigma),
            Response::LaplacianOfGaussian => {
                let kernel = kernels::laplacian_of_gaussian_kernel(sigma)?;
                let mut r = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
                filter::convolve(gray, &mut r, &kernel)?;
                Ok(r)
            }
            Response::DifferenceOfGaussians { k } => {
                let fine = filter::smooth(gray, sigma)?;
                let coarse = filter::smooth(gray, sigma * k)?;
                let mut r = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
                filter::sub(&coarse, &fine, &mut r)?;
                Ok(r)
            }
            Response::Steerable { orientations } => {
                let mut r = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
                let mut oriented = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
                for i in 0..orientations {
                    let theta = i as f32 * std::f32::consts::PI / orientations as f32;
                    let kernel = kernels::steerable_kernel(sigma, theta)?;
                    filter::convolve(gray, &mut oriented, &kernel)?;
                    r.as_slice_mut()
                        .iter_mut()
                        .zip(oriented.as_slice())
                        .for_each(|(best, v)| *best = best.max(v.abs()));
                }
                Ok(r)
            }
        }
    }
}
