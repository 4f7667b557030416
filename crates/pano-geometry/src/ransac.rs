use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::HomographyError;
use crate::homography::{compute_homography, model_inliers, MIN_CORRESPONDENCES};
use crate::linalg::{self, Mat33};

/// Parameters for RANSAC homography estimation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Reprojection distance in pixels below which a correspondence is an inlier.
    pub inlier_threshold: f64,
    /// Maximum number of RANSAC iterations.
    pub max_iterations: usize,
    /// Stop early once the best model has more inliers than this.
    pub cutoff: usize,
    /// Optional RNG seed for deterministic runs.
    pub random_seed: Option<u64>,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            inlier_threshold: 5.0,
            max_iterations: 10_000,
            cutoff: 150,
            random_seed: None,
        }
    }
}

/// Result of a RANSAC homography fit.
#[derive(Clone, Debug, PartialEq)]
pub struct RansacResult {
    /// Estimated homography mapping the first point set onto the second.
    pub model: Mat33,
    /// Indices of the correspondences consistent with `model`.
    pub inliers: Vec<usize>,
    /// Number of iterations run before returning.
    pub iterations: usize,
}

impl RansacResult {
    fn identity() -> Self {
        Self {
            model: linalg::IDENTITY,
            inliers: Vec::new(),
            iterations: 0,
        }
    }

    /// Number of inliers supporting the model.
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }
}

/// Estimate the homography from `x1` to `x2` robustly with RANSAC.
///
/// Each iteration shuffles the correspondences, fits a homography to the first
/// four and counts its inliers over the full set. A candidate that beats the
/// best inlier count so far is refit on its sample together with its inliers
/// and becomes the new best model. The loop exits early once the best inlier
/// count exceeds `params.cutoff`.
///
/// # Arguments
///
/// * `x1` - The source points with shape (N, 2).
/// * `x2` - The matched destination points with shape (N, 2).
/// * `params` - The RANSAC parameters.
///
/// # Returns
///
/// The best supported model. With fewer than four correspondences, or when no
/// candidate gathered any support, the model is the identity with no inliers.
/// No guess such as a fixed horizontal shift is made in that case; callers
/// detect the failure from the empty inlier set.
///
/// # Errors
///
/// Returns an error if `x1` and `x2` have different lengths.
pub fn ransac_homography(
    x1: &[[f64; 2]],
    x2: &[[f64; 2]],
    params: &RansacParams,
) -> Result<RansacResult, HomographyError> {
    if x1.len() != x2.len() {
        return Err(HomographyError::MismatchedCorrespondences(
            x1.len(),
            x2.len(),
        ));
    }

    let n = x1.len();
    if n < MIN_CORRESPONDENCES {
        log::warn!("only {n} correspondences, falling back to the identity homography");
        return Ok(RansacResult::identity());
    }

    let mut rng = match params.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let mut tr = rand::rng();
            StdRng::from_rng(&mut tr)
        }
    };

    let mut order = (0..n).collect::<Vec<usize>>();
    let mut best_model = None;
    let mut best_count = 0usize;
    let mut iterations = 0usize;

    let mut s1 = Vec::with_capacity(n);
    let mut s2 = Vec::with_capacity(n);

    for _ in 0..params.max_iterations {
        iterations += 1;

        order.shuffle(&mut rng);
        let sample = &order[..MIN_CORRESPONDENCES];

        s1.clear();
        s2.clear();
        s1.extend(sample.iter().map(|&i| x1[i]));
        s2.extend(sample.iter().map(|&i| x2[i]));

        let candidate = compute_homography(&s1, &s2)?;
        let inliers = model_inliers(&candidate, x1, x2, params.inlier_threshold);

        if inliers.len() > best_count {
            // refit on the sample together with its support
            for &i in inliers.iter() {
                if !sample.contains(&i) {
                    s1.push(x1[i]);
                    s2.push(x2[i]);
                }
            }
            best_model = Some(compute_homography(&s1, &s2)?);
            best_count = inliers.len();
            log::trace!("ransac iteration {iterations}: {best_count} inliers");
        }

        if best_count > params.cutoff {
            break;
        }
    }

    let Some(model) = best_model else {
        log::warn!("ransac found no model with support after {iterations} iterations");
        return Ok(RansacResult {
            iterations,
            ..RansacResult::identity()
        });
    };

    let inliers = model_inliers(&model, x1, x2, params.inlier_threshold);
    log::debug!(
        "ransac kept {} of {n} correspondences after {iterations} iterations",
        inliers.len()
    );

    Ok(RansacResult {
        model,
        inliers,
        iterations,
    })
}
