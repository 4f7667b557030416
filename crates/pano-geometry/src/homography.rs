use faer::prelude::SpSolverLstsq;

use crate::error::HomographyError;
use crate::linalg::{self, Mat33};

/// Minimum number of correspondences that constrain the 8 free homography parameters.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Compute the homography mapping `x1` onto `x2` by linear least squares.
///
/// Every correspondence contributes two rows to an `(2n, 8)` system with the
/// bottom-right entry of the homography fixed to 1:
///
/// ```text
/// [x y 1 0 0 0 -u*x -u*y] h = u
/// [0 0 0 x y 1 -v*x -v*y] h = v
/// ```
///
/// With more than four correspondences the system is overdetermined and solved
/// in the least-squares sense through a QR decomposition.
///
/// # Arguments
///
/// * `x1` - The source points with shape (N, 2).
/// * `x2` - The destination points with shape (N, 2).
///
/// # Returns
///
/// The 3x3 homography from `x1` to `x2`. Fewer than four correspondences
/// cannot constrain the model and yield the identity.
///
/// # Errors
///
/// Returns an error if `x1` and `x2` have different lengths.
pub fn compute_homography(x1: &[[f64; 2]], x2: &[[f64; 2]]) -> Result<Mat33, HomographyError> {
    if x1.len() != x2.len() {
        return Err(HomographyError::MismatchedCorrespondences(
            x1.len(),
            x2.len(),
        ));
    }

    let n = x1.len();
    if n < MIN_CORRESPONDENCES {
        log::debug!("need at least {MIN_CORRESPONDENCES} points for a homography, got {n}");
        return Ok(linalg::IDENTITY);
    }

    let mut mat_a = faer::Mat::<f64>::zeros(2 * n, 8);
    let mut mat_b = faer::Mat::<f64>::zeros(2 * n, 1);

    for (i, (p, q)) in x1.iter().zip(x2.iter()).enumerate() {
        let (x, y) = (p[0], p[1]);
        let (u, v) = (q[0], q[1]);

        mat_a.write(2 * i, 0, x);
        mat_a.write(2 * i, 1, y);
        mat_a.write(2 * i, 2, 1.0);
        mat_a.write(2 * i, 6, -u * x);
        mat_a.write(2 * i, 7, -u * y);

        mat_a.write(2 * i + 1, 3, x);
        mat_a.write(2 * i + 1, 4, y);
        mat_a.write(2 * i + 1, 5, 1.0);
        mat_a.write(2 * i + 1, 6, -v * x);
        mat_a.write(2 * i + 1, 7, -v * y);

        mat_b.write(2 * i, 0, u);
        mat_b.write(2 * i + 1, 0, v);
    }

    let params = mat_a.qr().solve_lstsq(mat_b);
    let h = params.col(0);

    Ok([[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]])
}

/// Project a point through a homography.
///
/// The homogeneous result is divided by its third component.
///
/// # Example
///
/// ```
/// use pano_geometry::{linalg::translation_mat33, project_point};
///
/// let h = translation_mat33(10.0, -5.0);
/// assert_eq!(project_point(&h, &[1.0, 2.0]), [11.0, -3.0]);
/// ```
pub fn project_point(h: &Mat33, p: &[f64; 2]) -> [f64; 2] {
    let [x, y, w] = linalg::mat33_mul_vec3(h, &[p[0], p[1], 1.0]);
    [x / w, y / w]
}

/// Euclidean distance between two points.
pub fn point_distance(p: &[f64; 2], q: &[f64; 2]) -> f64 {
    ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)).sqrt()
}

/// Find the correspondences that agree with a homography.
///
/// A correspondence `(x1[i], x2[i])` is an inlier when `x1[i]` projected
/// through `h` lands strictly closer than `threshold` to `x2[i]`.
///
/// # Returns
///
/// The indices of the inliers, in increasing order.
///
/// PRECONDITION: `x1` and `x2` have the same length.
pub fn model_inliers(h: &Mat33, x1: &[[f64; 2]], x2: &[[f64; 2]], threshold: f64) -> Vec<usize> {
    x1.iter()
        .zip(x2.iter())
        .enumerate()
        .filter(|(_, (p, q))| point_distance(&project_point(h, p), q) < threshold)
        .map(|(i, _)| i)
        .collect()
}
