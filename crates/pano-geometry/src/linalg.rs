use crate::error::HomographyError;

/// A row-major 3x3 matrix.
pub type Mat33 = [[f64; 3]; 3];

/// The 3x3 identity matrix.
pub const IDENTITY: Mat33 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Build a homography that only translates by `(dx, dy)`.
pub fn translation_mat33(dx: f64, dy: f64) -> Mat33 {
    [[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]]
}

/// Compute the determinant of a 3x3 matrix.
#[rustfmt::skip]
pub fn det_mat33(m: &Mat33) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) -
    m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
    m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[rustfmt::skip]
fn adjugate_mat33(m: &Mat33) -> Mat33 {
    [
        [
            m[1][1] * m[2][2] - m[1][2] * m[2][1],
            m[0][2] * m[2][1] - m[0][1] * m[2][2],
            m[0][1] * m[1][2] - m[0][2] * m[1][1],
        ],
        [
            m[1][2] * m[2][0] - m[1][0] * m[2][2],
            m[0][0] * m[2][2] - m[0][2] * m[2][0],
            m[0][2] * m[1][0] - m[0][0] * m[1][2],
        ],
        [
            m[1][0] * m[2][1] - m[1][1] * m[2][0],
            m[0][1] * m[2][0] - m[0][0] * m[2][1],
            m[0][0] * m[1][1] - m[0][1] * m[1][0],
        ],
    ]
}

/// Invert a 3x3 matrix through its adjugate.
///
/// # Errors
///
/// Returns [`HomographyError::SingularMatrix`] when the determinant is zero
/// or not finite.
pub fn inverse_mat33(m: &Mat33) -> Result<Mat33, HomographyError> {
    let det = det_mat33(m);
    if det == 0.0 || !det.is_finite() {
        return Err(HomographyError::SingularMatrix);
    }

    let adj = adjugate_mat33(m);
    let inv_det = 1.0 / det;

    let mut inv = [[0.0; 3]; 3];
    for (inv_row, adj_row) in inv.iter_mut().zip(adj.iter()) {
        for (v, a) in inv_row.iter_mut().zip(adj_row.iter()) {
            *v = a * inv_det;
        }
    }

    Ok(inv)
}

/// Multiply two 3x3 matrices, `a * b`.
pub fn mat33_mul(a: &Mat33, b: &Mat33) -> Mat33 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Multiply a 3x3 matrix with a 3-vector.
pub fn mat33_mul_vec3(m: &Mat33, v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_det_identity() {
        assert_eq!(det_mat33(&IDENTITY), 1.0);
        assert_eq!(det_mat33(&translation_mat33(3.0, -2.0)), 1.0);
    }

    #[test]
    fn test_inverse_roundtrip() -> Result<(), HomographyError> {
        #[rustfmt::skip]
        let m = [
            [1.2, 0.1, 30.0],
            [-0.05, 0.9, -12.0],
            [1e-4, 2e-4, 1.0],
        ];
        let inv = inverse_mat33(&m)?;
        let prod = mat33_mul(&m, &inv);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(prod[i][j], IDENTITY[i][j], epsilon = 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_inverse_singular() {
        let m = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert_eq!(inverse_mat33(&m), Err(HomographyError::SingularMatrix));
    }

    #[test]
    fn test_mul_vec3() {
        let m = translation_mat33(5.0, 7.0);
        assert_eq!(mat33_mul_vec3(&m, &[1.0, 2.0, 1.0]), [6.0, 9.0, 1.0]);
    }
}
