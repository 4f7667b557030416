/// An error type for the geometry module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum HomographyError {
    /// The two point sets do not have the same number of points.
    #[error("Correspondence sets must have the same length ({0} vs {1})")]
    MismatchedCorrespondences(usize, usize),

    /// The matrix has a zero determinant and cannot be inverted.
    #[error("Cannot invert a singular 3x3 matrix")]
    SingularMatrix,
}
