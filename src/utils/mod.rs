/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Shared numeric helpers for the prior and likelihood kernels.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities
//!
//! Small helpers for working with faer matrices and converting counts.

use faer::Mat;
use num_traits::ToPrimitive;

#[must_use]
pub fn matrix_is_finite(matrix: &Mat<f64>) -> bool {
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            if !matrix[(i, j)].is_finite() {
                return false;
            }
        }
    }
    true
}

#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}

/// Round a non-negative observation to the nearest whole count.
///
/// The count stays in `f64`, so finite values of any size are kept.
/// Returns `None` for negative or non-finite values.
#[must_use]
pub fn round_to_count(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then(|| value.round())
}
