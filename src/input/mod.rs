//! # Model inputs
//!
//! Defines a light-weight container for per-branch observations and the
//! node-time sequences consumed by the coalescent prior.
//!
//! # Examples
//!
//! ```
//! use credating::BranchTable;
//!
//! // two branches: (substitutions, duration)
//! let table = BranchTable::from_rows(&[[3.0, 1.5], [0.0, 0.25]]);
//!
//! assert!(table.validate().is_ok());
//! assert_eq!(table.nrows(), 2);
//! ```
//!
//! ```
//! use faer::Mat;
//! use credating::BranchTable;
//!
//! let table = BranchTable::new(Mat::from_fn(2, 3, |_i, _j| 1.0));
//!
//! assert!(table.validate().is_err());
//! ```

use faer::Mat;
use thiserror::Error;

use crate::utils::matrix_is_finite;

pub mod node_times;

pub use node_times::{NodeTimes, TimeOrientation};

/// Column holding observed substitutions.
pub const SUBSTITUTIONS: usize = 0;
/// Column holding branch durations.
pub const DURATION: usize = 1;

/// Errors returned when validating model inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("branch table must have exactly two columns, found {cols}")]
    InvalidTableShape { cols: usize },
    #[error("branch table row {row} contains non-finite values")]
    NonFiniteObservation { row: usize },
    #[error("branch table row {row} has negative substitutions ({value})")]
    NegativeSubstitutions { row: usize, value: f64 },
    #[error("branch table row {row} has negative duration ({value})")]
    NegativeDuration { row: usize, value: f64 },
    #[error("node times contain a non-finite value ({value})")]
    NonFiniteTime { value: f64 },
}

/// Per-branch observations: substitutions in column 0, duration in column 1.
#[derive(Debug, Clone)]
pub struct BranchTable {
    table: Mat<f64>,
}

impl BranchTable {
    #[must_use]
    pub const fn new(table: Mat<f64>) -> Self {
        Self { table }
    }

    /// Build a table from `(substitutions, duration)` rows.
    #[must_use]
    pub fn from_rows(rows: &[[f64; 2]]) -> Self {
        Self::new(Mat::from_fn(rows.len(), 2, |i, j| rows[i][j]))
    }

    /// Build a table from parallel substitution and duration columns.
    ///
    /// The shorter column bounds the number of rows.
    #[must_use]
    pub fn from_columns(substitutions: &[f64], durations: &[f64]) -> Self {
        let n = substitutions.len().min(durations.len());
        Self::new(Mat::from_fn(n, 2, |i, j| {
            if j == SUBSTITUTIONS {
                substitutions[i]
            } else {
                durations[i]
            }
        }))
    }

    #[must_use]
    pub const fn table(&self) -> &Mat<f64> {
        &self.table
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.table.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.nrows() == 0
    }

    #[must_use]
    pub fn substitutions(&self, row: usize) -> f64 {
        self.table[(row, SUBSTITUTIONS)]
    }

    #[must_use]
    pub fn duration(&self, row: usize) -> f64 {
        self.table[(row, DURATION)]
    }

    /// Iterate over `(substitutions, duration)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.nrows()).map(|i| (self.substitutions(i), self.duration(i)))
    }

    /// Validate shape and values.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the table is not `n x 2` or holds non-finite
    /// or negative cells.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.table.ncols() != 2 {
            return Err(InputError::InvalidTableShape {
                cols: self.table.ncols(),
            });
        }
        if !matrix_is_finite(&self.table) {
            let row = (0..self.nrows())
                .find(|&i| !(self.substitutions(i).is_finite() && self.duration(i).is_finite()))
                .unwrap_or(0);
            return Err(InputError::NonFiniteObservation { row });
        }
        for (row, (substitutions, duration)) in self.rows().enumerate() {
            if substitutions < 0.0 {
                return Err(InputError::NegativeSubstitutions {
                    row,
                    value: substitutions,
                });
            }
            if duration < 0.0 {
                return Err(InputError::NegativeDuration {
                    row,
                    value: duration,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_empty_two_column_table() {
        let table = BranchTable::new(Mat::<f64>::zeros(0, 2));
        assert!(table.validate().is_ok());
        assert!(table.is_empty());
    }

    #[test]
    fn validate_rejects_wrong_shape() {
        let table = BranchTable::new(Mat::from_fn(2, 1, |_i, _j| 1.0));
        let err = table.validate().expect_err("single column should fail");
        assert_eq!(err, InputError::InvalidTableShape { cols: 1 });
    }

    #[test]
    fn validate_reports_first_non_finite_row() {
        let table = BranchTable::from_rows(&[[1.0, 1.0], [2.0, f64::NAN], [f64::INFINITY, 1.0]]);
        let err = table.validate().expect_err("nan should fail");
        assert_eq!(err, InputError::NonFiniteObservation { row: 1 });
    }

    #[test]
    fn validate_rejects_negative_substitutions() {
        let table = BranchTable::from_rows(&[[1.0, 1.0], [-1.0, 1.0]]);
        let err = table.validate().expect_err("negative count should fail");
        assert_eq!(
            err,
            InputError::NegativeSubstitutions {
                row: 1,
                value: -1.0
            }
        );
    }

    #[test]
    fn validate_rejects_negative_duration() {
        let table = BranchTable::from_rows(&[[1.0, -0.5]]);
        let err = table.validate().expect_err("negative duration should fail");
        assert_eq!(err, InputError::NegativeDuration { row: 0, value: -0.5 });
    }

    #[test]
    fn table_exposes_the_underlying_matrix() {
        let table = BranchTable::from_rows(&[[4.0, 2.0]]);
        assert_eq!(table.table().ncols(), 2);
        assert!((table.table()[(0, DURATION)] - 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn from_columns_truncates_to_shorter_column() {
        let table = BranchTable::from_columns(&[1.0, 2.0, 3.0], &[0.5, 0.25]);
        assert_eq!(table.nrows(), 2);
        assert!((table.substitutions(1) - 2.0).abs() < 1.0e-12);
        assert!((table.duration(1) - 0.25).abs() < 1.0e-12);
    }
}
