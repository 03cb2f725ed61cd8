/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Gamma likelihood: continuous relaxation of the Poisson clock.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Gamma clock
//!
//! Each branch's observed distance `x` is `Gamma(shape = rate * duration,
//! scale = 1)`, so its mean matches the Poisson clock while non-integer
//! distances (e.g. from a substitution-model branch length) are allowed.
//!
//! At `x = 0` the density is taken as its limit: `1` for `shape = 1`, `0`
//! (`-inf` on the log scale) for `shape > 1`, and unbounded for `shape < 1`,
//! which is reported as a numeric overflow. A branch of zero duration is a
//! point mass at zero.

use faer::Mat;
use statrs::function::gamma::ln_gamma;

use super::likelihood::{ClockModel, LikelihoodError, check_rate, sum_terms};
use crate::input::BranchTable;

/// Log-density of `Gamma(shape, scale = 1)` at `value`.
///
/// Returns `+inf` where the density is unbounded and `NaN` outside the
/// support of the parameters.
#[must_use]
pub fn log_gamma_density(value: f64, shape: f64) -> f64 {
    if !(value >= 0.0 && shape >= 0.0 && value.is_finite() && shape.is_finite()) {
        return f64::NAN;
    }
    if shape == 0.0 {
        return if value == 0.0 { 0.0 } else { f64::NEG_INFINITY };
    }
    if value == 0.0 {
        return match shape.partial_cmp(&1.0) {
            Some(std::cmp::Ordering::Less) => f64::INFINITY,
            Some(std::cmp::Ordering::Equal) => 0.0,
            _ => f64::NEG_INFINITY,
        };
    }
    (shape - 1.0).mul_add(value.ln(), -value) - ln_gamma(shape)
}

/// Per-branch Gamma log-likelihood terms.
///
/// # Errors
///
/// Returns `LikelihoodError::InvalidParameter` if `rate` is not strictly
/// positive and finite, `LikelihoodError::InvalidConfiguration` for a
/// malformed table, and `LikelihoodError::NumericOverflow` for a zero
/// distance on a branch whose shape is below one.
pub fn gamma_row_log_likelihoods(
    table: &BranchTable,
    rate: f64,
) -> Result<Vec<f64>, LikelihoodError> {
    check_rate(ClockModel::Gamma, rate)?;
    table.validate()?;
    table
        .rows()
        .enumerate()
        .map(|(row, (distance, duration))| {
            let term = log_gamma_density(distance, rate * duration);
            if term.is_nan() || term == f64::INFINITY {
                log::debug!(
                    "gamma density unbounded at branch {row} (distance {distance}, shape {})",
                    rate * duration
                );
                return Err(LikelihoodError::NumericOverflow { row });
            }
            Ok(term)
        })
        .collect()
}

/// Summed Gamma log-likelihood; `0.0` for an empty table.
///
/// # Errors
///
/// See [`gamma_row_log_likelihoods`].
pub fn gamma_log_likelihood(table: &BranchTable, rate: f64) -> Result<f64, LikelihoodError> {
    let terms = gamma_row_log_likelihoods(table, rate)?;
    sum_terms(&terms)
}

/// Gamma log-likelihood over a raw `n x 2` matrix.
///
/// # Errors
///
/// See [`gamma_log_likelihood`].
pub fn likelihood_gamma(tab: &Mat<f64>, rate: f64) -> Result<f64, LikelihoodError> {
    gamma_log_likelihood(&BranchTable::new(tab.clone()), rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::usize_to_f64;
    use approx::assert_relative_eq;

    #[test]
    fn zero_distance_at_unit_shape_is_zero() {
        let table = BranchTable::from_rows(&[[0.0, 1.0]]);
        assert_eq!(gamma_log_likelihood(&table, 1.0), Ok(0.0));
    }

    #[test]
    fn zero_distance_above_unit_shape_is_impossible() {
        let table = BranchTable::from_rows(&[[0.0, 3.0]]);
        assert_eq!(gamma_log_likelihood(&table, 1.0), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn zero_distance_below_unit_shape_overflows() {
        let table = BranchTable::from_rows(&[[1.0, 1.0], [0.0, 0.5]]);
        let err = gamma_log_likelihood(&table, 1.0).expect_err("unbounded density");
        assert_eq!(err, LikelihoodError::NumericOverflow { row: 1 });
    }

    #[test]
    fn zero_duration_is_point_mass() {
        let unmutated = BranchTable::from_rows(&[[0.0, 0.0]]);
        assert_eq!(gamma_log_likelihood(&unmutated, 2.0), Ok(0.0));
        let mutated = BranchTable::from_rows(&[[1.0, 0.0]]);
        assert_eq!(gamma_log_likelihood(&mutated, 2.0), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn positive_distance_matches_closed_form() {
        // shape = 2 * 1.5 = 3: 2 ln 4 - 4 - ln 2
        let table = BranchTable::from_rows(&[[4.0, 1.5]]);
        let ll = gamma_log_likelihood(&table, 2.0).expect("valid");
        let expected = 2.0 * 4.0_f64.ln() - 4.0 - 2.0_f64.ln();
        assert_relative_eq!(ll, expected, epsilon = 1.0e-10);
    }

    #[test]
    fn unit_shape_is_exponential() {
        let table = BranchTable::from_rows(&[[2.5, 0.5]]);
        let ll = gamma_log_likelihood(&table, 2.0).expect("valid");
        assert_relative_eq!(ll, -2.5, epsilon = 1.0e-12);
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let table = BranchTable::from_rows(&[[1.0, 1.0]]);
        for rate in [0.0, -1.0, f64::NAN] {
            let err = gamma_log_likelihood(&table, rate).expect_err("invalid rate");
            assert!(matches!(
                err,
                LikelihoodError::InvalidParameter { name: "rate", .. }
            ));
        }
    }

    #[test]
    fn empty_table_is_zero() {
        let table = BranchTable::new(Mat::<f64>::zeros(0, 2));
        assert_eq!(gamma_log_likelihood(&table, 0.5), Ok(0.0));
    }

    #[test]
    fn raw_matrix_surface_matches_typed_surface() {
        let tab = Mat::from_fn(3, 2, |i, j| {
            if j == 0 {
                0.5_f64.mul_add(usize_to_f64(i), 0.5)
            } else {
                2.0
            }
        });
        let raw = likelihood_gamma(&tab, 1.3).expect("valid");
        let typed = gamma_log_likelihood(&BranchTable::new(tab), 1.3).expect("valid");
        assert_relative_eq!(raw, typed);
    }
}
