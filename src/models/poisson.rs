/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Strict-clock Poisson likelihood over branch substitution counts.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Poisson clock
//!
//! Each branch's substitution count is `Poisson(rate * duration)`. Counts are
//! rounded to the nearest integer before evaluation; the log-factorial is
//! computed with `ln_gamma` so large counts do not overflow.

use faer::Mat;
use statrs::function::gamma::ln_gamma;

use super::likelihood::{ClockModel, LikelihoodError, check_rate, sum_terms};
use crate::input::{BranchTable, InputError};
use crate::utils::round_to_count;

/// Log-pmf of `Poisson(mean)` at a whole `count`.
///
/// A zero mean puts all mass on zero. Returns `NaN` for a negative or
/// non-finite count or mean.
#[must_use]
pub fn log_poisson_pmf(count: f64, mean: f64) -> f64 {
    if !(mean >= 0.0 && mean.is_finite() && count >= 0.0 && count.is_finite()) {
        return f64::NAN;
    }
    if mean == 0.0 {
        return if count == 0.0 { 0.0 } else { f64::NEG_INFINITY };
    }
    count.mul_add(mean.ln(), -mean) - ln_gamma(count + 1.0)
}

/// Per-branch Poisson log-likelihood terms.
///
/// # Errors
///
/// Returns `LikelihoodError::InvalidParameter` if `rate` is negative or
/// non-finite, `LikelihoodError::InvalidConfiguration` for a malformed
/// table, and `LikelihoodError::NumericOverflow` if `rate * duration`
/// overflows.
pub fn poisson_row_log_likelihoods(
    table: &BranchTable,
    rate: f64,
) -> Result<Vec<f64>, LikelihoodError> {
    check_rate(ClockModel::Poisson, rate)?;
    table.validate()?;
    table
        .rows()
        .enumerate()
        .map(|(row, (substitutions, duration))| -> Result<f64, LikelihoodError> {
            let count = round_to_count(substitutions)
                .ok_or(InputError::NonFiniteObservation { row })?;
            let term = log_poisson_pmf(count, rate * duration);
            if term.is_nan() || term == f64::INFINITY {
                log::debug!(
                    "poisson term not finite at branch {row} (count {count}, mean {})",
                    rate * duration
                );
                return Err(LikelihoodError::NumericOverflow { row });
            }
            Ok(term)
        })
        .collect()
}

/// Summed Poisson log-likelihood; `0.0` for an empty table.
///
/// # Errors
///
/// See [`poisson_row_log_likelihoods`].
pub fn poisson_log_likelihood(table: &BranchTable, rate: f64) -> Result<f64, LikelihoodError> {
    let terms = poisson_row_log_likelihoods(table, rate)?;
    sum_terms(&terms)
}

/// Poisson log-likelihood over a raw `n x 2` matrix.
///
/// # Errors
///
/// See [`poisson_log_likelihood`].
pub fn likelihood_poisson(tab: &Mat<f64>, rate: f64) -> Result<f64, LikelihoodError> {
    poisson_log_likelihood(&BranchTable::new(tab.clone()), rate)
}
