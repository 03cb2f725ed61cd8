//! # Clock-model likelihoods
//!
//! Shared error type and dispatch for the per-branch substitution models.
//! Each branch contributes one term; the table log-likelihood is their sum.
//! A term of `-inf` marks an impossible observation and is a valid result.
//! `NaN` and `+inf` are never returned.

use thiserror::Error;

use super::gamma::{gamma_log_likelihood, gamma_row_log_likelihoods};
use super::poisson::{poisson_log_likelihood, poisson_row_log_likelihoods};
use crate::input::{BranchTable, InputError};

/// Errors returned by the branch likelihoods.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LikelihoodError {
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error(transparent)]
    InvalidConfiguration(#[from] InputError),
    #[error("non-finite log-likelihood at branch {row}")]
    NumericOverflow { row: usize },
}

/// Substitution model linking a branch's duration to its observed distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockModel {
    /// Integer substitution counts, `Poisson(rate * duration)`.
    #[default]
    Poisson,
    /// Continuous distances, `Gamma(shape = rate * duration, scale = 1)`.
    Gamma,
}

impl ClockModel {
    /// Summed log-likelihood of the table at `rate`.
    ///
    /// # Errors
    ///
    /// Returns `LikelihoodError` if the rate is out of the model's domain,
    /// the table is malformed, or a branch term overflows.
    pub fn log_likelihood(self, table: &BranchTable, rate: f64) -> Result<f64, LikelihoodError> {
        match self {
            Self::Poisson => poisson_log_likelihood(table, rate),
            Self::Gamma => gamma_log_likelihood(table, rate),
        }
    }

    /// Per-branch log-likelihood terms at `rate`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ClockModel::log_likelihood`].
    pub fn row_log_likelihoods(
        self,
        table: &BranchTable,
        rate: f64,
    ) -> Result<Vec<f64>, LikelihoodError> {
        match self {
            Self::Poisson => poisson_row_log_likelihoods(table, rate),
            Self::Gamma => gamma_row_log_likelihoods(table, rate),
        }
    }

    /// Whether `rate` lies in the model's domain (`>= 0` Poisson, `> 0` Gamma).
    #[must_use]
    pub fn accepts_rate(self, rate: f64) -> bool {
        match self {
            Self::Poisson => rate.is_finite() && rate >= 0.0,
            Self::Gamma => rate.is_finite() && rate > 0.0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Poisson => "poisson",
            Self::Gamma => "gamma",
        }
    }
}

/// Reject a rate outside the model's domain.
pub(crate) fn check_rate(model: ClockModel, rate: f64) -> Result<(), LikelihoodError> {
    if model.accepts_rate(rate) {
        Ok(())
    } else {
        log::debug!("{} likelihood rejected rate {rate}", model.name());
        Err(LikelihoodError::InvalidParameter {
            name: "rate",
            value: rate,
        })
    }
}

/// Sum branch terms, surfacing `NaN` or `+inf` as overflow.
pub(crate) fn sum_terms(terms: &[f64]) -> Result<f64, LikelihoodError> {
    let mut total = 0.0;
    for (row, &term) in terms.iter().enumerate() {
        if term.is_nan() || term == f64::INFINITY {
            log::debug!("branch {row} produced non-finite term {term}");
            return Err(LikelihoodError::NumericOverflow { row });
        }
        total += term;
    }
    if total.is_nan() || total == f64::INFINITY {
        return Err(LikelihoodError::NumericOverflow {
            row: terms.len().saturating_sub(1),
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn poisson_accepts_zero_rate_gamma_does_not() {
        assert!(ClockModel::Poisson.accepts_rate(0.0));
        assert!(!ClockModel::Gamma.accepts_rate(0.0));
        assert!(!ClockModel::Poisson.accepts_rate(f64::NAN));
        assert!(!ClockModel::Gamma.accepts_rate(f64::INFINITY));
    }

    #[test]
    fn rows_sum_to_total_for_both_models() {
        let table = BranchTable::from_rows(&[[2.0, 1.0], [0.5, 0.3], [7.0, 2.5]]);
        for model in [ClockModel::Poisson, ClockModel::Gamma] {
            let rows = model.row_log_likelihoods(&table, 1.7).expect("valid");
            let total = model.log_likelihood(&table, 1.7).expect("valid");
            assert_relative_eq!(rows.iter().sum::<f64>(), total, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn sum_terms_keeps_negative_infinity() {
        let total = sum_terms(&[-1.0, f64::NEG_INFINITY]).expect("-inf is allowed");
        assert_eq!(total, f64::NEG_INFINITY);
    }

    #[test]
    fn sum_terms_flags_positive_infinity() {
        let err = sum_terms(&[-1.0, f64::INFINITY]).expect_err("+inf overflows");
        assert_eq!(err, LikelihoodError::NumericOverflow { row: 1 });
    }

    #[test]
    fn input_errors_become_configuration_errors() {
        let table = BranchTable::from_rows(&[[-1.0, 1.0]]);
        let err = ClockModel::Poisson
            .log_likelihood(&table, 1.0)
            .expect_err("negative count");
        assert!(matches!(err, LikelihoodError::InvalidConfiguration(_)));
    }
}
