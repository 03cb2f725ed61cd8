//! Maximum-likelihood clock rates for a fixed set of branch durations.

use statrs::function::gamma::digamma;
use thiserror::Error;

use crate::input::BranchTable;
use crate::models::gamma::gamma_log_likelihood;
use crate::models::likelihood::{ClockModel, LikelihoodError};
use crate::models::poisson::poisson_log_likelihood;

/// Errors for rate estimation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("rate bounds must satisfy 0 < min_rate ({min_rate}) < max_rate ({max_rate})")]
    InvalidBounds { min_rate: f64, max_rate: f64 },
    #[error("tolerance must be positive and finite")]
    InvalidTolerance,
    #[error("iterations must be positive")]
    InvalidIterations,
    #[error("branch table has no elapsed time")]
    NoElapsedTime,
    #[error("branch {row} has zero distance over positive time; gamma rate is unidentified")]
    ZeroDistance { row: usize },
    #[error(transparent)]
    Likelihood(#[from] LikelihoodError),
}

/// Search settings for rates without a closed form.
#[derive(Debug, Clone, Copy)]
pub struct RateSearchOptions {
    /// Smallest rate considered.
    pub min_rate: f64,
    /// Largest rate considered.
    pub max_rate: f64,
    /// Stop once the bracket on `ln(rate)` is narrower than this.
    pub tolerance: f64,
    /// Maximum bisection steps.
    pub max_iter: usize,
}

impl Default for RateSearchOptions {
    fn default() -> Self {
        Self {
            min_rate: 1.0e-12,
            max_rate: 1.0e12,
            tolerance: 1.0e-10,
            max_iter: 200,
        }
    }
}

impl RateSearchOptions {
    /// # Errors
    ///
    /// Returns `InferenceError` if bounds, tolerance or iteration count are invalid.
    pub fn validate(self) -> Result<(), InferenceError> {
        if !(self.min_rate > 0.0 && self.max_rate.is_finite() && self.min_rate < self.max_rate) {
            return Err(InferenceError::InvalidBounds {
                min_rate: self.min_rate,
                max_rate: self.max_rate,
            });
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(InferenceError::InvalidTolerance);
        }
        if self.max_iter == 0 {
            return Err(InferenceError::InvalidIterations);
        }
        Ok(())
    }
}

/// A fitted clock rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    pub rate: f64,
    pub log_likelihood: f64,
    /// Bisection steps taken; `0` for closed-form estimates.
    pub iterations: usize,
    /// True if the maximum lies at a search bound.
    pub at_boundary: bool,
}

/// Maximum-likelihood rate of `model` for the table.
///
/// # Errors
///
/// Returns `InferenceError` if the options are invalid, no time elapsed on
/// any branch, the gamma rate is unidentified, or the likelihood fails.
pub fn estimate_rate(
    table: &BranchTable,
    model: ClockModel,
    options: RateSearchOptions,
) -> Result<RateEstimate, InferenceError> {
    options.validate()?;
    table.validate().map_err(LikelihoodError::from)?;
    match model {
        ClockModel::Poisson => estimate_poisson_rate(table),
        ClockModel::Gamma => estimate_gamma_rate(table, options),
    }
}

/// Closed form: total (rounded) substitutions over total time.
fn estimate_poisson_rate(table: &BranchTable) -> Result<RateEstimate, InferenceError> {
    // cells are finite and non-negative once validated
    let mut substitutions = 0.0;
    let mut elapsed = 0.0;
    for (substitution, duration) in table.rows() {
        substitutions += substitution.round();
        elapsed += duration;
    }
    if elapsed <= 0.0 {
        return Err(InferenceError::NoElapsedTime);
    }
    let rate = substitutions / elapsed;
    Ok(RateEstimate {
        rate,
        log_likelihood: poisson_log_likelihood(table, rate)?,
        iterations: 0,
        at_boundary: false,
    })
}

/// Root of the gamma score `sum e (ln x - digamma(rate * e))`, bisected on `ln(rate)`.
fn estimate_gamma_rate(
    table: &BranchTable,
    options: RateSearchOptions,
) -> Result<RateEstimate, InferenceError> {
    let mut timed = Vec::with_capacity(table.nrows());
    for (row, (distance, duration)) in table.rows().enumerate() {
        if duration > 0.0 {
            if distance == 0.0 {
                return Err(InferenceError::ZeroDistance { row });
            }
            timed.push((distance.ln(), duration));
        }
    }
    if timed.is_empty() {
        return Err(InferenceError::NoElapsedTime);
    }
    let score = |log_rate: f64| -> f64 {
        let rate = log_rate.exp();
        timed
            .iter()
            .map(|&(log_distance, duration)| duration * (log_distance - digamma(rate * duration)))
            .sum()
    };

    let mut low = options.min_rate.ln();
    let mut high = options.max_rate.ln();
    let mut iterations = 0;
    let (log_rate, at_boundary) = if score(low) <= 0.0 {
        (low, true)
    } else if score(high) >= 0.0 {
        (high, true)
    } else {
        while high - low > options.tolerance && iterations < options.max_iter {
            let mid = 0.5 * (low + high);
            let value = score(mid);
            log::trace!("gamma rate bisection step {iterations}: ln rate {mid}, score {value}");
            if value > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
            iterations += 1;
        }
        (0.5 * (low + high), false)
    };

    let rate = log_rate.exp();
    Ok(RateEstimate {
        rate,
        log_likelihood: gamma_log_likelihood(table, rate)?,
        iterations,
        at_boundary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_options_are_valid() {
        assert_eq!(RateSearchOptions::default().validate(), Ok(()));
    }

    #[test]
    fn options_reject_inverted_bounds() {
        let options = RateSearchOptions {
            min_rate: 2.0,
            max_rate: 1.0,
            ..RateSearchOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(InferenceError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn options_reject_zero_iterations() {
        let options = RateSearchOptions {
            max_iter: 0,
            ..RateSearchOptions::default()
        };
        assert_eq!(options.validate(), Err(InferenceError::InvalidIterations));
    }

    #[test]
    fn poisson_rate_is_pooled_ratio() {
        let table = BranchTable::from_rows(&[[3.0, 1.0], [5.0, 3.0]]);
        let estimate =
            estimate_rate(&table, ClockModel::Poisson, RateSearchOptions::default()).expect("fit");
        assert_relative_eq!(estimate.rate, 2.0);
        assert_eq!(estimate.iterations, 0);
    }

    #[test]
    fn poisson_rate_keeps_counts_beyond_u64() {
        let table = BranchTable::from_rows(&[[3.0e19, 1.0e19], [2.6, 1.0]]);
        let estimate =
            estimate_rate(&table, ClockModel::Poisson, RateSearchOptions::default()).expect("fit");
        assert_relative_eq!(estimate.rate, 3.0, max_relative = 1.0e-12);
    }

    #[test]
    fn poisson_rate_needs_elapsed_time() {
        let table = BranchTable::from_rows(&[[3.0, 0.0]]);
        let err = estimate_rate(&table, ClockModel::Poisson, RateSearchOptions::default())
            .expect_err("no time");
        assert_eq!(err, InferenceError::NoElapsedTime);
    }

    #[test]
    fn gamma_rate_zeroes_the_score() {
        let table = BranchTable::from_rows(&[[2.0, 1.0], [7.5, 3.0], [0.4, 0.5]]);
        let estimate =
            estimate_rate(&table, ClockModel::Gamma, RateSearchOptions::default()).expect("fit");
        assert!(!estimate.at_boundary);
        let step = 1.0e-4;
        let here = estimate.log_likelihood;
        let below = gamma_log_likelihood(&table, estimate.rate * (1.0 - step)).expect("valid");
        let above = gamma_log_likelihood(&table, estimate.rate * (1.0 + step)).expect("valid");
        assert!(here >= below);
        assert!(here >= above);
    }

    #[test]
    fn gamma_rate_single_unit_branch_solves_digamma() {
        // digamma(rate) = ln x
        let x: f64 = 4.0;
        let table = BranchTable::from_rows(&[[x, 1.0]]);
        let estimate =
            estimate_rate(&table, ClockModel::Gamma, RateSearchOptions::default()).expect("fit");
        assert_relative_eq!(digamma(estimate.rate), x.ln(), epsilon = 1.0e-8);
    }

    #[test]
    fn gamma_rate_rejects_zero_distance_on_timed_branch() {
        let table = BranchTable::from_rows(&[[1.0, 1.0], [0.0, 2.0]]);
        let err = estimate_rate(&table, ClockModel::Gamma, RateSearchOptions::default())
            .expect_err("unidentified");
        assert_eq!(err, InferenceError::ZeroDistance { row: 1 });
    }

    #[test]
    fn gamma_rate_clamps_to_bounds() {
        let table = BranchTable::from_rows(&[[1.0e6, 1.0]]);
        let options = RateSearchOptions {
            max_rate: 10.0,
            ..RateSearchOptions::default()
        };
        let estimate = estimate_rate(&table, ClockModel::Gamma, options).expect("fit");
        assert!(estimate.at_boundary);
        assert_relative_eq!(estimate.rate, 10.0, max_relative = 1.0e-12);
    }
}
