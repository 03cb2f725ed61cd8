#![forbid(unsafe_code)]

//! # `credating`
//!
//! Numeric kernels for Bayesian dating of clonal phylogenies: a coalescent
//! prior over leaf and internal-node times, and Poisson or Gamma clock
//! likelihoods over per-branch substitutions.
//!
//! All functions are pure. Each comes in a typed form ([`NodeTimes`],
//! [`BranchTable`]) and a flat form taking slices or a raw `n x 2` matrix
//! ([`coal_prior`], [`likelihood_poisson`], [`likelihood_gamma`]).
//!
//! ```
//! use credating::{BranchTable, coal_prior, poisson_log_likelihood};
//!
//! let prior = coal_prior(&[0.0, 0.0, 1.0], &[0.5], 1.0).expect("valid times");
//! assert!((prior + 0.5).abs() < 1e-12);
//!
//! let table = BranchTable::from_rows(&[[5.0, 2.0]]);
//! let ll = poisson_log_likelihood(&table, 2.5).expect("valid rate");
//! assert!((ll + 1.740_302).abs() < 1e-6);
//! ```

pub mod inference;
pub mod input;
pub mod models;
pub mod preprocess;
pub mod simulate;
pub mod utils;

pub use inference::{InferenceError, RateEstimate, RateSearchOptions, estimate_rate};
pub use input::{BranchTable, InputError, NodeTimes, TimeOrientation};
pub use preprocess::{BranchTableSummary, drop_zero_duration_branches, summarize_branch_table};
pub use simulate::{SimulationError, simulate_substitutions};

pub use models::coalescent::{
    CoalescentError, CoalescentPrior, LineageInterval, coal_prior, coalescent_log_prior,
    lineage_intervals,
};
pub use models::gamma::{
    gamma_log_likelihood, gamma_row_log_likelihoods, likelihood_gamma, log_gamma_density,
};
pub use models::likelihood::{ClockModel, LikelihoodError};
pub use models::poisson::{
    likelihood_poisson, log_poisson_pmf, poisson_log_likelihood, poisson_row_log_likelihoods,
};
