//! # Models
//!
//! The coalescent prior over node times and the clock-model likelihoods
//! (Poisson and Gamma) over per-branch substitutions.

pub mod coalescent;
pub mod gamma;
pub mod likelihood;
pub mod poisson;
