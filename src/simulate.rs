//! Draw branch observations for known durations under a clock model.
//!
//! Randomness is threaded through the caller's RNG, so a seeded `StdRng`
//! reproduces a table exactly.
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use credating::{ClockModel, simulate_substitutions};
//!
//! let mut rng = StdRng::seed_from_u64(11);
//! let table = simulate_substitutions(&[0.5, 1.0, 2.0], 4.0, ClockModel::Poisson, &mut rng)
//!     .expect("valid rate and durations");
//! assert_eq!(table.nrows(), 3);
//! ```

use rand::RngExt;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::input::BranchTable;
use crate::models::likelihood::ClockModel;

// Largest Poisson mean drawn by multiplication in one go; larger means are split.
const POISSON_CHUNK: f64 = 30.0;
// Above this mean, Poisson draws use the rounded normal approximation.
const POISSON_NORMAL_MEAN: f64 = 1_000.0;

/// Errors returned by the simulators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("branch {row} has invalid duration ({value})")]
    InvalidDuration { row: usize, value: f64 },
    #[error("branch {row} has a non-finite expected distance")]
    NumericOverflow { row: usize },
}

/// Simulate one observation per branch duration.
///
/// Poisson tables hold whole substitution counts; Gamma tables hold
/// continuous distances with the same mean.
///
/// # Errors
///
/// Returns `SimulationError` if the rate is outside the model's domain, a
/// duration is negative or non-finite, or `rate * duration` overflows.
pub fn simulate_substitutions(
    durations: &[f64],
    rate: f64,
    model: ClockModel,
    rng: &mut StdRng,
) -> Result<BranchTable, SimulationError> {
    if !model.accepts_rate(rate) {
        return Err(SimulationError::InvalidParameter {
            name: "rate",
            value: rate,
        });
    }
    if let Some((row, &value)) = durations
        .iter()
        .enumerate()
        .find(|(_, duration)| !(duration.is_finite() && **duration >= 0.0))
    {
        return Err(SimulationError::InvalidDuration { row, value });
    }
    if let Some(row) = durations
        .iter()
        .position(|duration| !(rate * duration).is_finite())
    {
        log::debug!("expected distance overflows at branch {row} (rate {rate})");
        return Err(SimulationError::NumericOverflow { row });
    }

    let substitutions: Vec<f64> = durations
        .iter()
        .map(|&duration| {
            let mean = rate * duration;
            match model {
                ClockModel::Poisson => sample_poisson(mean, rng),
                ClockModel::Gamma => sample_gamma(mean, rng),
            }
        })
        .collect();
    log::debug!(
        "simulated {} {} branches at rate {rate}",
        durations.len(),
        model.name()
    );
    Ok(BranchTable::from_columns(&substitutions, durations))
}

fn sample_poisson(mean: f64, rng: &mut StdRng) -> f64 {
    if mean > POISSON_NORMAL_MEAN {
        return mean.sqrt().mul_add(sample_standard_normal(rng), mean).round().max(0.0);
    }
    let mut remaining = mean;
    let mut total = 0_u64;
    while remaining > 0.0 {
        let chunk = remaining.min(POISSON_CHUNK);
        total += sample_poisson_small(chunk, rng);
        remaining -= chunk;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    total
}

fn sample_poisson_small(mean: f64, rng: &mut StdRng) -> u64 {
    let threshold = (-mean).exp();
    let mut count = 0;
    let mut product = rng.random::<f64>();
    while product > threshold {
        count += 1;
        product *= rng.random::<f64>();
    }
    count
}

// Marsaglia-Tsang; shapes below one are boosted by `U^(1/shape)`.
fn sample_gamma(shape: f64, rng: &mut StdRng) -> f64 {
    if shape <= 0.0 {
        return 0.0;
    }
    if shape < 1.0 {
        let boost = rng.random::<f64>().powf(shape.recip());
        return sample_gamma(shape + 1.0, rng) * boost;
    }
    let d = shape - 1.0 / 3.0;
    let c = (9.0 * d).sqrt().recip();
    loop {
        let x = sample_standard_normal(rng);
        let v = c.mul_add(x, 1.0);
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u = rng.random::<f64>();
        let x2 = x * x;
        if u < 0.0331_f64.mul_add(-(x2 * x2), 1.0) {
            return d * v;
        }
        if u.ln() < 0.5_f64.mul_add(x2, d * (1.0 - v + v.ln())) {
            return d * v;
        }
    }
}

// Marsaglia polar method; the second variate of each accepted pair is discarded.
fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    loop {
        let u = 2.0_f64.mul_add(rng.random::<f64>(), -1.0);
        let v = 2.0_f64.mul_add(rng.random::<f64>(), -1.0);
        let radius = u.mul_add(u, v * v);
        if radius > 0.0 && radius < 1.0 {
            return u * (-2.0 * radius.ln() / radius).sqrt();
        }
    }
}
