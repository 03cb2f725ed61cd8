/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Constant-size coalescent prior over leaf and internal-node times.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Coalescent prior
//!
//! Log-density of node times under the Kingman coalescent with time scale
//! `neg = Ne * g`. Leaves and internal nodes are merged into one sequence of
//! ascending age; while `k` lineages are active, each unit of time costs
//! `k (k - 1) / 2 / neg` on the log scale, and every coalescence adds
//! `-ln(neg)`. Nothing is accumulated after the oldest node.
//!
//! Heterochronous sampling is handled naturally: a leaf older than some
//! internal node simply joins the lineage count when its age is reached.
//!
//! # Examples
//!
//! ```
//! use credating::{CoalescentPrior, NodeTimes};
//!
//! let prior = CoalescentPrior::new(2.0).expect("positive time scale");
//! let times = NodeTimes::from_ages(vec![0.0, 0.0], vec![1.0]);
//!
//! // one pair waiting one unit of time, then one coalescence
//! let expected = -1.0 / 2.0 - 2.0_f64.ln();
//! assert!((prior.log_density(&times).unwrap() - expected).abs() < 1e-12);
//! ```

use thiserror::Error;

use crate::input::node_times::{NodeEvent, NodeKind};
use crate::input::{InputError, NodeTimes};
use crate::utils::usize_to_f64;

/// Errors returned by the coalescent prior.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoalescentError {
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error(transparent)]
    InvalidTimes(#[from] InputError),
    #[error("invalid configuration: coalescence at age {age} with {lineages} active lineage(s)")]
    InvalidConfiguration { age: f64, lineages: usize },
    #[error("invalid configuration: {internal} internal nodes cannot resolve {leaves} leaves")]
    IncompleteTree { leaves: usize, internal: usize },
    #[error("coalescent log-density is not finite")]
    NumericOverflow,
}

/// A stretch of time with a constant number of lineages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineageInterval {
    pub start: f64,
    pub end: f64,
    pub lineages: usize,
}

impl LineageInterval {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Number of lineage pairs that could coalesce, `k (k - 1) / 2`.
    #[must_use]
    pub fn pairs(&self) -> f64 {
        let k = usize_to_f64(self.lineages);
        k * (k - 1.0).max(0.0) / 2.0
    }
}

/// Kingman coalescent prior with a fixed time scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoalescentPrior {
    neg: f64,
    require_complete_tree: bool,
}

impl CoalescentPrior {
    /// # Errors
    ///
    /// Returns `CoalescentError::InvalidParameter` unless `neg` is finite and
    /// strictly positive.
    pub fn new(neg: f64) -> Result<Self, CoalescentError> {
        if !(neg.is_finite() && neg > 0.0) {
            log::debug!("coalescent prior rejected time scale {neg}");
            return Err(CoalescentError::InvalidParameter {
                name: "neg",
                value: neg,
            });
        }
        Ok(Self {
            neg,
            require_complete_tree: false,
        })
    }

    /// Also require one internal node fewer than leaves.
    #[must_use]
    pub const fn with_complete_tree(mut self, required: bool) -> Self {
        self.require_complete_tree = required;
        self
    }

    #[must_use]
    pub const fn neg(&self) -> f64 {
        self.neg
    }

    /// Log-density of the node times.
    ///
    /// # Errors
    ///
    /// Returns `CoalescentError` if a time is non-finite, an internal node
    /// would merge fewer than two lineages, the tree is required to be
    /// complete and is not, or the result overflows.
    pub fn log_density(&self, times: &NodeTimes) -> Result<f64, CoalescentError> {
        if self.require_complete_tree
            && !(times.is_fully_resolved() || times.leaf_count() + times.internal_count() == 0)
        {
            return Err(CoalescentError::IncompleteTree {
                leaves: times.leaf_count(),
                internal: times.internal_count(),
            });
        }
        let events = times.sorted_events()?;
        let mut waiting = 0.0;
        walk_events(&events, |interval| {
            waiting += interval.pairs() * interval.length();
        })?;
        let log_density =
            (-usize_to_f64(times.internal_count())).mul_add(self.neg.ln(), -waiting / self.neg);
        if !log_density.is_finite() {
            log::debug!(
                "coalescent log-density overflowed (waiting {waiting}, neg {})",
                self.neg
            );
            return Err(CoalescentError::NumericOverflow);
        }
        Ok(log_density)
    }
}

/// Log-density of `times` under a coalescent with time scale `neg`.
///
/// # Errors
///
/// See [`CoalescentPrior::new`] and [`CoalescentPrior::log_density`].
pub fn coalescent_log_prior(times: &NodeTimes, neg: f64) -> Result<f64, CoalescentError> {
    CoalescentPrior::new(neg)?.log_density(times)
}

/// Coalescent log-prior over flat leaf and internal-node ages.
///
/// # Errors
///
/// See [`coalescent_log_prior`].
pub fn coal_prior(leaves: &[f64], intnodes: &[f64], neg: f64) -> Result<f64, CoalescentError> {
    coalescent_log_prior(&NodeTimes::from_ages(leaves.to_vec(), intnodes.to_vec()), neg)
}

/// Lineage-through-time intervals of positive length, oldest last.
///
/// # Errors
///
/// Returns `CoalescentError` if a time is non-finite or an internal node
/// would merge fewer than two lineages.
pub fn lineage_intervals(times: &NodeTimes) -> Result<Vec<LineageInterval>, CoalescentError> {
    let events = times.sorted_events()?;
    let mut intervals = Vec::with_capacity(events.len());
    walk_events(&events, |interval| {
        if interval.length() > 0.0 {
            intervals.push(interval);
        }
    })?;
    Ok(intervals)
}

fn walk_events(
    events: &[NodeEvent],
    mut visit: impl FnMut(LineageInterval),
) -> Result<(), CoalescentError> {
    let mut lineages = 0_usize;
    let mut previous = events.first().map_or(0.0, |event| event.age);
    for event in events {
        visit(LineageInterval {
            start: previous,
            end: event.age,
            lineages,
        });
        match event.kind {
            NodeKind::Leaf => lineages += 1,
            NodeKind::Internal => {
                if lineages < 2 {
                    log::debug!(
                        "coalescence at age {} with {lineages} active lineage(s)",
                        event.age
                    );
                    return Err(CoalescentError::InvalidConfiguration {
                        age: event.age,
                        lineages,
                    });
                }
                lineages -= 1;
            }
        }
        previous = event.age;
    }
    Ok(())
}
