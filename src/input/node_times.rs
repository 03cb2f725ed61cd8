//! Leaf and internal-node times of a dated tree, flattened to two sequences.

use super::InputError;

/// How node times are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeOrientation {
    /// Larger values are older; 0 is the present.
    #[default]
    Ages,
    /// Larger values are more recent, e.g. sampling years.
    Dates,
}

/// Whether an event adds a sampled lineage or merges two lineages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeKind {
    Leaf,
    Internal,
}

/// A node time projected onto the age axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeEvent {
    pub age: f64,
    pub kind: NodeKind,
}

/// Leaf and internal-node times of one tree.
#[derive(Debug, Clone, Default)]
pub struct NodeTimes {
    pub leaves: Vec<f64>,
    pub internal: Vec<f64>,
    pub orientation: TimeOrientation,
}

impl NodeTimes {
    /// Node times measured as ages (backwards from the present).
    #[must_use]
    pub const fn from_ages(leaves: Vec<f64>, internal: Vec<f64>) -> Self {
        Self {
            leaves,
            internal,
            orientation: TimeOrientation::Ages,
        }
    }

    /// Node times measured as dates (forwards in calendar time).
    #[must_use]
    pub const fn from_dates(leaves: Vec<f64>, internal: Vec<f64>) -> Self {
        Self {
            leaves,
            internal,
            orientation: TimeOrientation::Dates,
        }
    }

    #[must_use]
    pub const fn with_orientation(mut self, orientation: TimeOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn internal_count(&self) -> usize {
        self.internal.len()
    }

    /// A fully resolved binary tree has one internal node fewer than leaves.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        !self.leaves.is_empty() && self.internal.len() + 1 == self.leaves.len()
    }

    /// # Errors
    ///
    /// Returns `InputError::NonFiniteTime` for any NaN or infinite time.
    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(&value) = self
            .leaves
            .iter()
            .chain(self.internal.iter())
            .find(|value| !value.is_finite())
        {
            return Err(InputError::NonFiniteTime { value });
        }
        Ok(())
    }

    /// All nodes as events sorted by ascending age, leaves first on ties.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if any time is non-finite.
    pub fn sorted_events(&self) -> Result<Vec<NodeEvent>, InputError> {
        self.validate()?;
        let to_age = |time: f64| match self.orientation {
            TimeOrientation::Ages => time,
            TimeOrientation::Dates => -time,
        };
        let mut events: Vec<NodeEvent> = self
            .leaves
            .iter()
            .map(|&time| NodeEvent {
                age: to_age(time),
                kind: NodeKind::Leaf,
            })
            .chain(self.internal.iter().map(|&time| NodeEvent {
                age: to_age(time),
                kind: NodeKind::Internal,
            }))
            .collect();
        events.sort_by(|a, b| a.age.total_cmp(&b.age).then(a.kind.cmp(&b.kind)));
        Ok(events)
    }
}
