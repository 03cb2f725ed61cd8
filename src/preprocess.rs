//! Branch-table diagnostics and filtering applied before fitting a clock.

use crate::input::BranchTable;
use crate::utils::usize_to_f64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchTableSummary {
    pub n_rows: usize,
    pub n_finite: usize,
    pub n_zero_substitutions: usize,
    pub n_zero_duration: usize,
    pub total_substitutions: f64,
    pub total_duration: f64,
    pub zero_substitution_share: f64,
}

impl BranchTableSummary {
    /// Substitutions per unit time pooled over branches, if any time elapsed.
    #[must_use]
    pub fn pooled_rate(&self) -> Option<f64> {
        (self.total_duration > 0.0).then(|| self.total_substitutions / self.total_duration)
    }
}

/// Count and total the rows of a branch table, skipping non-finite rows.
///
/// Expects a two-column table; extra columns are ignored.
#[must_use]
pub fn summarize_branch_table(table: &BranchTable) -> BranchTableSummary {
    let n_rows = table.nrows();
    let mut n_finite = 0usize;
    let mut n_zero_substitutions = 0usize;
    let mut n_zero_duration = 0usize;
    let mut total_substitutions = 0.0;
    let mut total_duration = 0.0;

    if table.table().ncols() >= 2 {
        for (substitutions, duration) in table.rows() {
            if !(substitutions.is_finite() && duration.is_finite()) {
                continue;
            }
            n_finite += 1;
            if substitutions == 0.0 {
                n_zero_substitutions += 1;
            }
            if duration == 0.0 {
                n_zero_duration += 1;
            }
            total_substitutions += substitutions;
            total_duration += duration;
        }
    }

    let zero_substitution_share = if n_finite > 0 {
        usize_to_f64(n_zero_substitutions) / usize_to_f64(n_finite)
    } else {
        0.0
    };

    BranchTableSummary {
        n_rows,
        n_finite,
        n_zero_substitutions,
        n_zero_duration,
        total_substitutions,
        total_duration,
        zero_substitution_share,
    }
}

/// Drop branches whose duration is at most `tolerance`.
///
/// Returns the filtered table and the indices of the kept rows.
#[must_use]
pub fn drop_zero_duration_branches(
    table: &BranchTable,
    tolerance: f64,
) -> (BranchTable, Vec<usize>) {
    if table.table().ncols() < 2 {
        return (BranchTable::from_rows(&[]), Vec::new());
    }
    let kept: Vec<usize> = (0..table.nrows())
        .filter(|&row| table.duration(row) > tolerance.abs())
        .collect();
    let rows: Vec<[f64; 2]> = kept
        .iter()
        .map(|&row| [table.substitutions(row), table.duration(row)])
        .collect();
    (BranchTable::from_rows(&rows), kept)
}
