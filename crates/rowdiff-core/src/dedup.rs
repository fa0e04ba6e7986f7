//! Exact-duplicate cancellation
//!
//! Rows that are identical on both sides (ignoring excluded columns) are
//! removed before best-match scoring, so unchanged rows never take a match
//! slot from a row that actually changed.

use crate::compare::ExcludedColumns;
use crate::table::{CellValue, Row};
use std::collections::HashMap;

/// Grouping key of a row: its non-excluded cells as canonical text.
///
/// `None` marks an empty cell so it never collides with empty text.
pub type RowKey = Vec<Option<String>>;

/// Row indices that survive cancellation, in original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Survivors {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    /// Number of (left, right) pairs that were cancelled
    pub cancelled: usize,
}

impl Survivors {
    /// Every row survives; used when cancellation is turned off
    pub fn all(left_rows: usize, right_rows: usize) -> Self {
        Self {
            left: (0..left_rows).collect(),
            right: (0..right_rows).collect(),
            cancelled: 0,
        }
    }
}

/// Build the grouping key of a row
pub fn row_key(row: &Row, excluded: &ExcludedColumns) -> RowKey {
    row.cells
        .iter()
        .enumerate()
        .filter(|(i, _)| !excluded.contains(*i))
        .map(|(_, cell)| match cell {
            CellValue::Empty => None,
            other => Some(other.canonical_text()),
        })
        .collect()
}

fn group_rows(rows: &[Row], excluded: &ExcludedColumns) -> HashMap<RowKey, Vec<usize>> {
    let mut groups: HashMap<RowKey, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        groups.entry(row_key(row, excluded)).or_default().push(index);
    }
    groups
}

/// Cancel rows that appear unchanged in both tables.
///
/// For each key present on both sides, the first `min(count_left, count_right)`
/// rows of each side are dropped. Survivors keep their original order.
pub fn cancel_exact_duplicates(
    left: &[Row],
    right: &[Row],
    excluded: &ExcludedColumns,
) -> Survivors {
    let left_groups = group_rows(left, excluded);
    let right_groups = group_rows(right, excluded);

    let mut left_cancelled = vec![false; left.len()];
    let mut right_cancelled = vec![false; right.len()];
    let mut cancelled = 0;

    for (key, left_indices) in &left_groups {
        let Some(right_indices) = right_groups.get(key) else {
            continue;
        };
        let n = left_indices.len().min(right_indices.len());
        for &i in &left_indices[..n] {
            left_cancelled[i] = true;
        }
        for &i in &right_indices[..n] {
            right_cancelled[i] = true;
        }
        cancelled += n;
    }

    let survivors = Survivors {
        left: (0..left.len()).filter(|&i| !left_cancelled[i]).collect(),
        right: (0..right.len()).filter(|&i| !right_cancelled[i]).collect(),
        cancelled,
    };

    log::debug!(
        "exact-duplicate pass cancelled {} pairs ({} left / {} right rows remain)",
        survivors.cancelled,
        survivors.left.len(),
        survivors.right.len()
    );

    survivors
}
