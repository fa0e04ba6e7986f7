//! Projection of reconciliation entries into annotated output rows

use crate::compare::{difference_mask, ExcludedColumns};
use crate::reconcile::Entry;
use crate::table::{CellValue, Row, Side, Table};
use serde::{Deserialize, Serialize};

/// How a row relates to the other table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RowStatus {
    /// Paired with a row of the other table
    Matched {
        score: usize,
        /// No non-excluded cell differs
        identical: bool,
    },
    /// Left row without counterpart
    Removed,
    /// Right row without counterpart
    Added,
}

impl RowStatus {
    /// Short name used by renderers
    pub fn name(&self) -> &'static str {
        match self {
            RowStatus::Matched { identical: true, .. } => "same",
            RowStatus::Matched { .. } => "changed",
            RowStatus::Removed => "removed",
            RowStatus::Added => "added",
        }
    }
}

/// A cell with its difference flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCell {
    pub value: CellValue,
    /// Set when the counterpart row holds a different value here.
    /// Always false for excluded columns and for unmatched rows.
    pub differs: bool,
}

/// One output row, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub side: Side,
    /// Index of the row in its own table
    pub row_index: usize,
    /// Label of the table the row came from
    pub source: String,
    #[serde(flatten)]
    pub status: RowStatus,
    /// Index of the paired row in the other table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<usize>,
    pub cells: Vec<AnnotatedCell>,
}

impl AnnotatedRow {
    /// Indices of the cells flagged as different
    pub fn differing_columns(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.differs)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.status, RowStatus::Matched { .. })
    }
}

fn annotate(row: &Row, mask: Option<&[bool]>) -> Vec<AnnotatedCell> {
    row.cells
        .iter()
        .enumerate()
        .map(|(i, value)| AnnotatedCell {
            value: value.clone(),
            differs: mask.and_then(|m| m.get(i).copied()).unwrap_or(false),
        })
        .collect()
}

/// Turn ordered entries into annotated rows.
///
/// A pair yields its left row followed by its right row, both carrying the
/// same difference mask. A single yields one row whose status marks it as
/// removed (left) or added (right); its cells are not flagged individually.
pub fn project(
    left: &Table,
    right: &Table,
    entries: &[Entry],
    excluded: &ExcludedColumns,
) -> Vec<AnnotatedRow> {
    let left_label = left.label();
    let right_label = right.label();
    let mut out = Vec::with_capacity(entries.len() * 2);

    for entry in entries {
        match *entry {
            Entry::Pair(pair) => {
                let left_row = &left.rows[pair.left];
                let right_row = &right.rows[pair.right];
                let mask = difference_mask(left_row, right_row, excluded);
                let status = RowStatus::Matched {
                    score: pair.score,
                    identical: !mask.contains(&true),
                };

                out.push(AnnotatedRow {
                    side: Side::Left,
                    row_index: pair.left,
                    source: left_label.clone(),
                    status,
                    counterpart: Some(pair.right),
                    cells: annotate(left_row, Some(&mask)),
                });
                out.push(AnnotatedRow {
                    side: Side::Right,
                    row_index: pair.right,
                    source: right_label.clone(),
                    status,
                    counterpart: Some(pair.left),
                    cells: annotate(right_row, Some(&mask)),
                });
            }
            Entry::Single(row_ref) => {
                let (table, label, status) = match row_ref.side {
                    Side::Left => (left, &left_label, RowStatus::Removed),
                    Side::Right => (right, &right_label, RowStatus::Added),
                };
                out.push(AnnotatedRow {
                    side: row_ref.side,
                    row_index: row_ref.index,
                    source: label.clone(),
                    status,
                    counterpart: None,
                    cells: annotate(&table.rows[row_ref.index], None),
                });
            }
        }
    }

    out
}
