//! Best-match reconciliation
//!
//! Every surviving left row is scored against every surviving right row.
//! Candidates are then committed greedily in globally descending score order,
//! which approximates a maximum-weight bipartite matching and is fully
//! deterministic.

use crate::compare::{score_columns, ExcludedColumns};
use crate::dedup::Survivors;
use crate::error::{Error, Result};
use crate::table::{RowRef, Side, Table};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which low-scoring candidates may still be paired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Zero-score pairs are allowed when nothing better is left
    #[default]
    Permissive,
    /// At least one column must agree
    Strict,
    /// At least `n` columns must agree
    MinScore(usize),
}

impl MatchPolicy {
    /// Lowest score a candidate needs to be considered
    pub fn min_score(self) -> usize {
        match self {
            MatchPolicy::Permissive => 0,
            MatchPolicy::Strict => 1,
            MatchPolicy::MinScore(n) => n,
        }
    }
}

/// Options for a single reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub excluded: ExcludedColumns,
    pub policy: MatchPolicy,
    /// Score candidates on the rayon thread pool
    pub parallel: bool,
}

/// A left row paired with a right row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    /// Row index in the left table
    pub left: usize,
    /// Row index in the right table
    pub right: usize,
    /// Number of non-excluded columns that agree
    pub score: usize,
}

/// One entry of the ordered reconciliation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Pair(MatchPair),
    Single(RowRef),
}

/// Outcome of the greedy walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    /// Committed pairs in commit order; scores never increase along it
    pub pairs: Vec<MatchPair>,
    /// Unmatched left rows, original order
    pub left_singles: Vec<usize>,
    /// Unmatched right rows, original order
    pub right_singles: Vec<usize>,
}

impl Matching {
    /// Result entries in output order.
    ///
    /// Pairs come first, ordered by their left row; then left singles, then
    /// right singles.
    pub fn entries(&self) -> Vec<Entry> {
        let mut pairs = self.pairs.clone();
        pairs.sort_by_key(|p| p.left);

        pairs
            .into_iter()
            .map(Entry::Pair)
            .chain(
                self.left_singles
                    .iter()
                    .map(|&i| Entry::Single(RowRef::new(Side::Left, i))),
            )
            .chain(
                self.right_singles
                    .iter()
                    .map(|&i| Entry::Single(RowRef::new(Side::Right, i))),
            )
            .collect()
    }

    /// Total number of rows accounted for
    pub fn row_count(&self) -> usize {
        self.pairs.len() * 2 + self.left_singles.len() + self.right_singles.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Position in `Survivors::left`, used to look up the tie-break key
    left_pos: usize,
    left: usize,
    right: usize,
    score: usize,
}

/// Reject tables that cannot be compared column by column
pub fn check_schema(left: &Table, right: &Table, excluded: &ExcludedColumns) -> Result<()> {
    if left.column_count() != right.column_count() {
        return Err(Error::SchemaMismatch {
            left: left.column_count(),
            right: right.column_count(),
        });
    }
    excluded.validate(left.column_count())
}

/// Pair the surviving rows of two tables.
///
/// Fails only on a schema mismatch or an out-of-range excluded column; any
/// cell content is acceptable.
pub fn reconcile(
    left: &Table,
    right: &Table,
    survivors: &Survivors,
    options: &ReconcileOptions,
) -> Result<Matching> {
    check_schema(left, right, &options.excluded)?;

    let included = options.excluded.included(left.column_count());
    let min_score = options.policy.min_score();

    // Tie-break text: the first non-excluded cell of each left row
    let tie_keys: Vec<String> = survivors
        .left
        .iter()
        .map(|&i| {
            included
                .first()
                .and_then(|&c| left.rows[i].get(c))
                .map(|cell| cell.canonical_text())
                .unwrap_or_default()
        })
        .collect();

    let score_row = |(left_pos, &li): (usize, &usize)| -> Vec<Candidate> {
        let row = &left.rows[li];
        survivors
            .right
            .iter()
            .filter_map(|&ri| {
                let score = score_columns(row, &right.rows[ri], &included);
                (score >= min_score).then_some(Candidate {
                    left_pos,
                    left: li,
                    right: ri,
                    score,
                })
            })
            .collect()
    };

    let mut candidates: Vec<Candidate> = if options.parallel {
        survivors
            .left
            .par_iter()
            .enumerate()
            .flat_map_iter(&score_row)
            .collect()
    } else {
        survivors
            .left
            .iter()
            .enumerate()
            .flat_map(&score_row)
            .collect()
    };

    candidates.sort_unstable_by(|a, b| compare_candidates(a, b, &tie_keys));

    let mut left_matched = vec![false; left.row_count()];
    let mut right_matched = vec![false; right.row_count()];
    let mut pairs = Vec::new();

    for c in &candidates {
        if left_matched[c.left] || right_matched[c.right] {
            continue;
        }
        left_matched[c.left] = true;
        right_matched[c.right] = true;
        pairs.push(MatchPair {
            left: c.left,
            right: c.right,
            score: c.score,
        });
    }

    let matching = Matching {
        pairs,
        left_singles: survivors
            .left
            .iter()
            .copied()
            .filter(|&i| !left_matched[i])
            .collect(),
        right_singles: survivors
            .right
            .iter()
            .copied()
            .filter(|&i| !right_matched[i])
            .collect(),
    };

    log::debug!(
        "scored {} candidates, committed {} pairs, {} left / {} right singles",
        candidates.len(),
        matching.pairs.len(),
        matching.left_singles.len(),
        matching.right_singles.len()
    );

    Ok(matching)
}

/// Score descending, then tie-break text, then left index, then right index
fn compare_candidates(a: &Candidate, b: &Candidate, tie_keys: &[String]) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| tie_keys[a.left_pos].cmp(&tie_keys[b.left_pos]))
        .then_with(|| a.left.cmp(&b.left))
        .then_with(|| a.right.cmp(&b.right))
}
