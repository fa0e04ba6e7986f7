//! Cell comparison and row scoring

use crate::error::{Error, Result};
use crate::table::{CellValue, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column positions ignored when scoring rows and when flagging differences.
///
/// Excluded cells are still carried through to the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludedColumns(BTreeSet<usize>);

impl ExcludedColumns {
    /// No excluded columns
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from column indices
    pub fn new<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Self(indices.into_iter().collect())
    }

    /// Resolve column names against a table's header
    pub fn from_names<S: AsRef<str>>(table: &Table, names: &[S]) -> Result<Self> {
        let mut indices = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            let column = table
                .find_column(name)
                .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
            indices.insert(column.index);
        }
        Ok(Self(indices))
    }

    /// Check every index is inside `[0, column_count)`
    pub fn validate(&self, column_count: usize) -> Result<()> {
        match self.0.iter().find(|&&i| i >= column_count) {
            Some(&index) => Err(Error::InvalidExcludedColumn {
                index,
                column_count,
            }),
            None => Ok(()),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// The non-excluded column indices, in order
    pub fn included(&self, column_count: usize) -> Vec<usize> {
        (0..column_count).filter(|i| !self.contains(*i)).collect()
    }
}

/// Decide whether two cells hold the same value.
///
/// Empty equals only empty. Two numbers compare numerically. Anything else
/// compares by canonical text, so the number `1.0` equals the text `"1"` but
/// not the text `"1.0"`. Text is compared exactly, whitespace included.
pub fn cells_equal(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Empty, CellValue::Empty) => true,
        (CellValue::Empty, _) | (_, CellValue::Empty) => false,
        (CellValue::Text(x), CellValue::Text(y)) => x == y,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => a.canonical_text() == b.canonical_text(),
        },
    }
}

/// Number of non-excluded columns that are equal between two rows
pub fn score(left: &Row, right: &Row, excluded: &ExcludedColumns) -> usize {
    left.cells
        .iter()
        .zip(&right.cells)
        .enumerate()
        .filter(|(i, (a, b))| !excluded.contains(*i) && cells_equal(a, b))
        .count()
}

/// Same as [`score`], over a precomputed list of included columns
pub(crate) fn score_columns(left: &Row, right: &Row, included: &[usize]) -> usize {
    included
        .iter()
        .filter(|&&i| match (left.get(i), right.get(i)) {
            (Some(a), Some(b)) => cells_equal(a, b),
            _ => false,
        })
        .count()
}

/// Per-column flags, `true` where a non-excluded cell differs
pub fn difference_mask(left: &Row, right: &Row, excluded: &ExcludedColumns) -> Vec<bool> {
    left.cells
        .iter()
        .zip(&right.cells)
        .enumerate()
        .map(|(i, (a, b))| !excluded.contains(i) && !cells_equal(a, b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Row {
        Row::new(values.iter().map(|v| CellValue::parse(v)).collect())
    }

    #[test]
    fn test_numeric_equality_ignores_formatting() {
        assert!(cells_equal(&CellValue::parse("1"), &CellValue::parse("1.0")));
        assert!(cells_equal(&CellValue::parse("2.50"), &CellValue::parse("2.5")));
        assert!(!cells_equal(&CellValue::parse("1"), &CellValue::parse("2")));
    }

    #[test]
    fn test_empty_never_equals_value() {
        assert!(cells_equal(&CellValue::Empty, &CellValue::Empty));
        assert!(!cells_equal(&CellValue::Empty, &CellValue::Text(String::new())));
        assert!(!cells_equal(&CellValue::parse("0"), &CellValue::Empty));
    }

    #[test]
    fn test_mixed_number_and_text_compare_as_text() {
        let one = CellValue::parse("1.0");
        assert!(cells_equal(&one, &CellValue::Text("1".into())));
        assert!(!cells_equal(&one, &CellValue::Text("1.0".into())));
        assert!(!cells_equal(&CellValue::Text("abc".into()), &CellValue::Text("ABC".into())));
    }

    #[test]
    fn test_whitespace_is_significant() {
        assert!(!cells_equal(&CellValue::parse("a "), &CellValue::parse("a")));
        assert!(!cells_equal(&CellValue::parse(" 7"), &CellValue::parse("7")));
        assert!(cells_equal(&CellValue::parse("02134"), &CellValue::parse("2134")));
    }

    #[test]
    fn test_score_skips_excluded() {
        let a = row(&["x", "1", "red"]);
        let b = row(&["x", "1", "green"]);
        assert_eq!(score(&a, &b, &ExcludedColumns::none()), 2);
        assert_eq!(score(&a, &b, &ExcludedColumns::new([0])), 1);
        assert_eq!(score_columns(&a, &b, &[0, 1, 2]), 2);
    }

    #[test]
    fn test_difference_mask() {
        let a = row(&["x", "1", "red"]);
        let b = row(&["y", "1.0", "green"]);
        assert_eq!(
            difference_mask(&a, &b, &ExcludedColumns::none()),
            vec![true, false, true]
        );
        assert_eq!(
            difference_mask(&a, &b, &ExcludedColumns::new([2])),
            vec![true, false, false]
        );
    }

    #[test]
    fn test_resolve_names() {
        let table = Table::from_strings("t.csv", &["id", "updated_at"], &[]);
        let excluded = ExcludedColumns::from_names(&table, &["updated_at"]).unwrap();
        assert!(excluded.contains(1));
        assert_eq!(excluded.included(2), vec![0]);

        let err = ExcludedColumns::from_names(&table, &["missing"]).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(name) if name == "missing"));
    }

    #[test]
    fn test_validate_range() {
        assert!(ExcludedColumns::new([0, 2]).validate(3).is_ok());
        let err = ExcludedColumns::new([3]).validate(3).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidExcludedColumn { index: 3, column_count: 3 }
        ));
    }
}
