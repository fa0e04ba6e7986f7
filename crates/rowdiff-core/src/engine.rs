//! End-to-end diff of two tables
//!
//! Validates the configuration, cancels exact duplicates, reconciles the
//! remaining rows and projects the result into a [`DiffReport`].

use crate::config::DiffConfig;
use crate::dedup::{cancel_exact_duplicates, Survivors};
use crate::error::Result;
use crate::parser::parse_csv;
use crate::project::{project, AnnotatedRow, RowStatus};
use crate::reconcile::{check_schema, reconcile, MatchPolicy, ReconcileOptions};
use crate::scanner::{scan_pair, PairScan};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Counts describing a diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    /// Pairs removed by the exact-duplicate pass
    pub exact_matches: usize,
    /// Pairs found by best-match reconciliation
    pub matched_pairs: usize,
    /// Matched pairs with at least one differing cell
    pub changed_pairs: usize,
    /// Left rows without counterpart
    pub removed: usize,
    /// Right rows without counterpart
    pub added: usize,
}

impl DiffSummary {
    /// True when the two tables hold the same rows
    pub fn is_clean(&self) -> bool {
        self.changed_pairs == 0 && self.removed == 0 && self.added == 0
    }
}

/// Metadata about a diff run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub left_source: PathBuf,
    pub right_source: PathBuf,
    pub excluded_columns: Vec<String>,
    pub policy: MatchPolicy,
    pub engine_version: String,
    pub generated_at: String,
}

/// Annotated diff of two tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    pub meta: ReportMeta,
    /// Column names of the compared tables
    pub columns: Vec<String>,
    pub summary: DiffSummary,
    /// Output rows in render order
    pub rows: Vec<AnnotatedRow>,
}

/// Diff two tables using a config (excluded columns given by name)
pub fn diff_tables(left: &Table, right: &Table, config: &DiffConfig) -> Result<DiffReport> {
    config.check_headers(left, right)?;
    let options = config.reconcile_options(left)?;
    diff_with_options(left, right, &options, config.cancel_exact_duplicates)
}

/// Diff two tables with already-resolved options
pub fn diff_with_options(
    left: &Table,
    right: &Table,
    options: &ReconcileOptions,
    cancel_exact: bool,
) -> Result<DiffReport> {
    // Fail before any matching work
    check_schema(left, right, &options.excluded)?;

    let survivors = if cancel_exact {
        cancel_exact_duplicates(&left.rows, &right.rows, &options.excluded)
    } else {
        Survivors::all(left.row_count(), right.row_count())
    };

    let matching = reconcile(left, right, &survivors, options)?;
    let rows = project(left, right, &matching.entries(), &options.excluded);

    let changed_pairs = rows
        .iter()
        .filter(|r| matches!(r.status, RowStatus::Matched { identical: false, .. }))
        .count()
        / 2;

    let summary = DiffSummary {
        left_rows: left.row_count(),
        right_rows: right.row_count(),
        exact_matches: survivors.cancelled,
        matched_pairs: matching.pairs.len(),
        changed_pairs,
        removed: matching.left_singles.len(),
        added: matching.right_singles.len(),
    };

    log::info!(
        "{} vs {}: {} exact, {} matched ({} changed), {} removed, {} added",
        left.label(),
        right.label(),
        summary.exact_matches,
        summary.matched_pairs,
        summary.changed_pairs,
        summary.removed,
        summary.added
    );

    Ok(DiffReport {
        meta: ReportMeta {
            left_source: left.source_path.clone(),
            right_source: right.source_path.clone(),
            excluded_columns: options
                .excluded
                .iter()
                .filter_map(|i| left.columns.get(i).map(|c| c.name.clone()))
                .collect(),
            policy: options.policy,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        columns: left.column_names().into_iter().map(String::from).collect(),
        summary,
        rows,
    })
}

/// Load two CSV files and diff them
pub fn diff_files<P: AsRef<Path>, Q: AsRef<Path>>(
    left: P,
    right: Q,
    config: &DiffConfig,
) -> Result<DiffReport> {
    let left = parse_csv(left)?;
    let right = parse_csv(right)?;
    diff_tables(&left, &right, config)
}

/// Outcome of diffing every file pair of two directory trees
#[derive(Debug)]
pub struct DirectoryDiff {
    /// Reports keyed by path relative to the roots
    pub reports: Vec<(PathBuf, DiffReport)>,
    /// File pairs that could not be diffed
    pub errors: Vec<(PathBuf, String)>,
    pub left_only: Vec<PathBuf>,
    pub right_only: Vec<PathBuf>,
}

/// Diff every CSV file present under both roots.
///
/// A failing pair is recorded and does not stop the run.
pub fn diff_directories<P: AsRef<Path>, Q: AsRef<Path>>(
    left_root: P,
    right_root: Q,
    config: &DiffConfig,
) -> Result<DirectoryDiff> {
    let PairScan {
        pairs,
        left_only,
        right_only,
    } = scan_pair(left_root, right_root)?;

    let mut reports = Vec::new();
    let mut errors = Vec::new();

    for pair in pairs {
        match diff_files(&pair.left, &pair.right, config) {
            Ok(report) => reports.push((pair.relative, report)),
            Err(e) => {
                log::warn!("{}: {}", pair.relative.display(), e);
                errors.push((pair.relative, e.to_string()));
            }
        }
    }

    Ok(DirectoryDiff {
        reports,
        errors,
        left_only,
        right_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::parse_csv_str;

    #[test]
    fn test_worked_example() {
        let a = parse_csv_str("name,qty,colour\nx,1,red\ny,2,blue\n", "a.csv").unwrap();
        let b = parse_csv_str("name,qty,colour\nx,1,green\nz,3,blue\n", "b.csv").unwrap();

        let report = diff_tables(&a, &b, &DiffConfig::new()).unwrap();
        assert_eq!(report.summary.matched_pairs, 2);
        assert_eq!(report.summary.changed_pairs, 2);
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[0].differing_columns(), vec![2]);
        assert_eq!(report.rows[2].differing_columns(), vec![0, 1]);
        assert!(!report.summary.is_clean());
    }

    #[test]
    fn test_identical_tables_produce_empty_report() {
        let csv = "id,name\n1,a\n2,b\n2,b\n";
        let a = parse_csv_str(csv, "a.csv").unwrap();
        let b = parse_csv_str(csv, "b.csv").unwrap();

        let report = diff_tables(&a, &b, &DiffConfig::new()).unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.summary.exact_matches, 3);
        assert!(report.summary.is_clean());
    }

    #[test]
    fn test_keep_exact_matches_reports_them_as_same() {
        let csv = "id,name\n1,a\n";
        let a = parse_csv_str(csv, "a.csv").unwrap();
        let b = parse_csv_str(csv, "b.csv").unwrap();

        let config = DiffConfig {
            cancel_exact_duplicates: false,
            ..Default::default()
        };
        let report = diff_tables(&a, &b, &config).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].status.name(), "same");
        assert!(report.summary.is_clean());
    }

    #[test]
    fn test_excluded_column_reported_in_meta() {
        let a = parse_csv_str("id,stamp\n1,monday\n", "a.csv").unwrap();
        let b = parse_csv_str("id,stamp\n1,tuesday\n", "b.csv").unwrap();

        let report = diff_tables(&a, &b, &DiffConfig::new().exclude("stamp")).unwrap();
        assert_eq!(report.meta.excluded_columns, vec!["stamp".to_string()]);
        // identical once the stamp is ignored
        assert_eq!(report.summary.exact_matches, 1);
        assert!(report.rows.is_empty());
    }

    #[test]
    fn test_schema_mismatch_is_config_error() {
        let a = parse_csv_str("id,name\n1,a\n", "a.csv").unwrap();
        let b = parse_csv_str("id\n1\n", "b.csv").unwrap();

        let err = diff_tables(&a, &b, &DiffConfig::new()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_one_sided_input() {
        let a = parse_csv_str("id,name\n", "a.csv").unwrap();
        let b = parse_csv_str("id,name\n1,a\n2,b\n", "b.csv").unwrap();

        let report = diff_tables(&a, &b, &DiffConfig::new()).unwrap();
        assert_eq!(report.summary.added, 2);
        assert!(report.rows.iter().all(|r| r.status == RowStatus::Added));
    }
}
