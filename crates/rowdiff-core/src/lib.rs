//! rowdiff-core: Core library for reconciling the rows of two tables
//!
//! This library provides functionality to:
//! - Load CSV files into typed tables
//! - Cancel rows that are unchanged on both sides
//! - Pair the remaining rows by best match (greedy, globally ordered by score)
//! - Flag differing cells and unmatched rows
//! - Render the result as CSV or JSON

pub mod compare;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod parser;
pub mod project;
pub mod reconcile;
pub mod report;
pub mod scanner;
pub mod table;

pub use compare::{cells_equal, difference_mask, score, ExcludedColumns};
pub use config::DiffConfig;
pub use dedup::{cancel_exact_duplicates, Survivors};
pub use engine::{diff_directories, diff_files, diff_tables, diff_with_options, DiffReport, DiffSummary, DirectoryDiff};
pub use error::{Error, Result};
pub use parser::{parse_csv, parse_csv_str};
pub use project::{project, AnnotatedCell, AnnotatedRow, RowStatus};
pub use reconcile::{reconcile, Entry, MatchPair, MatchPolicy, Matching, ReconcileOptions};
pub use report::{write_csv, write_json, write_report, ReportFormat};
pub use scanner::{scan_pair, FilePair, PairScan};
pub use table::{CellValue, Column, Row, RowRef, Side, Table};
