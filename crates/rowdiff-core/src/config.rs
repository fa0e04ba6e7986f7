//! Diff configuration file
//!
//! A small JSON document naming the columns to ignore and the matching
//! options. CLI flags are layered on top of it.

use crate::compare::ExcludedColumns;
use crate::error::{Error, Result};
use crate::reconcile::{MatchPolicy, ReconcileOptions};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Options for diffing two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Column names ignored for matching and highlighting
    #[serde(default)]
    pub excluded_columns: Vec<String>,
    /// Refuse to pair rows that share no column
    #[serde(default)]
    pub strict: bool,
    /// Minimum number of agreeing columns for a pair; overrides `strict`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<usize>,
    /// Drop rows that are unchanged on both sides before matching
    #[serde(default = "default_true")]
    pub cancel_exact_duplicates: bool,
    /// Score candidate pairs on all cores
    #[serde(default)]
    pub parallel: bool,
    /// Fail when the two headers name their columns differently
    #[serde(default = "default_true")]
    pub require_matching_headers: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            excluded_columns: Vec::new(),
            strict: false,
            min_score: None,
            cancel_exact_duplicates: true,
            parallel: false,
            require_matching_headers: true,
        }
    }
}

impl DiffConfig {
    /// Create a config with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to ignore
    pub fn exclude(mut self, column: impl Into<String>) -> Self {
        self.excluded_columns.push(column.into());
        self
    }

    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Matching policy implied by `strict` and `min_score`
    pub fn policy(&self) -> MatchPolicy {
        match (self.min_score, self.strict) {
            (Some(n), _) => MatchPolicy::MinScore(n),
            (None, true) => MatchPolicy::Strict,
            (None, false) => MatchPolicy::Permissive,
        }
    }

    /// Check the headers of both tables against this config
    pub fn check_headers(&self, left: &Table, right: &Table) -> Result<()> {
        if left.column_count() != right.column_count() {
            return Err(Error::SchemaMismatch {
                left: left.column_count(),
                right: right.column_count(),
            });
        }
        if !self.require_matching_headers {
            return Ok(());
        }
        match left
            .columns
            .iter()
            .zip(&right.columns)
            .find(|(l, r)| l.name != r.name)
        {
            Some((l, r)) => Err(Error::HeaderMismatch {
                index: l.index,
                left: l.name.clone(),
                right: r.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Resolve excluded names against a table header
    pub fn reconcile_options(&self, table: &Table) -> Result<ReconcileOptions> {
        let excluded = ExcludedColumns::from_names(table, &self.excluded_columns)?;
        excluded.validate(table.column_count())?;
        Ok(ReconcileOptions {
            excluded,
            policy: self.policy(),
            parallel: self.parallel,
        })
    }
}
