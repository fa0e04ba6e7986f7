//! Core table types for representing tabular data

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A table loaded from a single source (usually a CSV file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source file path (or a label for in-memory tables)
    pub source_path: PathBuf,
}

impl Table {
    /// Build a table from header names and raw string rows.
    ///
    /// Every cell goes through [`CellValue::parse`]; rows are padded or
    /// truncated to the header width.
    pub fn from_strings<S: AsRef<str>>(source: &str, headers: &[S], rows: &[Vec<S>]) -> Self {
        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.as_ref().to_string(), i))
            .collect();

        let rows = rows
            .iter()
            .map(|r| {
                let mut cells: Vec<CellValue> =
                    r.iter().map(|s| CellValue::parse(s.as_ref())).collect();
                cells.resize(columns.len(), CellValue::Empty);
                Row::new(cells)
            })
            .collect();

        Self {
            columns,
            rows,
            source_path: PathBuf::from(source),
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Short label used to tag output rows (the file name if there is one)
    pub fn label(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as it appears in the header
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values for each column
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A cell value with type detection
///
/// Numbers keep the text they were parsed from, so rendering a cell never
/// rewrites the input (`02134` stays `02134`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// Empty/null cell
    Empty,
    /// Finite numeric value and its source text
    Number { value: f64, raw: String },
    /// Text value, verbatim
    Text(String),
}

impl CellValue {
    /// Parse a string into a CellValue, detecting the type.
    ///
    /// Only the empty string is `Empty`. Text is never trimmed, so `"a "` and
    /// `"a"` stay distinct.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Empty;
        }

        // "NaN" and "inf" parse as f64 but are kept as text
        match s.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number {
                value,
                raw: s.to_string(),
            },
            _ => CellValue::Text(s.to_string()),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The cell as it appeared in the source
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Number { raw, .. } => raw.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// Text used when comparing and grouping cells.
    ///
    /// Numbers use a canonical form: `1.0` renders as `1` and `-0` as `0`,
    /// so numerically equal cells always produce the same text.
    pub fn canonical_text(&self) -> String {
        match self {
            CellValue::Number { value, .. } => format_number(*value),
            other => other.to_string_value(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Number { raw, .. } => write!(f, "{}", raw),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::parse(s)
    }
}

/// Which of the two compared tables a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The first table (A)
    Left,
    /// The second table (B)
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Reference to a row by side and original position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRef {
    pub side: Side,
    pub index: usize,
}

impl RowRef {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}
