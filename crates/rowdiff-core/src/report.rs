//! Rendering a [`DiffReport`] as CSV or JSON

use crate::engine::DiffReport;
use crate::error::{Error, Result};
use crate::project::{AnnotatedRow, RowStatus};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Output formats for diff reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown format: {}. Supported formats: csv, json",
                other
            )),
        }
    }
}

/// Leading columns written before the data columns
const META_COLUMNS: [&str; 6] = ["source", "side", "row", "status", "score", "diff_columns"];

fn csv_record(row: &AnnotatedRow, columns: &[String]) -> Vec<String> {
    let score = match row.status {
        RowStatus::Matched { score, .. } => score.to_string(),
        RowStatus::Removed | RowStatus::Added => String::new(),
    };
    let diff_columns: Vec<&str> = row
        .differing_columns()
        .into_iter()
        .filter_map(|i| columns.get(i).map(String::as_str))
        .collect();

    let mut record = vec![
        row.source.clone(),
        row.side.to_string(),
        (row.row_index + 1).to_string(),
        row.status.name().to_string(),
        score,
        diff_columns.join(";"),
    ];
    record.extend(row.cells.iter().map(|c| c.value.to_string_value()));
    record
}

/// Write the annotated rows as CSV.
///
/// Each output row carries its source, side, 1-based row number, status,
/// score and the names of the differing columns, followed by the data.
pub fn write_csv<W: Write>(report: &DiffReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| Error::Csv {
        path: report.meta.left_source.clone(),
        source: e,
    };

    let header: Vec<&str> = META_COLUMNS
        .iter()
        .copied()
        .chain(report.columns.iter().map(String::as_str))
        .collect();
    csv_writer.write_record(&header).map_err(csv_err)?;

    for row in &report.rows {
        csv_writer
            .write_record(csv_record(row, &report.columns))
            .map_err(csv_err)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the whole report as pretty-printed JSON
pub fn write_json<W: Write>(report: &DiffReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a report to a file in the given format
pub fn write_report<P: AsRef<Path>>(report: &DiffReport, path: P, format: ReportFormat) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    match format {
        ReportFormat::Csv => write_csv(report, writer),
        ReportFormat::Json => write_json(report, writer),
    }
}
