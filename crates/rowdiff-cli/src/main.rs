//! rowdiff CLI
//!
//! Command-line tool for reconciling the rows of two CSV tables.

use clap::{Args, Parser, Subcommand};
use rowdiff_core::{
    diff_directories, diff_files, parse_csv, write_csv, write_json, write_report, DiffConfig,
    DiffReport, ReportFormat,
};
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowdiff")]
#[command(about = "Row-by-row diff of two CSV tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Matching options shared by the diff commands
#[derive(Args)]
struct DiffArgs {
    /// JSON config file (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column to ignore when matching (repeatable)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Never pair rows that share no column
    #[arg(long)]
    strict: bool,

    /// Minimum number of agreeing columns for a pair
    #[arg(long)]
    min_score: Option<usize>,

    /// Report unchanged rows instead of dropping them up front
    #[arg(long)]
    keep_exact: bool,

    /// Score candidate pairs on all cores
    #[arg(long)]
    parallel: bool,

    /// Allow headers whose column names differ
    #[arg(long)]
    ignore_header_names: bool,

    /// Output format (csv or json)
    #[arg(long, default_value = "csv")]
    format: ReportFormat,
}

impl DiffArgs {
    /// Load the config file, if any, and apply the flags on top
    fn to_config(&self) -> rowdiff_core::Result<DiffConfig> {
        let mut config = match &self.config {
            Some(path) => DiffConfig::load(path)?,
            None => DiffConfig::new(),
        };

        config.excluded_columns.extend(self.exclude.iter().cloned());
        config.strict |= self.strict;
        if self.min_score.is_some() {
            config.min_score = self.min_score;
        }
        if self.keep_exact {
            config.cancel_exact_duplicates = false;
        }
        config.parallel |= self.parallel;
        if self.ignore_header_names {
            config.require_matching_headers = false;
        }

        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two CSV files
    Diff {
        /// First (old) CSV file
        #[arg(short, long)]
        left: PathBuf,

        /// Second (new) CSV file
        #[arg(short, long)]
        right: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: DiffArgs,
    },

    /// Diff every CSV file found under both directories
    DiffDir {
        /// First (old) directory
        #[arg(short, long)]
        left: PathBuf,

        /// Second (new) directory
        #[arg(short, long)]
        right: PathBuf,

        /// Directory for the per-file reports
        #[arg(long)]
        output_dir: PathBuf,

        #[command(flatten)]
        args: DiffArgs,
    },

    /// Parse and display a single CSV file
    Parse {
        /// Path to CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create a diff config template
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,

        /// Columns to exclude
        #[arg(short, long)]
        exclude: Vec<String>,
    },
}

impl Cli {
    /// Log level selected by the verbose flag
    fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level())
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> rowdiff_core::Result<()> {
    match command {
        Commands::Diff {
            left,
            right,
            output,
            args,
        } => cmd_diff(&left, &right, output.as_deref(), &args),
        Commands::DiffDir {
            left,
            right,
            output_dir,
            args,
        } => cmd_diff_dir(&left, &right, &output_dir, &args),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::CreateConfig { output, exclude } => cmd_create_config(&output, &exclude),
    }
}

fn cmd_diff(
    left: &Path,
    right: &Path,
    output: Option<&Path>,
    args: &DiffArgs,
) -> rowdiff_core::Result<()> {
    let config = args.to_config()?;
    let report = diff_files(left, right, &config)?;

    match output {
        Some(path) => {
            write_report(&report, path, args.format)?;
            print_summary(&report);
            println!("Wrote {} rows to {}", report.rows.len(), path.display());
        }
        None => {
            let stdout = BufWriter::new(io::stdout().lock());
            match args.format {
                ReportFormat::Csv => write_csv(&report, stdout)?,
                ReportFormat::Json => write_json(&report, stdout)?,
            }
        }
    }

    Ok(())
}

fn cmd_diff_dir(
    left: &Path,
    right: &Path,
    output_dir: &Path,
    args: &DiffArgs,
) -> rowdiff_core::Result<()> {
    let config = args.to_config()?;
    let result = diff_directories(left, right, &config)?;

    fs::create_dir_all(output_dir)?;

    let mut clean = 0;
    for (relative, report) in &result.reports {
        let target = output_dir.join(relative).with_extension(args.format.extension());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        write_report(report, &target, args.format)?;

        if report.summary.is_clean() {
            clean += 1;
        }
        println!(
            "  {} -> {} ({} changed, {} removed, {} added)",
            relative.display(),
            target.display(),
            report.summary.changed_pairs,
            report.summary.removed,
            report.summary.added
        );
    }

    println!();
    println!("Diff complete:");
    println!("  {} file pairs compared, {} identical", result.reports.len(), clean);

    if !result.left_only.is_empty() {
        println!("\nOnly in {}:", left.display());
        for path in &result.left_only {
            println!("  {}", path.display());
        }
    }
    if !result.right_only.is_empty() {
        println!("\nOnly in {}:", right.display());
        for path in &result.right_only {
            println!("  {}", path.display());
        }
    }
    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for (path, err) in &result.errors {
            println!("  {}: {}", path.display(), err);
        }
    }

    Ok(())
}

fn print_summary(report: &DiffReport) {
    let s = &report.summary;
    println!(
        "Compared {} ({} rows) with {} ({} rows)",
        report.meta.left_source.display(),
        s.left_rows,
        report.meta.right_source.display(),
        s.right_rows
    );
    println!("  {} unchanged pairs dropped", s.exact_matches);
    println!("  {} matched pairs ({} changed)", s.matched_pairs, s.changed_pairs);
    println!("  {} removed, {} added", s.removed, s.added);
}

fn cmd_parse(file: &Path) -> rowdiff_core::Result<()> {
    let table = parse_csv(file)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    // Print header
    let header = table.column_names();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print first 10 rows
    for row in table.rows.iter().take(10) {
        let values: Vec<String> = row.cells.iter().map(|c| c.to_string_value()).collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > 10 {
        println!("... ({} more rows)", table.row_count() - 10);
    }

    Ok(())
}

fn cmd_create_config(output: &Path, exclude: &[String]) -> rowdiff_core::Result<()> {
    let config = DiffConfig {
        excluded_columns: exclude.to_vec(),
        ..Default::default()
    };

    config.save(output)?;
    println!("Created config file: {}", output.display());
    println!("Excluded columns: {}", config.excluded_columns.len());
    println!();
    println!("Edit the file to adjust the options, then run:");
    println!(
        "  rowdiff diff --left <a.csv> --right <b.csv> --config {}",
        output.display()
    );

    Ok(())
}
