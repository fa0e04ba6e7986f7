use std::fs;
use std::path::{Path, PathBuf};

use rowdiff_core::{
    diff_directories, diff_files, parse_csv, write_report, DiffConfig, DiffReport, Error,
    ReportFormat, RowStatus,
};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

const INVENTORY_V1: &str = "\
sku,name,qty,price,updated_at
A-1,Widget,10,2.50,2024-01-01
A-2,Gadget,5,7.00,2024-01-01
A-3,Doohickey,0,1.25,2024-01-01
A-4,Sprocket,3,4.00,2024-01-01
";

const INVENTORY_V2: &str = "\
sku,name,qty,price,updated_at
A-1,Widget,10,2.5,2024-02-01
A-2,Gadget,6,7.00,2024-02-01
A-4,Sprocket,3,4.00,2024-01-01
A-5,Flange,1,9.99,2024-02-01
";

#[test]
fn inventory_diff_ignoring_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let left = write(dir.path(), "v1.csv", INVENTORY_V1);
    let right = write(dir.path(), "v2.csv", INVENTORY_V2);

    let config = DiffConfig::new().exclude("updated_at");
    let report = diff_files(&left, &right, &config).unwrap();

    // A-1 (price spelled differently) and A-4 are unchanged once the stamp is ignored
    assert_eq!(report.summary.exact_matches, 2);
    assert_eq!(report.summary.matched_pairs, 2);
    assert_eq!(report.summary.changed_pairs, 2);

    // A-2 keeps sku, name and price: qty is the only difference
    assert_eq!(report.rows[0].source, "v1.csv");
    assert_eq!(report.rows[0].differing_columns(), vec![2]);
    assert_eq!(report.rows[1].source, "v2.csv");
}

#[test]
fn strict_mode_reports_additions_and_removals() {
    let dir = tempfile::tempdir().unwrap();
    let left = write(dir.path(), "v1.csv", "id,colour\n1,red\n");
    let right = write(dir.path(), "v2.csv", "id,colour\n2,blue\n");

    let permissive = diff_files(&left, &right, &DiffConfig::new()).unwrap();
    assert_eq!(permissive.summary.matched_pairs, 1);

    let strict = DiffConfig {
        strict: true,
        ..Default::default()
    };
    let report = diff_files(&left, &right, &strict).unwrap();
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.added, 1);
    assert_eq!(report.rows[0].status, RowStatus::Removed);
    assert_eq!(report.rows[1].status, RowStatus::Added);
}

#[test]
fn header_mismatch_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let left = write(dir.path(), "a.csv", "id,name\n1,x\n");
    let right = write(dir.path(), "b.csv", "id,title\n1,x\n");

    let err = diff_files(&left, &right, &DiffConfig::new()).unwrap_err();
    assert!(matches!(err, Error::HeaderMismatch { index: 1, .. }));
}

#[test]
fn report_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let left = write(dir.path(), "v1.csv", INVENTORY_V1);
    let right = write(dir.path(), "v2.csv", INVENTORY_V2);
    let report = diff_files(&left, &right, &DiffConfig::new()).unwrap();

    let json_path = dir.path().join("out.json");
    write_report(&report, &json_path, ReportFormat::Json).unwrap();
    let loaded: DiffReport = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(loaded.summary, report.summary);

    let csv_path = dir.path().join("out.csv");
    write_report(&report, &csv_path, ReportFormat::Csv).unwrap();
    let rendered = parse_csv(&csv_path).unwrap();
    assert_eq!(rendered.row_count(), report.rows.len());
    assert_eq!(rendered.columns[0].name, "source");
    assert_eq!(rendered.column_count(), 6 + report.columns.len());
}

#[test]
fn directory_diff_pairs_files() {
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();

    write(left.path(), "stock/inventory.csv", INVENTORY_V1);
    write(right.path(), "stock/inventory.csv", INVENTORY_V2);
    write(left.path(), "same.csv", "id\n1\n");
    write(right.path(), "same.csv", "id\n1\n");
    write(left.path(), "broken.csv", "id,name\n1,a\n");
    write(right.path(), "broken.csv", "id\n1\n");
    write(left.path(), "gone.csv", "id\n1\n");
    write(right.path(), "new.csv", "id\n1\n");

    let result = diff_directories(left.path(), right.path(), &DiffConfig::new()).unwrap();

    let names: Vec<_> = result.reports.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(
        names,
        vec![PathBuf::from("same.csv"), PathBuf::from("stock/inventory.csv")]
    );
    assert!(result.reports[0].1.summary.is_clean());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].0, PathBuf::from("broken.csv"));
    assert_eq!(result.left_only, vec![PathBuf::from("gone.csv")]);
    assert_eq!(result.right_only, vec![PathBuf::from("new.csv")]);
}
