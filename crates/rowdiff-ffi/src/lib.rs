//! C FFI bindings for rowdiff-core
//!
//! This crate provides a C-compatible API for embedding the row diff in
//! C/C++ applications. Reports are returned as opaque handles; strings
//! returned by the library must be freed with `rd_free_string`.

use rowdiff_core::{DiffConfig, DiffReport};
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;

/// Opaque handle to a diff report
pub struct FfiDiffReport {
    inner: DiffReport,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(message: String) {
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(message));
}

fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Read an optional JSON config; null means defaults
unsafe fn read_config(config_json: *const c_char) -> Option<DiffConfig> {
    if config_json.is_null() {
        return Some(DiffConfig::default());
    }
    let text = match CStr::from_ptr(config_json).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(format!("config is not valid UTF-8: {e}"));
            return None;
        }
    };
    match serde_json::from_str(text) {
        Ok(config) => Some(config),
        Err(e) => {
            set_last_error(format!("invalid config: {e}"));
            None
        }
    }
}

/// Diff two CSV files
///
/// # Safety
/// - `left` and `right` must be valid C strings
/// - `config_json` must be a valid C string holding a JSON config, or null for defaults
/// - Returns null on error; call `rd_last_error` for the message
#[no_mangle]
pub unsafe extern "C" fn rd_diff_files(
    left: *const c_char,
    right: *const c_char,
    config_json: *const c_char,
) -> *mut FfiDiffReport {
    if left.is_null() || right.is_null() {
        set_last_error("null path".to_string());
        return ptr::null_mut();
    }

    let (left, right) = match (CStr::from_ptr(left).to_str(), CStr::from_ptr(right).to_str()) {
        (Ok(l), Ok(r)) => (PathBuf::from(l), PathBuf::from(r)),
        _ => {
            set_last_error("path is not valid UTF-8".to_string());
            return ptr::null_mut();
        }
    };

    let Some(config) = read_config(config_json) else {
        return ptr::null_mut();
    };

    match rowdiff_core::diff_files(&left, &right, &config) {
        Ok(report) => Box::into_raw(Box::new(FfiDiffReport { inner: report })),
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a diff report
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files` or null
#[no_mangle]
pub unsafe extern "C" fn rd_free_report(report: *mut FfiDiffReport) {
    if !report.is_null() {
        drop(Box::from_raw(report));
    }
}

/// Get the number of output rows in a report
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files`
#[no_mangle]
pub unsafe extern "C" fn rd_report_row_count(report: *const FfiDiffReport) -> usize {
    if report.is_null() {
        return 0;
    }
    (*report).inner.rows.len()
}

/// Get the number of data columns in a report
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files`
#[no_mangle]
pub unsafe extern "C" fn rd_report_col_count(report: *const FfiDiffReport) -> usize {
    if report.is_null() {
        return 0;
    }
    (*report).inner.columns.len()
}

/// Get the status of an output row ("same", "changed", "removed" or "added")
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files`
/// - Returns null if row is out of bounds
/// - Caller must free the returned string with `rd_free_string`
#[no_mangle]
pub unsafe extern "C" fn rd_report_row_status(
    report: *const FfiDiffReport,
    row: usize,
) -> *mut c_char {
    if report.is_null() {
        return ptr::null_mut();
    }

    (&(*report)
        .inner
        .rows)
        .get(row)
        .map(|r| to_c_string(r.status.name()))
        .unwrap_or(ptr::null_mut())
}

/// Get a cell value as a string
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files`
/// - Returns null if row or col is out of bounds
/// - Caller must free the returned string with `rd_free_string`
#[no_mangle]
pub unsafe extern "C" fn rd_report_cell(
    report: *const FfiDiffReport,
    row: usize,
    col: usize,
) -> *mut c_char {
    if report.is_null() {
        return ptr::null_mut();
    }

    (&(*report)
        .inner
        .rows)
        .get(row)
        .and_then(|r| r.cells.get(col))
        .map(|c| to_c_string(&c.value.to_string_value()))
        .unwrap_or(ptr::null_mut())
}

/// Whether a cell differs from its counterpart: 1 = differs, 0 = same, -1 = out of bounds
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files`
#[no_mangle]
pub unsafe extern "C" fn rd_report_cell_differs(
    report: *const FfiDiffReport,
    row: usize,
    col: usize,
) -> i32 {
    if report.is_null() {
        return -1;
    }

    (&(*report)
        .inner
        .rows)
        .get(row)
        .and_then(|r| r.cells.get(col))
        .map(|c| i32::from(c.differs))
        .unwrap_or(-1)
}

/// Serialize a whole report as JSON
///
/// # Safety
/// - `report` must be a valid pointer returned by `rd_diff_files`
/// - Caller must free the returned string with `rd_free_string`
#[no_mangle]
pub unsafe extern "C" fn rd_report_to_json(report: *const FfiDiffReport) -> *mut c_char {
    if report.is_null() {
        return ptr::null_mut();
    }

    match serde_json::to_string(&(*report).inner) {
        Ok(json) => to_c_string(&json),
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Message of the last error on this thread, or null if there was none
///
/// # Safety
/// - Caller must free the returned string with `rd_free_string`
#[no_mangle]
pub unsafe extern "C" fn rd_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_deref()
            .map(to_c_string)
            .unwrap_or(ptr::null_mut())
    })
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a rd_* function or null
#[no_mangle]
pub unsafe extern "C" fn rd_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    unsafe fn take_string(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let owned = CStr::from_ptr(s).to_string_lossy().into_owned();
        rd_free_string(s);
        owned
    }

    #[test]
    fn test_diff_files_through_ffi() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("a.csv");
        let right = dir.path().join("b.csv");
        fs::write(&left, "id,colour\n1,red\n2,blue\n").unwrap();
        fs::write(&right, "id,colour\n1,green\n2,blue\n").unwrap();

        let left_c = CString::new(left.to_str().unwrap()).unwrap();
        let right_c = CString::new(right.to_str().unwrap()).unwrap();

        unsafe {
            let report = rd_diff_files(left_c.as_ptr(), right_c.as_ptr(), ptr::null());
            assert!(!report.is_null());

            assert_eq!(rd_report_row_count(report), 2);
            assert_eq!(rd_report_col_count(report), 2);
            assert_eq!(take_string(rd_report_row_status(report, 0)), "changed");
            assert_eq!(take_string(rd_report_cell(report, 1, 1)), "green");
            assert_eq!(rd_report_cell_differs(report, 0, 0), 0);
            assert_eq!(rd_report_cell_differs(report, 0, 1), 1);
            assert_eq!(rd_report_cell_differs(report, 9, 0), -1);
            assert!(rd_report_row_status(report, 9).is_null());

            let json = take_string(rd_report_to_json(report));
            assert!(json.contains("\"changed_pairs\":1"));

            rd_free_report(report);
        }
    }

    #[test]
    fn test_cells_keep_source_text() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("a.csv");
        let right = dir.path().join("b.csv");
        fs::write(&left, "zip,note\n02134,\" x\"\n").unwrap();
        fs::write(&right, "zip,note\n02134,x\n").unwrap();

        let left_c = CString::new(left.to_str().unwrap()).unwrap();
        let right_c = CString::new(right.to_str().unwrap()).unwrap();

        unsafe {
            let report = rd_diff_files(left_c.as_ptr(), right_c.as_ptr(), ptr::null());
            assert!(!report.is_null());

            assert_eq!(take_string(rd_report_cell(report, 0, 0)), "02134");
            assert_eq!(take_string(rd_report_cell(report, 0, 1)), " x");
            assert_eq!(rd_report_cell_differs(report, 0, 1), 1);

            rd_free_report(report);
        }
    }

    #[test]
    fn test_errors_are_reported() {
        let missing = CString::new("/no/such/file.csv").unwrap();
        let bad_config = CString::new("{not json").unwrap();

        unsafe {
            let report = rd_diff_files(missing.as_ptr(), missing.as_ptr(), bad_config.as_ptr());
            assert!(report.is_null());
            assert!(take_string(rd_last_error()).starts_with("invalid config"));

            let report = rd_diff_files(missing.as_ptr(), missing.as_ptr(), ptr::null());
            assert!(report.is_null());
            assert!(take_string(rd_last_error()).contains("failed to read file"));

            assert!(rd_diff_files(ptr::null(), missing.as_ptr(), ptr::null()).is_null());
            assert_eq!(rd_report_row_count(ptr::null()), 0);
        }
    }
}
