// src/sheet/mod.rs
// =============================================================================
// This module reads the list of links and writes the verdicts back.
//
// The input is a spreadsheet whose first row is a header. We look for:
// - a "Link" column: the URLs to check
// - a "Result" (or "Hasil") column: where the verdict goes
//   If there is none, a "Result" column is inserted right after "Link".
//
// The output is the same table with the result column filled in.
//
// Two file formats, picked by extension:
// - Excel workbooks (.xlsx and friends): first sheet only, results colored
// - anything else is treated as CSV
//
// Rust concepts:
// - Structs that own their data (Vec<Vec<String>>)
// - anyhow::Context: attach "what were we doing" to errors
// - An `impl` block can live in a different module than its type
// =============================================================================

mod csv_file;
mod table;
mod xlsx_file;

use anyhow::{bail, Result};
use std::path::Path;

pub use table::Sheet;

// Workbook extensions calamine can read
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            SheetFormat::Workbook
        } else {
            SheetFormat::Csv
        }
    }

    // Extension used for output files in this format
    pub fn output_extension(self) -> &'static str {
        match self {
            SheetFormat::Csv => "csv",
            SheetFormat::Workbook => "xlsx",
        }
    }
}

impl Sheet {
    // Reads the link list, format chosen by extension
    pub fn read(path: &Path) -> Result<Self> {
        match SheetFormat::from_path(path) {
            SheetFormat::Csv => csv_file::read(path),
            SheetFormat::Workbook => xlsx_file::read(path),
        }
    }

    // Writes the whole table, rows in their original order
    //
    // Workbooks are always written as .xlsx.
    pub fn write(&self, path: &Path) -> Result<()> {
        match SheetFormat::from_path(path) {
            SheetFormat::Csv => csv_file::write(self, path),
            SheetFormat::Workbook => {
                check_output_path(path)?;
                xlsx_file::write(self, path)
            }
        }
    }
}

// Rejects workbook formats we can read but not write (.xls, .ods, ...)
pub fn check_output_path(path: &Path) -> Result<()> {
    let extension = path.extension().map(|e| e.to_string_lossy().to_lowercase());
    if SheetFormat::from_path(path) == SheetFormat::Workbook && extension.as_deref() != Some("xlsx") {
        bail!("{}: results can only be written as .xlsx or .csv", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::RowId;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SheetFormat::from_path(Path::new("List-Link.xlsx")), SheetFormat::Workbook);
        assert_eq!(SheetFormat::from_path(Path::new("old.XLS")), SheetFormat::Workbook);
        assert_eq!(SheetFormat::from_path(Path::new("links.csv")), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("links")), SheetFormat::Csv);
    }

    #[test]
    fn test_csv_in_xlsx_out() {
        let mut input = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(input, "Link\nhttps://a.example\n").unwrap();

        let mut sheet = Sheet::read(input.path()).unwrap();
        sheet.set_result(RowId(2), "✅ No noindex / nofollow found").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        sheet.write(&output).unwrap();

        let read_back = Sheet::read(&output).unwrap();
        assert_eq!(read_back.jobs(), sheet.jobs());
    }

    #[test]
    fn test_legacy_workbook_output_is_refused() {
        let input = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::fs::write(input.path(), "Link\nhttps://a.example\n").unwrap();
        let sheet = Sheet::read(input.path()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        assert!(sheet.write(&dir.path().join("out.xls")).is_err());
    }
}
