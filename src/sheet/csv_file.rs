// src/sheet/csv_file.rs
// =============================================================================
// Plain CSV link lists.
//
// Every record is read as strings, with no header handling by the csv crate
// (the table finds its own columns). Records may have different lengths.
// Multi-line results are quoted by the writer.
// =============================================================================

use super::table::Sheet;
use anyhow::{Context, Result};
use std::path::Path;

pub(super) fn read(path: &Path) -> Result<Sheet> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("could not open {}", path.display()))?;

    read_from(reader).with_context(|| format!("could not read {}", path.display()))
}

fn read_from<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Sheet> {
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(String::from).collect());
    }
    Sheet::from_records(None, records)
}

pub(super) fn write(sheet: &Sheet, path: &Path) -> Result<()> {
    let writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("could not create {}", path.display()))?;

    write_to(sheet, writer).with_context(|| format!("could not write {}", path.display()))
}

fn write_to<W: std::io::Write>(sheet: &Sheet, mut writer: csv::Writer<W>) -> Result<()> {
    writer.write_record(sheet.headers())?;
    for row in sheet.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
