// src/sheet/xlsx_file.rs
// =============================================================================
// Excel workbooks (.xlsx).
//
// Reading uses `calamine`, writing uses `rust_xlsxwriter`.
//
// Only the FIRST worksheet is read. The output workbook holds that one sheet
// with every cell written as text, plus some styling so the verdicts are easy
// to scan:
// - result cells starting with ✅ are dark green, ❌ dark red
// - result cells wrap, and rows with a result are made taller
// - the Link and Result headers are bold, centered and boxed
// - the Link and Result columns are widened
// =============================================================================

use super::table::Sheet;
use crate::checker::{FAILURE_MARKER, SUCCESS_MARKER};
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const LINK_COLUMN_WIDTH: f64 = 50.0;
const RESULT_COLUMN_WIDTH: f64 = 60.0;
const HEADER_ROW_HEIGHT: f64 = 22.0;
const RESULT_ROW_HEIGHT: f64 = 45.0;

const SUCCESS_COLOR: u32 = 0x006100;
const FAILURE_COLOR: u32 = 0x9C0006;

// How a result cell should look, decided by its marker prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Success,
    Failure,
    Plain,
}

impl Tone {
    fn of(text: &str) -> Self {
        if text.starts_with(SUCCESS_MARKER) {
            Tone::Success
        } else if text.starts_with(FAILURE_MARKER) {
            Tone::Failure
        } else {
            Tone::Plain
        }
    }

    fn format(self) -> Format {
        let format = Format::new().set_text_wrap().set_align(FormatAlign::Top);
        match self {
            Tone::Success => format.set_font_color(Color::RGB(SUCCESS_COLOR)),
            Tone::Failure => format.set_font_color(Color::RGB(FAILURE_COLOR)),
            Tone::Plain => format,
        }
    }
}

pub(super) fn read(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path).with_context(|| format!("could not open {}", path.display()))?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("{} has no worksheets", path.display()))?;

    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("could not read sheet \"{}\" of {}", name, path.display()))?;

    Sheet::from_records(Some(name), to_records(&range)).with_context(|| format!("could not read {}", path.display()))
}

// Turns the used range into rows of text, anchored at cell A1
//
// calamine's range starts at the first non-empty cell. Padding it back to A1
// keeps row numbers equal to the ones Excel shows.
fn to_records(range: &Range<Data>) -> Vec<Vec<String>> {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let leading_rows = std::iter::repeat_with(Vec::<String>::new).take(first_row as usize);
    let rows = range.rows().map(|cells| {
        std::iter::repeat(String::new())
            .take(first_col as usize)
            .chain(cells.iter().map(cell_text))
            .collect::<Vec<String>>()
    });

    leading_rows.chain(rows).collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(super) fn write(sheet: &Sheet, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    if let Some(name) = sheet.name() {
        worksheet.set_name(name)?;
    }

    fill(worksheet, sheet).with_context(|| format!("could not build {}", path.display()))?;

    workbook
        .save(path)
        .with_context(|| format!("could not write {}", path.display()))
}

fn fill(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    let link_col = column(sheet.link_col())?;
    let result_col = column(sheet.result_col())?;

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    for (col, header) in sheet.headers().iter().enumerate() {
        let col = column(col)?;
        if col == link_col || col == result_col {
            worksheet.write_string_with_format(0, col, header, &header_format)?;
        } else {
            worksheet.write_string(0, col, header)?;
        }
    }
    worksheet.set_row_height(0, HEADER_ROW_HEIGHT)?;

    for (index, cells) in sheet.rows().iter().enumerate() {
        let row = u32::try_from(index + 1).context("too many rows for a worksheet")?;

        for (col, text) in cells.iter().enumerate() {
            let col = column(col)?;
            if col == result_col {
                worksheet.write_string_with_format(row, col, text, &Tone::of(text).format())?;
            } else if !text.is_empty() {
                worksheet.write_string(row, col, text)?;
            }
        }

        let has_result = cells.get(sheet.result_col()).is_some_and(|text| !text.is_empty());
        if has_result {
            worksheet.set_row_height(row, RESULT_ROW_HEIGHT)?;
        }
    }

    worksheet.set_column_width(link_col, LINK_COLUMN_WIDTH)?;
    worksheet.set_column_width(result_col, RESULT_COLUMN_WIDTH)?;
    Ok(())
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).context("too many columns for a worksheet")
}
