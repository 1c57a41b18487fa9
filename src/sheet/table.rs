// src/sheet/table.rs
// =============================================================================
// The in-memory table behind both file formats.
//
// Row numbering follows the spreadsheet: row 1 is the header, so the first
// data row is row 2. That number is the RowId carried by every Job and
// AuditResult, which is how a result finds its way back to its row no matter
// in which order the results arrive.
//
// This file knows nothing about CSV or XLSX. The format modules hand it plain
// rows of strings and read them back out when writing.
// =============================================================================

use crate::checker::{Job, RowId};
use anyhow::{anyhow, bail, Result};
use tracing::debug;

// Header names we recognize (compared trimmed and lower-cased)
const LINK_HEADER: &str = "link";
const RESULT_HEADERS: [&str; 2] = ["result", "hasil"];
const NEW_RESULT_HEADER: &str = "Result";

// First data row number
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Worksheet name, when the source had one
    name: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    link_col: usize,
    result_col: usize,
}

impl Sheet {
    // Builds the table from raw rows, the first one being the header
    pub(super) fn from_records(name: Option<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let mut records = records.into_iter();

        let headers = match records.next() {
            Some(headers) => headers,
            None => bail!("the file is empty, expected a header row"),
        };

        let rows: Vec<Vec<String>> = records
            .map(|mut row| {
                // Short rows get empty cells so every row has a cell per header
                if row.len() < headers.len() {
                    row.resize(headers.len(), String::new());
                }
                row
            })
            .collect();

        if rows.is_empty() {
            bail!("no data rows, expected a header row plus at least one link");
        }

        Self::from_parts(name, headers, rows)
    }

    fn from_parts(name: Option<String>, mut headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Result<Self> {
        let link_col = find_column(&headers, &[LINK_HEADER])
            .ok_or_else(|| anyhow!("no \"Link\" column found in the header row"))?;

        let result_col = match find_column(&headers, &RESULT_HEADERS) {
            Some(col) => col,
            None => {
                let col = link_col + 1;
                headers.insert(col, NEW_RESULT_HEADER.to_string());
                for row in &mut rows {
                    row.insert(col.min(row.len()), String::new());
                }
                debug!(column = col, "inserted result column");
                col
            }
        };

        // Rows wider than the header still need the result cell to exist
        for row in &mut rows {
            if row.len() <= result_col {
                row.resize(result_col + 1, String::new());
            }
        }

        Ok(Self {
            name,
            headers,
            rows,
            link_col,
            result_col,
        })
    }

    // One Job per row with a non-empty link
    //
    // Rows with an empty link cell are skipped.
    pub fn jobs(&self) -> Vec<Job> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let url = row.get(self.link_col)?.trim();
                if url.is_empty() {
                    return None;
                }
                Some(Job::new(RowId(index + FIRST_DATA_ROW), url))
            })
            .collect()
    }

    pub fn data_rows(&self) -> usize {
        self.rows.len()
    }

    // Stores the rendered verdict in the row the job came from
    pub fn set_result(&mut self, id: RowId, text: &str) -> Result<()> {
        let index = id
            .0
            .checked_sub(FIRST_DATA_ROW)
            .filter(|&i| i < self.rows.len())
            .ok_or_else(|| anyhow!("{} does not exist in the sheet", id))?;

        self.rows[index][self.result_col] = text.to_string();
        Ok(())
    }

    pub(super) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(super) fn headers(&self) -> &[String] {
        &self.headers
    }

    // Data rows in their original order
    pub(super) fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub(super) fn link_col(&self) -> usize {
        self.link_col
    }

    pub(super) fn result_col(&self) -> usize {
        self.result_col
    }
}

// Finds the first header matching one of `names`
fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        // Excel likes to start CSV exports with a byte order mark
        let header = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        names.contains(&header.as_str())
    })
}
