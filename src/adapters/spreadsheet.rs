//! Tabular input/output: `.xlsx` through calamine, `.csv` through csv, and
//! merged reports written with rust_xlsxwriter.

use crate::domain::model::{Cell, InputFile, Table};
use crate::utils::error::{DocsError, Result};
use calamine::{Data, Reader, Xlsx};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Rows above the header (report banners).
    pub header_row: usize,
    /// Lower-case header names after trimming.
    pub fold_case: bool,
}

pub fn read_table(file: &InputFile, options: ReadOptions) -> Result<Table> {
    let rows = match file.extension().as_deref() {
        Some("xlsx") | Some("xlsm") => read_xlsx_rows(file)?,
        Some("csv") => read_csv_rows(file)?,
        _ => {
            return Err(DocsError::InputFormatError {
                file: file.name.clone(),
                message: "expected an .xlsx or .csv file".to_string(),
            })
        }
    };

    let mut rows = rows.into_iter().skip(options.header_row);
    let header_cells = rows.next().ok_or_else(|| DocsError::InputFormatError {
        file: file.name.clone(),
        message: format!("no header row found after skipping {} row(s)", options.header_row),
    })?;

    let mut table = Table::new(normalize_headers(&header_cells, options.fold_case));
    let width = table.headers.len();

    for mut cells in rows {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        cells.resize(width, Cell::Empty);
        table.push_row(cells);
    }

    tracing::debug!(
        "📄 Read {} rows x {} columns from {}",
        table.len(),
        width,
        file.name
    );
    Ok(table)
}

/// Trims (and optionally lower-cases) header names. Blank names become
/// `Unnamed: <index>`; repeats get `.1`, `.2` suffixes so every column stays
/// addressable.
pub fn normalize_headers(cells: &[Cell], fold_case: bool) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();

    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let trimmed = cell.display().trim().to_string();
            let name = if trimmed.is_empty() {
                format!("Unnamed: {}", index)
            } else if fold_case {
                trimmed.to_lowercase()
            } else {
                trimmed
            };

            if used.insert(name.clone()) {
                return name;
            }
            // a literal header may already own the next suffix
            let suffix = next_suffix.entry(name.clone()).or_insert(1);
            loop {
                let candidate = format!("{}.{}", name, suffix);
                *suffix += 1;
                if used.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

fn read_xlsx_rows(file: &InputFile) -> Result<Vec<Vec<Cell>>> {
    let format_error = |message: String| DocsError::InputFormatError {
        file: file.name.clone(),
        message,
    };

    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(file.bytes.as_slice())).map_err(|e| format_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| format_error("workbook has no worksheets".to_string()))?
        .map_err(|e| format_error(e.to_string()))?;

    // calamine starts the range at the first used cell; keep sheet row numbers
    let leading_blank_rows = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); leading_blank_rows];
    rows.extend(range.rows().map(|row| row.iter().map(to_cell).collect()));
    Ok(rows)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::Date)
            .unwrap_or_else(|_| Cell::Text(s.clone())),
        Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv_rows(file: &InputFile) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file.bytes.as_slice());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DocsError::InputFormatError {
            file: file.name.clone(),
            message: e.to_string(),
        })?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::text(field)
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

/// Single-sheet workbook: bold header row, one row per record.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let worksheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (index, record) in table.records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, header) in table.headers.iter().enumerate() {
            let col = col as u16;
            match record.get(header) {
                None | Some(Cell::Empty) => {}
                Some(Cell::Text(s)) => {
                    worksheet.write_string(row, col, s)?;
                }
                Some(Cell::Number(n)) => {
                    worksheet.write_number(row, col, *n)?;
                }
                Some(Cell::Bool(b)) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Some(Cell::Date(dt)) => {
                    let excel = ExcelDateTime::from_ymd(dt.year() as u16, dt.month() as u8, dt.day() as u8)?
                        .and_hms(dt.hour() as u16, dt.minute() as u8, dt.second())?;
                    worksheet.write_datetime_with_format(row, col, &excel, &date_format)?;
                }
            }
        }
    }

    worksheet.autofit();
    Ok(workbook.save_to_buffer()?)
}
