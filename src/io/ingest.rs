//! Daily CSV ingest.
//!
//! Reads a previously exported (or hand-made) daily table so it can be
//! re-aggregated into weeks without re-running a model.
//!
//! - the date column is required on every row; bad dates become row errors
//! - the value column is coerced leniently: anything non-numeric is missing,
//!   negative values are clipped to 0
//! - header matching ignores case, surrounding whitespace, and a UTF-8 BOM

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::error::AppError;
use crate::forecast::{coerce_numeric, restore_value};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed points in file order + row errors.
#[derive(Debug, Clone)]
pub struct DailyInput {
    pub points: Vec<(NaiveDate, Option<f64>)>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl DailyInput {
    /// Rows whose value coerced to a number.
    pub fn numeric_rows(&self) -> usize {
        self.points.iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// Load `(date, value)` pairs from a CSV file.
pub fn read_daily_csv(path: &Path, date_column: &str, value_column: &str) -> Result<DailyInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_daily_records(file, date_column, value_column)
}

/// Same as [`read_daily_csv`], from any reader.
pub fn read_daily_records<R: std::io::Read>(
    source: R,
    date_column: &str,
    value_column: &str,
) -> Result<DailyInput, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = require_column(&header_map, date_column)?;
    let value_idx = require_column(&header_map, value_column)?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let raw_date = record.get(date_idx).unwrap_or("");
        match parse_date(raw_date) {
            Ok(date) => {
                // Forecast quantities are never negative; clip before anything sums them.
                let value = record
                    .get(value_idx)
                    .and_then(coerce_numeric)
                    .and_then(|v| restore_value(v, false));
                points.push((date, value));
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    debug!(rows_read, points = points.len(), errors = row_errors.len(), "ingested daily csv");

    if points.is_empty() {
        return Err(AppError::input("No rows with a valid date were found in the CSV."));
    }

    Ok(DailyInput {
        points,
        row_errors,
        rows_read,
    })
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::input(format!("Missing required column: `{name}`")))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Timestamps keep only their calendar day.
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
