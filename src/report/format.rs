//! Display and download formatting for forecast tables.
//!
//! Both outputs start from the same `TableView` and never feed into each other:
//! - display: calendar dates, `$1,234.56` for money, nullable integers for counts,
//!   human-readable column labels
//! - download: same rounding but numeric cells, snake_case labels, CSV bytes

use std::fmt;

use chrono::NaiveDate;

use crate::domain::{ForecastSeries, ModelMeta, ValueKind, WeeklyAggregate};
use crate::error::AppError;
use crate::math::{round_to, round_to_int};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateColumn {
    Day,
    WeekEnd,
}

impl DateColumn {
    pub fn display_label(self) -> &'static str {
        match self {
            DateColumn::Day => "Date",
            DateColumn::WeekEnd => "Week ending",
        }
    }

    pub fn download_label(self) -> &'static str {
        match self {
            DateColumn::Day => "ds",
            DateColumn::WeekEnd => "week_end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    Forecast,
    LowerBound,
    UpperBound,
    WeeklyForecast,
}

impl ValueColumn {
    pub fn display_label(self) -> &'static str {
        match self {
            ValueColumn::Forecast => "Forecast",
            ValueColumn::LowerBound => "Lower bound (80%)",
            ValueColumn::UpperBound => "Upper bound (80%)",
            ValueColumn::WeeklyForecast => "Weekly forecast",
        }
    }

    pub fn download_label(self) -> &'static str {
        match self {
            ValueColumn::Forecast => "forecast",
            ValueColumn::LowerBound => "lower_bound_80",
            ValueColumn::UpperBound => "upper_bound_80",
            ValueColumn::WeeklyForecast => "weekly_forecast",
        }
    }
}

/// Column-oriented numeric table: one date column plus value columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub date_column: DateColumn,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<(ValueColumn, Vec<Option<f64>>)>,
}

impl TableView {
    /// Daily table; interval columns only when requested and available.
    pub fn daily(series: &ForecastSeries, show_intervals: bool) -> Self {
        let mut columns = vec![(
            ValueColumn::Forecast,
            series.rows.iter().map(|r| r.yhat).collect(),
        )];
        if show_intervals && series.has_intervals {
            columns.push((
                ValueColumn::LowerBound,
                series.rows.iter().map(|r| r.yhat_lower).collect(),
            ));
            columns.push((
                ValueColumn::UpperBound,
                series.rows.iter().map(|r| r.yhat_upper).collect(),
            ));
        }
        Self {
            date_column: DateColumn::Day,
            dates: series.rows.iter().map(|r| r.date).collect(),
            columns,
        }
    }

    pub fn weekly(weekly: &WeeklyAggregate) -> Self {
        Self {
            date_column: DateColumn::WeekEnd,
            dates: weekly.rows.iter().map(|r| r.week_end).collect(),
            columns: vec![(
                ValueColumn::WeeklyForecast,
                weekly.rows.iter().map(|r| r.value).collect(),
            )],
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Last `n` rows (all rows if fewer).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.dates.len().saturating_sub(n);
        Self {
            date_column: self.date_column,
            dates: self.dates[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(col, values)| (*col, values[start.min(values.len())..].to_vec()))
                .collect(),
        }
    }

    fn value(&self, col: usize, row: usize) -> Option<f64> {
        self.columns.get(col).and_then(|(_, v)| v.get(row).copied().flatten())
    }
}

/// One rendered display cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCell {
    Date(NaiveDate),
    Text(String),
    /// Rounded count; `None` renders as an empty cell.
    Integer(Option<i64>),
}

impl fmt::Display for DisplayCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayCell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DisplayCell::Text(s) => f.write_str(s),
            DisplayCell::Integer(Some(v)) => write!(f, "{v}"),
            DisplayCell::Integer(None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<DisplayCell>>,
}

/// Human-facing table.
pub fn format_for_display(view: &TableView, kind: ValueKind) -> DisplayTable {
    let mut headers = vec![view.date_column.display_label()];
    headers.extend(view.columns.iter().map(|(col, _)| col.display_label()));

    let rows = (0..view.len())
        .map(|row| {
            let mut cells = vec![DisplayCell::Date(view.dates[row])];
            for col in 0..view.columns.len() {
                let v = view.value(col, row);
                cells.push(match kind {
                    ValueKind::Currency => DisplayCell::Text(v.map(format_currency).unwrap_or_default()),
                    ValueKind::Count => DisplayCell::Integer(v.and_then(round_to_int)),
                });
            }
            cells
        })
        .collect();

    DisplayTable { headers, rows }
}

/// One numeric download cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownloadCell {
    Date(NaiveDate),
    Decimal(Option<f64>),
    Integer(Option<i64>),
}

impl DownloadCell {
    fn to_field(self) -> String {
        match self {
            DownloadCell::Date(d) => d.format("%Y-%m-%d").to_string(),
            // Debug gives the shortest repr that round-trips and keeps a decimal point.
            DownloadCell::Decimal(Some(v)) => format!("{v:?}"),
            DownloadCell::Integer(Some(v)) => v.to_string(),
            DownloadCell::Decimal(None) | DownloadCell::Integer(None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<DownloadCell>>,
}

impl DownloadTable {
    /// UTF-8 CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .map_err(|e| AppError::io(format!("Failed to write CSV header: {e}")))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|c| c.to_field()))
                .map_err(|e| AppError::io(format!("Failed to write CSV row: {e}")))?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::io(format!("Failed to finish CSV: {e}")))
    }
}

/// Machine-facing table: rounded numbers, snake_case labels.
pub fn format_for_download(view: &TableView, kind: ValueKind) -> DownloadTable {
    let mut headers = vec![view.date_column.download_label()];
    headers.extend(view.columns.iter().map(|(col, _)| col.download_label()));

    let rows = (0..view.len())
        .map(|row| {
            let mut cells = vec![DownloadCell::Date(view.dates[row])];
            for col in 0..view.columns.len() {
                let v = view.value(col, row);
                cells.push(match kind {
                    ValueKind::Currency => DownloadCell::Decimal(v.map(|x| round_to(x, 2))),
                    ValueKind::Count => DownloadCell::Integer(v.and_then(round_to_int)),
                });
            }
            cells
        })
        .collect();

    DownloadTable { headers, rows }
}

/// A ready-to-save CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn daily_download(series: &ForecastSeries, show_intervals: bool, meta: &ModelMeta) -> Result<Download, AppError> {
    let table = format_for_download(&TableView::daily(series, show_intervals), meta.value_kind());
    Ok(Download {
        file_name: download_file_name("daily", &meta.category, &meta.target),
        bytes: table.to_csv()?,
    })
}

pub fn weekly_download(weekly: &WeeklyAggregate, meta: &ModelMeta) -> Result<Download, AppError> {
    let table = format_for_download(&TableView::weekly(weekly), meta.value_kind());
    Ok(Download {
        file_name: download_file_name("weekly", &meta.category, &meta.target),
        bytes: table.to_csv()?,
    })
}

/// `forecast_<granularity>_<category>_<target>.csv`
pub fn download_file_name(granularity: &str, category: &str, target: &str) -> String {
    format!("forecast_{granularity}_{}_{}.csv", slug(category), slug(target))
}

/// Filename-safe slug: trim, lower-case, `&` -> `and`, ` ` -> `_`, `__` -> `_`.
///
/// Each replacement is one left-to-right pass, so `___` becomes `__`.
pub fn slug(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace('&', "and")
        .replace(' ', "_")
        .replace("__", "_")
}

/// `$1,234.56` (2 decimals, thousands separators).
pub fn format_currency(v: f64) -> String {
    if !v.is_finite() {
        return format!("${v}");
    }
    let fixed = format!("{:.2}", round_to(v, 2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("${sign}{}.{frac_part}", group_thousands(int_part))
}

/// Thousands separators for a plain digit string.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
