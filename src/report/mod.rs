//! Reporting utilities: run summary, index listing, and text tables.
//!
//! We keep formatting code in one place so:
//! - the forecast stages stay free of presentation concerns
//! - output changes are localized (and easy to snapshot in tests)

pub mod format;

use crate::app::pipeline::ForecastRun;
use crate::domain::{ModelMeta, ValueKind};
use crate::io::index::ArtifactIndex;
use crate::math::round_to_int;

use format::{DisplayTable, format_currency, group_thousands};

/// One-line description of a bundle's metadata.
pub fn format_model_caption(meta: &ModelMeta) -> String {
    let cap = match meta.cap_clip {
        Some(v) => match meta.value_kind() {
            ValueKind::Currency => format_currency(v),
            ValueKind::Count => fmt_count(v),
        },
        None => "-".to_string(),
    };

    [
        format!("Category: {}", meta.category),
        format!("Target: {}", meta.target),
        format!("Mode: {}", meta.seasonality_mode.map(|m| m.display_name()).unwrap_or("-")),
        format!("Logistic: {}", meta.use_logistic),
        format!("Winsor: q={} cap={cap}", fmt_opt(meta.winsor_q)),
        format!(
            "Semester window: {} days",
            meta.sem_window_days.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        format!("Monthly: {}", meta.use_monthly),
        format!("Semester seasonality: {}", meta.use_semester),
    ]
    .join("  •  ")
}

/// Header block printed before the tables.
pub fn format_run_summary(run: &ForecastRun) -> String {
    let mut out = String::new();
    out.push_str("=== fcast - forecast ===\n");
    out.push_str(&format_model_caption(&run.meta));
    out.push('\n');
    out.push_str(&format!(
        "History ends: {} | horizon: {}y | rows: {} ({} .. {})\n",
        run.history_end,
        run.horizon_years,
        run.daily.len(),
        run.daily.first_date().map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        run.daily.last_date().map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
    ));
    if let Some(weekly) = &run.weekly {
        out.push_str(&format!("Weekly buckets: {} ({})\n", weekly.len(), weekly.rule));
    }
    out
}

/// Categories and their targets, plus anything that was skipped.
pub fn format_index_listing(index: &ArtifactIndex) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Models in {} ({} bundle(s)):\n",
        index.source_dir().display(),
        index.len()
    ));
    for category in index.categories() {
        out.push_str(&format!("  {category}: {}\n", index.targets(category).join(", ")));
    }
    if !index.skipped().is_empty() {
        out.push_str(&format!("Skipped {} file(s):\n", index.skipped().len()));
        for s in index.skipped() {
            out.push_str(&format!("  {}: {}\n", s.path.display(), s.reason));
        }
    }
    out
}

/// Fixed-width text rendering of a display table.
///
/// The first column is left-aligned, value columns are right-aligned.
pub fn format_text_table(table: &DisplayTable) -> String {
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let headers: Vec<String> = table.headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &headers, &widths);
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &dashes, &widths);
    for row in &rendered {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        if i == 0 {
            line.push_str(&format!("{cell:<w$}"));
        } else {
            line.push_str(&format!("  {cell:>w$}"));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_count(v: f64) -> String {
    match round_to_int(v) {
        Some(i) if i < 0 => format!("-{}", group_thousands(&i.unsigned_abs().to_string())),
        Some(i) => group_thousands(&i.to_string()),
        None => v.to_string(),
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawBundleMeta;
    use super::format::DisplayCell;

    fn meta(target: &str, cap_clip: Option<f64>) -> ModelMeta {
        RawBundleMeta {
            category: Some("Fiction".to_string()),
            target: Some(target.to_string()),
            winsor_q: Some(0.99),
            cap_clip,
            sem_window_days: Some(21),
            ..RawBundleMeta::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn caption_formats_cap_by_target() {
        let revenue = format_model_caption(&meta("revenue", Some(12345.5)));
        assert!(revenue.contains("cap=$12,345.50"));
        assert!(revenue.contains("Semester window: 21 days"));

        let qty = format_model_caption(&meta("quantity", Some(12345.5)));
        assert!(qty.contains("cap=12,346"));

        let none = format_model_caption(&meta("quantity", None));
        assert!(none.contains("cap=-"));
    }

    #[test]
    fn text_table_aligns_columns() {
        let table = DisplayTable {
            headers: vec!["Date", "Forecast"],
            rows: vec![
                vec![
                    DisplayCell::Date(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
                    DisplayCell::Integer(Some(7)),
                ],
                vec![
                    DisplayCell::Date(chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()),
                    DisplayCell::Integer(None),
                ],
            ],
        };
        let expected = concat!(
            "Date        Forecast\n",
            "----------  --------\n",
            "2025-01-01         7\n",
            "2025-01-02\n",
        );
        assert_eq!(format_text_table(&table), expected);
    }
}
