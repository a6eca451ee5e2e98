//! Shared forecast pipeline.
//!
//! One workflow for every front-end:
//! index lookup -> future frame + prediction -> post-processing -> weekly aggregation
//!
//! Callers only decide how to present the resulting [`ForecastRun`].

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{ForecastSeries, ModelMeta, WeeklyAggregate};
use crate::error::AppError;
use crate::forecast::{generate, postprocess, weekly_from_daily};
use crate::io::index::ArtifactIndex;
use crate::models::ForecastModel;
use crate::report::format::{Download, TableView, daily_download, weekly_download};

/// Default forecast horizon in years.
pub const DEFAULT_HORIZON_YEARS: u32 = 3;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub category: String,
    pub target: String,
    pub horizon_years: u32,
    pub include_history: bool,
    pub show_intervals: bool,
    pub show_weekly: bool,
}

impl ForecastRequest {
    pub fn new(category: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            target: target.into(),
            horizon_years: DEFAULT_HORIZON_YEARS,
            include_history: true,
            show_intervals: true,
            show_weekly: true,
        }
    }
}

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub meta: ModelMeta,
    pub history_end: NaiveDate,
    pub horizon_years: u32,
    pub daily: ForecastSeries,
    pub weekly: Option<WeeklyAggregate>,
    /// Interval columns are shown only when asked for and the model produced them.
    pub show_intervals: bool,
}

impl ForecastRun {
    pub fn daily_view(&self) -> TableView {
        TableView::daily(&self.daily, self.show_intervals)
    }

    pub fn weekly_view(&self) -> Option<TableView> {
        self.weekly.as_ref().map(TableView::weekly)
    }

    /// Download files for this run: daily always, weekly when aggregated.
    pub fn downloads(&self) -> Result<Vec<Download>, AppError> {
        let mut out = vec![daily_download(&self.daily, self.show_intervals, &self.meta)?];
        if let Some(weekly) = &self.weekly {
            out.push(weekly_download(weekly, &self.meta)?);
        }
        Ok(out)
    }
}

/// Execute the forecast pipeline for one `(category, target)`.
pub fn run_forecast(index: &ArtifactIndex, request: &ForecastRequest) -> Result<ForecastRun, AppError> {
    let bundle = index.require(&request.category, &request.target)?;
    let history_end = bundle.model.history_end();

    let raw = generate(
        &bundle.model,
        &bundle.meta,
        history_end,
        request.horizon_years,
        request.include_history,
    )?;
    let daily = postprocess(&raw, &bundle.meta);

    let weekly = request
        .show_weekly
        .then(|| weekly_from_daily(daily.points(), bundle.meta.week_rule));

    info!(
        category = %bundle.meta.category,
        target = %bundle.meta.target,
        rows = daily.len(),
        weeks = weekly.as_ref().map(|w| w.len()).unwrap_or(0),
        "forecast ready"
    );

    Ok(ForecastRun {
        meta: bundle.meta.clone(),
        history_end,
        horizon_years: request.horizon_years,
        show_intervals: request.show_intervals && daily.has_intervals,
        daily,
        weekly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawBundleMeta;
    use crate::io::bundle::{BundleFile, bundle_file_name, write_bundle_file};
    use crate::io::index::build_index;
    use crate::domain::{SeasonalityMode, WeekRule};
    use chrono::{Datelike, Weekday};
    use crate::models::{AdditiveModel, Growth, Trend};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_flat_bundle(dir: &std::path::Path, category: &str, target: &str, level: f64, sigma: Option<f64>) {
        let meta = RawBundleMeta {
            category: Some(category.to_string()),
            target: Some(target.to_string()),
            ..RawBundleMeta::default()
        };
        write_flat_bundle_with_meta(dir, meta, level, sigma);
    }

    fn write_flat_bundle_with_meta(dir: &std::path::Path, meta: RawBundleMeta, level: f64, sigma: Option<f64>) {
        let model = AdditiveModel {
            history_start: d(2022, 1, 1),
            history_end: d(2024, 12, 31),
            growth: Growth::Linear,
            trend: Trend {
                k: 0.0,
                m: level.ln_1p(),
                changepoints: Vec::new(),
            },
            seasonality_mode: SeasonalityMode::Additive,
            seasonalities: Vec::new(),
            sigma,
            interval_width: 0.8,
            uncertainty_growth: 0.0,
        };
        let path = match (&meta.category, &meta.target) {
            (Some(c), Some(t)) => dir.join(bundle_file_name(c, t)),
            _ => panic!("test bundle needs category and target"),
        };
        write_bundle_file(&path, &BundleFile { model, meta }).unwrap();
    }

    #[test]
    fn one_year_future_only_forecast() {
        let dir = tempfile::tempdir().unwrap();
        write_flat_bundle(dir.path(), "Fiction", "quantity", 10.0, Some(0.1));
        let index = build_index(dir.path()).unwrap();

        let request = ForecastRequest {
            horizon_years: 1,
            include_history: false,
            ..ForecastRequest::new("Fiction", "quantity")
        };
        let run = run_forecast(&index, &request).unwrap();

        assert_eq!(run.daily.len(), 365);
        assert_eq!(run.daily.first_date(), Some(d(2025, 1, 1)));
        assert_eq!(run.daily.last_date(), Some(d(2025, 12, 31)));
        assert!(run.show_intervals);
        for row in &run.daily.rows {
            assert!((row.yhat.unwrap() - 10.0).abs() < 1e-9);
        }

        let weekly = run.weekly.as_ref().unwrap();
        assert_eq!(weekly.rows.first().unwrap().week_end, d(2025, 1, 5));
        assert_eq!(weekly.rows.first().unwrap().value.map(|v| v.round()), Some(50.0));

        let downloads = run.downloads().unwrap();
        assert_eq!(downloads.len(), 2);
        assert_eq!(downloads[0].file_name, "forecast_daily_fiction_quantity.csv");
        assert_eq!(downloads[1].file_name, "forecast_weekly_fiction_quantity.csv");
    }

    #[test]
    fn weekly_buckets_follow_bundle_week_rule() {
        let dir = tempfile::tempdir().unwrap();
        let meta = RawBundleMeta {
            category: Some("Fiction".to_string()),
            target: Some("quantity".to_string()),
            week_rule: "W-WED".parse().unwrap(),
            ..RawBundleMeta::default()
        };
        write_flat_bundle_with_meta(dir.path(), meta, 10.0, None);
        let index = build_index(dir.path()).unwrap();

        let request = ForecastRequest {
            horizon_years: 1,
            include_history: false,
            ..ForecastRequest::new("Fiction", "quantity")
        };
        let run = run_forecast(&index, &request).unwrap();

        let weekly = run.weekly.as_ref().unwrap();
        assert_eq!(weekly.rule, WeekRule::ending_on(Weekday::Wed));
        // 2025-01-01 is itself a Wednesday, so the first bucket holds one day.
        assert_eq!(weekly.rows[0].week_end, d(2025, 1, 1));
        assert_eq!(weekly.rows[0].value.map(|v| v.round()), Some(10.0));
        assert_eq!(weekly.rows[1].week_end, d(2025, 1, 8));
        assert_eq!(weekly.rows[1].value.map(|v| v.round()), Some(70.0));
        assert!(weekly.rows.iter().all(|r| r.week_end.weekday() == Weekday::Wed));
    }

    #[test]
    fn intervals_hidden_when_model_has_none() {
        let dir = tempfile::tempdir().unwrap();
        write_flat_bundle(dir.path(), "Fiction", "revenue", 100.0, None);
        let index = build_index(dir.path()).unwrap();

        let request = ForecastRequest {
            show_weekly: false,
            ..ForecastRequest::new("Fiction", "revenue")
        };
        let run = run_forecast(&index, &request).unwrap();

        assert!(!run.show_intervals);
        assert!(run.weekly.is_none());
        assert_eq!(run.daily_view().columns.len(), 1);
        assert_eq!(run.downloads().unwrap().len(), 1);
    }

    #[test]
    fn unknown_pair_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        write_flat_bundle(dir.path(), "Fiction", "quantity", 1.0, None);
        let index = build_index(dir.path()).unwrap();

        let err = run_forecast(&index, &ForecastRequest::new("Fiction", "revenue")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
