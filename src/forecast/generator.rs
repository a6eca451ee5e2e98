//! Future timeline assembly and delegation to the model.
//!
//! The generator owns the inputs to prediction (dates, logistic bounds) and
//! nothing else; the model's output columns pass through untouched.

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::domain::{FutureFrame, LogisticBounds, ModelMeta, RawPrediction};
use crate::error::AppError;
use crate::models::ForecastModel;

pub const MIN_HORIZON_YEARS: u32 = 1;
pub const MAX_HORIZON_YEARS: u32 = 10;

/// Days between `history_end` and `history_end + years` (calendar years, so
/// leap days count and Feb 29 rolls back to Feb 28).
pub fn horizon_days(history_end: NaiveDate, years: u32) -> Result<i64, AppError> {
    let end = years
        .checked_mul(12)
        .and_then(|months| history_end.checked_add_months(Months::new(months)))
        .ok_or_else(|| AppError::input(format!("Forecast horizon of {years} years overflows the calendar.")))?;
    Ok((end - history_end).num_days())
}

/// Daily dates from `history_start` (with history) or the day after
/// `history_end` (without), through `history_end + horizon_days`.
pub fn future_dates(
    history_start: NaiveDate,
    history_end: NaiveDate,
    horizon_days: i64,
    include_history: bool,
) -> Vec<NaiveDate> {
    let Some(last) = history_end.checked_add_signed(chrono::Duration::days(horizon_days)) else {
        return Vec::new();
    };
    let first = if include_history {
        history_start
    } else {
        match history_end.succ_opt() {
            Some(d) => d,
            None => return Vec::new(),
        }
    };
    first.iter_days().take_while(|d| *d <= last).collect()
}

/// Build the frame passed to `ForecastModel::predict`.
///
/// Logistic growth needs explicit per-row floor/cap; a bundle that declares
/// logistic growth without them cannot be forecast at all.
pub fn make_future_frame(
    model: &dyn ForecastModel,
    meta: &ModelMeta,
    history_end: NaiveDate,
    horizon_days: i64,
    include_history: bool,
) -> Result<FutureFrame, AppError> {
    let dates = future_dates(model.history_start(), history_end, horizon_days, include_history);

    let bounds = if meta.use_logistic {
        let (floor, cap) = meta.logistic_bounds().ok_or_else(|| {
            AppError::configuration(format!(
                "Model '{} / {}' uses logistic growth but floor_log/cap_log are missing in its metadata.",
                meta.category, meta.target
            ))
        })?;
        Some(LogisticBounds {
            floor: vec![floor; dates.len()],
            cap: vec![cap; dates.len()],
        })
    } else {
        None
    };

    Ok(FutureFrame { dates, bounds })
}

/// Produce raw (model-space) predictions for the requested horizon.
pub fn generate(
    model: &dyn ForecastModel,
    meta: &ModelMeta,
    history_end: NaiveDate,
    horizon_years: u32,
    include_history: bool,
) -> Result<RawPrediction, AppError> {
    if !(MIN_HORIZON_YEARS..=MAX_HORIZON_YEARS).contains(&horizon_years) {
        return Err(AppError::input(format!(
            "Forecast horizon must be between {MIN_HORIZON_YEARS} and {MAX_HORIZON_YEARS} years (got {horizon_years})."
        )));
    }

    let days = horizon_days(history_end, horizon_years)?;
    let frame = make_future_frame(model, meta, history_end, days, include_history)?;
    debug!(
        rows = frame.len(),
        horizon_days = days,
        include_history,
        logistic = frame.bounds.is_some(),
        "future frame built"
    );

    let pred = model.predict(&frame)?;
    if pred.dates.len() != frame.len() || pred.yhat.len() != frame.len() {
        return Err(AppError::model(format!(
            "Model returned {} predictions for {} requested dates.",
            pred.yhat.len(),
            frame.len()
        )));
    }
    Ok(pred)
}
