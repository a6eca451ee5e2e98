//! Time-series frames flowing through the pipeline.
//!
//! - `FutureFrame`: model input (daily timeline + optional logistic bounds)
//! - `RawPrediction`: model output, still in model space
//! - `ForecastSeries`: post-processed daily forecast (original units, >= 0)
//! - `WeeklyAggregate`: weekly sums of a daily series

use chrono::NaiveDate;

use super::WeekRule;

/// Per-row saturation bounds for logistic growth.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticBounds {
    pub floor: Vec<f64>,
    pub cap: Vec<f64>,
}

/// Timeline handed to a model for prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct FutureFrame {
    pub dates: Vec<NaiveDate>,
    pub bounds: Option<LogisticBounds>,
}

impl FutureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Native model output: point estimate plus optional interval columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub dates: Vec<NaiveDate>,
    pub yhat: Vec<f64>,
    pub yhat_lower: Option<Vec<f64>>,
    pub yhat_upper: Option<Vec<f64>>,
}

/// One post-processed daily row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: Option<f64>,
    pub yhat_lower: Option<f64>,
    pub yhat_upper: Option<f64>,
}

/// Daily forecast in original units.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    pub rows: Vec<ForecastRow>,
    /// Whether the model produced lower/upper columns.
    pub has_intervals: bool,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// `(date, point estimate)` pairs, the input to weekly aggregation.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.rows.iter().map(|r| (r.date, r.yhat))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyRow {
    pub week_end: NaiveDate,
    /// `None` when no day in the bucket had a value.
    pub value: Option<f64>,
}

/// Weekly sums, ordered by `week_end` ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyAggregate {
    pub rule: WeekRule,
    pub rows: Vec<WeeklyRow>,
}

impl WeeklyAggregate {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.rows.iter().map(|r| (r.week_end, r.value))
    }
}
