//! Evaluation of fitted trend + seasonality models.
//!
//! Models are trained elsewhere; this crate only evaluates them. Prediction is
//! split into two primitives so they can be tested on their own:
//! - `trend_at(t)`: piecewise-linear or logistic growth on a scaled time axis
//! - `seasonal_at(date)`: additive and multiplicative Fourier components
//!
//! Everything is computed in model space (typically `log1p` of the target).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{FutureFrame, RawPrediction, SeasonalityMode};
use crate::error::AppError;
use crate::math::{epoch_days, fourier_series, interval_z, logistic};

/// Anything that can turn a future timeline into raw predictions.
pub trait ForecastModel {
    /// First date of the training history.
    fn history_start(&self) -> NaiveDate;

    /// Last date of the training history.
    fn history_end(&self) -> NaiveDate;

    /// Predict one row per date in `frame`.
    ///
    /// Lower/upper columns are optional; a model without an uncertainty
    /// estimate returns `None` for both.
    fn predict(&self, frame: &FutureFrame) -> Result<RawPrediction, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Growth {
    #[default]
    Linear,
    Logistic,
}

/// Rate change at scaled time `t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Changepoint {
    pub t: f64,
    pub delta: f64,
}

/// Trend parameters on the scaled time axis (`0` = history start, `1` = history end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trend {
    /// Base growth rate.
    pub k: f64,
    /// Offset (linear) or midpoint (logistic).
    pub m: f64,
    /// Rate adjustments; only used for linear growth.
    #[serde(default)]
    pub changepoints: Vec<Changepoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seasonality {
    pub name: String,
    pub period_days: f64,
    /// `[a1, b1, a2, b2, ...]` for `a_k sin + b_k cos`.
    pub coefficients: Vec<f64>,
    /// Overrides the model-wide mode for this component.
    #[serde(default)]
    pub mode: Option<SeasonalityMode>,
}

fn default_interval_width() -> f64 {
    0.8
}

/// A fitted additive/multiplicative decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdditiveModel {
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    #[serde(default)]
    pub growth: Growth,
    pub trend: Trend,
    #[serde(default)]
    pub seasonality_mode: SeasonalityMode,
    #[serde(default)]
    pub seasonalities: Vec<Seasonality>,
    /// Residual standard deviation; `None` means no interval columns.
    #[serde(default)]
    pub sigma: Option<f64>,
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
    /// Relative widening of the residual scale per year past `history_end`.
    #[serde(default)]
    pub uncertainty_growth: f64,
}

impl AdditiveModel {
    /// Structural checks run when a bundle is loaded.
    pub fn validate(&self) -> Result<(), String> {
        if self.history_end < self.history_start {
            return Err("history_end precedes history_start".to_string());
        }
        if !(self.trend.k.is_finite() && self.trend.m.is_finite()) {
            return Err("trend parameters must be finite".to_string());
        }
        for s in &self.seasonalities {
            if !(s.period_days.is_finite() && s.period_days > 0.0) {
                return Err(format!("seasonality '{}' has a non-positive period", s.name));
            }
        }
        if let Some(sigma) = self.sigma {
            if !(sigma.is_finite() && sigma >= 0.0) {
                return Err("sigma must be finite and >= 0".to_string());
            }
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err("interval_width must be in (0, 1)".to_string());
        }
        Ok(())
    }

    /// Map a date onto the scaled time axis.
    pub fn scaled_time(&self, date: NaiveDate) -> f64 {
        let span = (self.history_end - self.history_start).num_days().max(1) as f64;
        (date - self.history_start).num_days() as f64 / span
    }

    /// Trend value at scaled time `t`. `bounds` is `(floor, cap)` for logistic growth.
    pub fn trend_at(&self, t: f64, bounds: Option<(f64, f64)>) -> Result<f64, AppError> {
        match self.growth {
            Growth::Linear => {
                let mut rate = self.trend.k;
                let mut offset = self.trend.m;
                for cp in self.trend.changepoints.iter().filter(|cp| cp.t <= t) {
                    rate += cp.delta;
                    offset -= cp.t * cp.delta;
                }
                Ok(rate * t + offset)
            }
            Growth::Logistic => {
                let (floor, cap) = bounds.ok_or_else(|| {
                    AppError::model("Logistic growth model needs per-row floor/cap values in the future frame.")
                })?;
                Ok(floor + (cap - floor) * logistic(t, self.trend.k, self.trend.m))
            }
        }
    }

    /// Seasonal components at `date`, as `(additive, multiplicative)`.
    pub fn seasonal_at(&self, date: NaiveDate) -> (f64, f64) {
        let t_days = epoch_days(date);
        let mut additive = 0.0;
        let mut multiplicative = 0.0;
        for s in &self.seasonalities {
            let v = fourier_series(t_days, s.period_days, &s.coefficients);
            match s.mode.unwrap_or(self.seasonality_mode) {
                SeasonalityMode::Additive => additive += v,
                SeasonalityMode::Multiplicative => multiplicative += v,
            }
        }
        (additive, multiplicative)
    }

    fn interval_half_width(&self, sigma: f64, z: f64, date: NaiveDate) -> f64 {
        let years_ahead = ((date - self.history_end).num_days().max(0) as f64) / 365.25;
        z * sigma * (1.0 + self.uncertainty_growth.max(0.0) * years_ahead)
    }
}

impl ForecastModel for AdditiveModel {
    fn history_start(&self) -> NaiveDate {
        self.history_start
    }

    fn history_end(&self) -> NaiveDate {
        self.history_end
    }

    fn predict(&self, frame: &FutureFrame) -> Result<RawPrediction, AppError> {
        if let Some(bounds) = &frame.bounds {
            if bounds.floor.len() != frame.len() || bounds.cap.len() != frame.len() {
                return Err(AppError::model("Future frame floor/cap length does not match its dates."));
            }
        }

        let mut yhat = Vec::with_capacity(frame.len());
        let z = match self.sigma {
            Some(_) => interval_z(self.interval_width)?,
            None => 0.0,
        };
        let mut lower = self.sigma.map(|_| Vec::with_capacity(frame.len()));
        let mut upper = self.sigma.map(|_| Vec::with_capacity(frame.len()));

        for (i, &date) in frame.dates.iter().enumerate() {
            let bounds = frame.bounds.as_ref().map(|b| (b.floor[i], b.cap[i]));
            let trend = self.trend_at(self.scaled_time(date), bounds)?;
            let (additive, multiplicative) = self.seasonal_at(date);
            let y = trend * (1.0 + multiplicative) + additive;
            yhat.push(y);

            if let (Some(sigma), Some(lo), Some(hi)) = (self.sigma, lower.as_mut(), upper.as_mut()) {
                let half = self.interval_half_width(sigma, z, date);
                lo.push(y - half);
                hi.push(y + half);
            }
        }

        Ok(RawPrediction {
            dates: frame.dates.clone(),
            yhat,
            yhat_lower: lower,
            yhat_upper: upper,
        })
    }
}
