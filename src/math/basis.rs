//! Basis functions for evaluating fitted trend + seasonality models.
//!
//! - `fourier_term(t, period, k)` gives the `k`-th `(sin, cos)` pair for a
//!   seasonality with the given period (in days).
//! - `logistic(t, k, m)` is the saturating growth curve in `[0, 1]`.
//! - `interval_z(width)` is the normal multiplier for a central interval.
//!
//! Numerical notes:
//! - Fourier arguments use days since the Unix epoch, so seasonal phases do not
//!   depend on where a model's history starts.
//! - `logistic` switches form on the sign of the exponent so `exp` never overflows.

use std::f64::consts::PI;

use chrono::{DateTime, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::AppError;

/// Days since 1970-01-01 as a float (negative before the epoch).
pub fn epoch_days(date: NaiveDate) -> f64 {
    (date - DateTime::UNIX_EPOCH.date_naive()).num_days() as f64
}

/// `(sin, cos)` of the `k`-th harmonic (1-based) of a seasonality with `period` days.
pub fn fourier_term(t_days: f64, period: f64, k: usize) -> (f64, f64) {
    let x = 2.0 * PI * (k as f64) * t_days / period;
    x.sin_cos()
}

/// Evaluate a Fourier series: `coefficients` is `[a1, b1, a2, b2, ...]` for
/// `a_k * sin + b_k * cos`. A trailing unpaired coefficient is ignored.
pub fn fourier_series(t_days: f64, period: f64, coefficients: &[f64]) -> f64 {
    coefficients
        .chunks_exact(2)
        .enumerate()
        .map(|(i, ab)| {
            let (s, c) = fourier_term(t_days, period, i + 1);
            ab[0] * s + ab[1] * c
        })
        .sum()
}

/// Standard logistic `1 / (1 + exp(-k (t - m)))`.
pub fn logistic(t: f64, k: f64, m: f64) -> f64 {
    let z = k * (t - m);
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Two-sided normal multiplier for a central interval of the given width
/// (e.g. `0.8` -> ~1.2816).
pub fn interval_z(width: f64) -> Result<f64, AppError> {
    let width = width.clamp(1e-9, 1.0 - 1e-9);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::model(format!("Standard normal distribution error: {e}")))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_days_origin() {
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0.0);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 8).unwrap()), 7.0);
    }

    #[test]
    fn weekly_fourier_repeats_every_seven_days() {
        let coeffs = [0.3, -0.2, 0.1, 0.05];
        let a = fourier_series(10.0, 7.0, &coeffs);
        let b = fourier_series(17.0, 7.0, &coeffs);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn logistic_is_bounded_and_centered() {
        assert!((logistic(5.0, 2.0, 5.0) - 0.5).abs() < 1e-12);
        assert!(logistic(1e6, 1.0, 0.0) <= 1.0);
        assert!(logistic(-1e6, 1.0, 0.0) >= 0.0);
    }

    #[test]
    fn interval_z_matches_known_quantiles() {
        assert!((interval_z(0.8).unwrap() - 1.2815515655).abs() < 1e-6);
        assert!((interval_z(0.95).unwrap() - 1.9599639845).abs() < 1e-6);
    }
}
