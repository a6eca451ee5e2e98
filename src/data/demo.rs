//! Synthetic model bundles for trying the dashboard without trained models.
//!
//! Each `(category, target)` gets its own RNG stream derived from the run seed,
//! so adding a category does not change the bundles of the others.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{RawBundleMeta, SeasonalityMode};
use crate::error::AppError;
use crate::io::bundle::{BundleFile, bundle_file_name, write_bundle_file};
use crate::models::{AdditiveModel, Changepoint, Growth, Seasonality, Trend};

/// Categories written by `fcast demo`.
pub const DEMO_CATEGORIES: [&str; 4] = ["Fiction", "Non-Fiction", "Children & YA Books", "Textbooks"];

/// Targets written for every category.
pub const DEMO_TARGETS: [&str; 2] = ["quantity", "revenue"];

const YEARLY_DAYS: f64 = 365.25;
const SEMESTER_DAYS: f64 = 182.625;
const MONTHLY_DAYS: f64 = 30.5;
const WEEKLY_DAYS: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoConfig {
    pub seed: u64,
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
}

impl DemoConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            // Both dates are valid calendar days.
            history_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            history_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }
}

/// Build one bundle per `DEMO_CATEGORIES` x `DEMO_TARGETS`.
pub fn demo_bundles(config: &DemoConfig) -> Result<Vec<BundleFile>, AppError> {
    if config.history_end <= config.history_start {
        return Err(AppError::input("Demo history must end after it starts."));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::model(format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(DEMO_CATEGORIES.len() * DEMO_TARGETS.len());
    for category in DEMO_CATEGORIES {
        for target in DEMO_TARGETS {
            let mut rng = StdRng::seed_from_u64(bundle_seed(config.seed, category, target));
            out.push(demo_bundle(&mut rng, &normal, config, category, target));
        }
    }
    Ok(out)
}

/// Write the demo bundles into `dir`, returning the written paths.
pub fn write_demo_bundles(dir: &Path, config: &DemoConfig) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create model directory '{}': {e}", dir.display())))?;

    let mut paths = Vec::new();
    for bundle in demo_bundles(config)? {
        let (Some(category), Some(target)) = (&bundle.meta.category, &bundle.meta.target) else {
            continue;
        };
        let path = dir.join(bundle_file_name(category, target));
        write_bundle_file(&path, &bundle)?;
        paths.push(path);
    }
    info!(dir = %dir.display(), bundles = paths.len(), seed = config.seed, "wrote demo bundles");
    Ok(paths)
}

fn demo_bundle(
    rng: &mut StdRng,
    normal: &Normal<f64>,
    config: &DemoConfig,
    category: &str,
    target: &str,
) -> BundleFile {
    // Typical daily level in original units; revenue ~ quantity x price.
    let base_units = match category {
        "Fiction" => 60.0,
        "Non-Fiction" => 35.0,
        "Children & YA Books" => 45.0,
        _ => 20.0,
    };
    let daily_level: f64 = if target == "revenue" {
        base_units * rng.gen_range(12.0..25.0)
    } else {
        base_units
    };
    let level = daily_level.ln_1p() + 0.15 * normal.sample(rng);

    let textbooks = category == "Textbooks";
    let use_monthly = rng.gen_bool(0.5);
    let mode = if rng.gen_bool(0.25) {
        SeasonalityMode::Multiplicative
    } else {
        SeasonalityMode::Additive
    };
    // Multiplicative components scale the trend, so keep them relative.
    let amp = match mode {
        SeasonalityMode::Additive => 1.0,
        SeasonalityMode::Multiplicative => 1.0 / level.max(1.0),
    };

    let mut seasonalities = vec![
        fourier("yearly", YEARLY_DAYS, 4, 0.12 * amp, rng, normal),
        fourier("weekly", WEEKLY_DAYS, 3, 0.08 * amp, rng, normal),
    ];
    if use_monthly {
        seasonalities.push(fourier("monthly", MONTHLY_DAYS, 2, 0.04 * amp, rng, normal));
    }
    if textbooks {
        seasonalities.push(fourier("semester", SEMESTER_DAYS, 3, 0.25 * amp, rng, normal));
    }

    let (growth, trend, floor_log, cap_log) = if textbooks {
        let floor = level - 1.0;
        let cap = level + 0.8;
        let trend = Trend {
            k: 2.0 + 0.5 * normal.sample(rng).abs(),
            m: 0.3 + 0.1 * normal.sample(rng),
            changepoints: Vec::new(),
        };
        (Growth::Logistic, trend, Some(floor), Some(cap))
    } else {
        let trend = Trend {
            k: 0.15 * normal.sample(rng),
            m: level,
            changepoints: vec![Changepoint {
                t: 0.7,
                delta: 0.1 * normal.sample(rng),
            }],
        };
        (Growth::Linear, trend, None, None)
    };

    let model = AdditiveModel {
        history_start: config.history_start,
        history_end: config.history_end,
        growth,
        trend,
        seasonality_mode: mode,
        seasonalities,
        sigma: Some(0.2 + 0.05 * normal.sample(rng).abs()),
        interval_width: 0.8,
        uncertainty_growth: 0.1,
    };

    let winsor_q = 0.99;
    let meta = RawBundleMeta {
        category: Some(category.to_string()),
        target: Some(target.to_string()),
        seasonality_mode: Some(mode),
        use_logistic: textbooks,
        winsor_q: Some(winsor_q),
        cap_clip: Some((daily_level * 4.0).round()),
        sem_window_days: textbooks.then_some(21),
        use_monthly,
        use_semester: textbooks,
        floor_log,
        cap_log,
        ..RawBundleMeta::default()
    };

    BundleFile { model, meta }
}

fn fourier(
    name: &str,
    period_days: f64,
    order: usize,
    scale: f64,
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> Seasonality {
    // Higher harmonics get smaller amplitudes.
    let coefficients = (0..order)
        .flat_map(|k| {
            let s = scale / (k as f64 + 1.0);
            [s * normal.sample(rng), s * normal.sample(rng)]
        })
        .collect::<Vec<_>>();
    Seasonality {
        name: name.to_string(),
        period_days,
        coefficients,
        mode: None,
    }
}

fn bundle_seed(seed: u64, category: &str, target: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    category.hash(&mut hasher);
    target.hash(&mut hasher);
    hasher.finish()
}
