//! Command-line parsing for the forecast dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::pipeline::DEFAULT_HORIZON_YEARS;
use crate::domain::WeekRule;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fcast", version, about = "Forecast dashboard for pre-trained category/target models")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast one category/target, print tables and plots, and optionally export CSVs.
    ///
    /// A missing category or target is chosen interactively.
    Forecast(ForecastArgs),
    /// List the indexed models (and any bundle files that were skipped).
    List(ModelsArgs),
    /// Re-aggregate a daily CSV into weekly sums.
    Weekly(WeeklyArgs),
    /// Write synthetic model bundles for trying the dashboard.
    Demo(DemoArgs),
}

/// Where to find model bundles.
#[derive(Debug, Args, Clone)]
pub struct ModelsArgs {
    /// Model directory (falls back to `FCAST_MODELS_DIR`, then `models`).
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,
}

/// Options for a forecast run.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub models: ModelsArgs,

    /// Product category.
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Target (e.g. quantity, revenue).
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Forecast horizon in years past the end of history (1-10).
    #[arg(short = 'y', long, default_value_t = DEFAULT_HORIZON_YEARS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub years: u32,

    /// Only forecast future dates (drop the in-sample history).
    #[arg(long)]
    pub no_history: bool,

    /// Hide lower/upper interval columns.
    #[arg(long)]
    pub no_intervals: bool,

    /// Skip weekly aggregation.
    #[arg(long)]
    pub no_weekly: bool,

    /// Number of trailing rows shown in each table.
    #[arg(long, default_value_t = 120)]
    pub rows: usize,

    /// Render ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the daily (and weekly) download CSVs into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Options for re-aggregating a daily CSV.
#[derive(Debug, Args, Clone)]
pub struct WeeklyArgs {
    /// Daily CSV (e.g. a previously exported `forecast_daily_*.csv`).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Value column to sum.
    #[arg(long, default_value = "forecast")]
    pub column: String,

    /// Date column.
    #[arg(long, default_value = "ds")]
    pub date_column: String,

    /// Week-ending rule (`W-SUN`, `W-MON`, ..., or a weekday name).
    #[arg(long, default_value = "W-SUN")]
    pub week_rule: WeekRule,

    /// Target the values belong to; `revenue` keeps 2 decimals.
    #[arg(long, default_value = "quantity")]
    pub target: String,

    /// Rows shown in the printed table.
    #[arg(long, default_value_t = 120)]
    pub rows: usize,

    /// Write the weekly CSV here instead of only printing it.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Options for writing demo bundles.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Output directory.
    #[arg(long, value_name = "DIR", default_value = "models")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn forecast_defaults() {
        let cli = Cli::try_parse_from(["fcast", "forecast", "-c", "Fiction"]).unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.category.as_deref(), Some("Fiction"));
        assert_eq!(args.target, None);
        assert_eq!(args.years, 3);
        assert_eq!(args.rows, 120);
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn horizon_outside_range_is_rejected() {
        assert!(Cli::try_parse_from(["fcast", "forecast", "--years", "0"]).is_err());
        assert!(Cli::try_parse_from(["fcast", "forecast", "--years", "11"]).is_err());
        assert!(Cli::try_parse_from(["fcast", "forecast", "--years", "10"]).is_ok());
    }

    #[test]
    fn weekly_parses_week_rule() {
        let cli = Cli::try_parse_from(["fcast", "weekly", "-i", "d.csv", "--week-rule", "W-MON"]).unwrap();
        let Command::Weekly(args) = cli.command else {
            panic!("expected weekly");
        };
        assert_eq!(args.week_rule.week_end_day(), Weekday::Mon);
        assert_eq!(args.column, "forecast");
    }
}
